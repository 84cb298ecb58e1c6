//! The types module contains all of the types relevant to the fault dispute game.

use super::Position;
use ethers::types::{Bytes, H256};
use serde::{Deserialize, Serialize};

/// The [TraceValue] type is the 32 byte commitment to the execution trace at a given trace index.
pub type TraceValue = H256;

/// The [ClaimData] struct is an assertion that the execution trace holds `value` at `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimData {
    /// The value claimed at the trace index relative to the position.
    pub value: TraceValue,
    /// The position of the claim within the game tree.
    pub position: Position,
}

impl ClaimData {
    /// Creates a new [ClaimData].
    pub fn new(value: TraceValue, position: Position) -> Self {
        Self { value, position }
    }
}

/// The [Claim] struct is a [ClaimData] that has been posted to a dispute game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    /// The claim that is being made.
    #[serde(flatten)]
    pub data: ClaimData,
    /// The index of the parent claim in the game's claim list. `None` for the root claim.
    pub parent_index: Option<usize>,
    /// The index of this claim in the game's claim list.
    pub contract_index: usize,
}

impl Claim {
    /// Creates a new [Claim].
    pub fn new(data: ClaimData, parent_index: Option<usize>, contract_index: usize) -> Self {
        Self {
            data,
            parent_index,
            contract_index,
        }
    }

    /// Returns the position of the claim.
    pub fn position(&self) -> Position {
        self.data.position
    }

    /// Returns the value of the claim.
    pub fn value(&self) -> TraceValue {
        self.data.value
    }

    /// Returns the depth of the claim's position.
    pub fn depth(&self) -> u8 {
        self.data.position.depth()
    }

    /// Returns `true` if this is the root claim of the game.
    pub fn is_root(&self) -> bool {
        self.data.position.is_root()
    }
}

/// A [Move] is a counter claim proposed against an existing [Claim]. It has no contract index
/// until it is posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    /// The claim to post.
    #[serde(flatten)]
    pub data: ClaimData,
    /// The contract index of the claim being countered.
    pub parent_index: usize,
    /// Whether the move attacks (`true`) or defends (`false`) the parent.
    pub is_attack: bool,
}

/// The [PreimageOracleData] struct holds the preimage that must be loaded into the oracle before
/// a step can be executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreimageOracleData {
    /// Whether the key is local to the game rather than global to the oracle.
    pub is_local: bool,
    /// The key of the preimage.
    pub oracle_key: Bytes,
    /// The preimage itself.
    pub oracle_data: Bytes,
    /// The offset into the preimage that the step reads from.
    pub oracle_offset: u32,
}

impl PreimageOracleData {
    /// Creates [PreimageOracleData] for a key that is local to the game.
    pub fn new_local(oracle_key: Bytes, oracle_data: Bytes, oracle_offset: u32) -> Self {
        Self {
            is_local: true,
            oracle_key,
            oracle_data,
            oracle_offset,
        }
    }

    /// Creates [PreimageOracleData] for a key in the global preimage oracle.
    pub fn new_global(oracle_key: Bytes, oracle_data: Bytes, oracle_offset: u32) -> Self {
        Self {
            is_local: false,
            oracle_key,
            oracle_data,
            oracle_offset,
        }
    }
}

/// The [StepData] struct holds everything required to execute a single VM step against a leaf
/// [Claim].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepData {
    /// The leaf claim being stepped against.
    pub leaf_claim: Claim,
    /// Whether the step attacks (`true`) or defends (`false`) the leaf claim.
    pub is_attack: bool,
    /// The state the step starts from.
    pub pre_state: Bytes,
    /// The proof required to execute the step from `pre_state`.
    pub proof_data: Bytes,
    /// The preimage the step reads, if any.
    pub oracle_data: Option<PreimageOracleData>,
}

/// A [Response] is an action taken by a participant in the dispute game in response to
/// a claim made by another participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Response {
    /// Do nothing.
    DoNothing,
    /// Post a counter claim against the claim.
    Move(Move),
    /// Perform a VM step against the leaf claim.
    Step(StepData),
}

impl Response {
    /// Returns `true` if the response requires a transaction.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Response::DoNothing)
    }
}
