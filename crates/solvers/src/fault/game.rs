//! The game module holds the [Game] trait and the in-memory [FaultDisputeState].

use super::{Claim, FaultError, Move};
use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The [Game] trait defines the read-only view of a dispute game that the solver needs.
///
/// Implementations may be backed by contract calls, a cache, or memory. The view must not change
/// for the duration of a single solver call.
#[async_trait]
pub trait Game: Send + Sync {
    /// Fetch the parent of a [Claim].
    ///
    /// ### Takes
    /// - `claim`: The claim whose parent should be fetched.
    ///
    /// ### Returns
    /// - `Ok(Claim)`: The parent claim.
    /// - `Err(FaultError::MissingParent)`: The claim is the root, or its parent does not exist.
    /// - `Err(FaultError::Game)`: The lookup itself failed.
    async fn parent(&self, claim: &Claim) -> Result<Claim, FaultError>;
}

/// The [FaultDisputeState] struct is an in-memory snapshot of a dispute game: an append-only list
/// of [Claim]s, indexed by their contract index, pointing to their parents all the way up to the
/// root claim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawState")]
pub struct FaultDisputeState {
    max_depth: u8,
    claims: Vec<Claim>,
}

impl FaultDisputeState {
    /// Creates an empty [FaultDisputeState].
    pub fn new(max_depth: u8) -> Self {
        Self {
            max_depth,
            claims: Vec::new(),
        }
    }

    /// Creates a [FaultDisputeState] from a list of claims, validating each in order.
    pub fn try_from_claims(max_depth: u8, claims: Vec<Claim>) -> anyhow::Result<Self> {
        let mut state = Self::new(max_depth);
        for claim in claims {
            state.push(claim)?;
        }
        Ok(state)
    }

    /// Appends a posted claim.
    ///
    /// The claim's contract index must be the next free index, only the first claim may be the
    /// root, every other claim must point at an earlier claim exactly one level above it, and no
    /// claim may sit below `max_depth`.
    pub fn push(&mut self, claim: Claim) -> anyhow::Result<()> {
        let next = self.claims.len();
        if claim.contract_index != next {
            return Err(anyhow!(
                "claim has contract index {}, expected {}",
                claim.contract_index,
                next
            ));
        }
        if claim.depth() > self.max_depth {
            return Err(anyhow!(
                "claim {} at depth {} is below the max depth {}",
                next,
                claim.depth(),
                self.max_depth
            ));
        }

        match (next, claim.parent_index) {
            (0, None) if claim.is_root() => {}
            (0, _) => return Err(anyhow!("the first claim must be the root claim")),
            (_, None) => return Err(anyhow!("claim {} has no parent", next)),
            (_, Some(parent_index)) => {
                let parent = self
                    .claims
                    .get(parent_index)
                    .ok_or(anyhow!("claim {} has unknown parent {}", next, parent_index))?;
                if parent.depth() + 1 != claim.depth() {
                    return Err(anyhow!(
                        "claim {} at depth {} cannot counter claim {} at depth {}",
                        next,
                        claim.depth(),
                        parent_index,
                        parent.depth()
                    ));
                }
            }
        }

        self.claims.push(claim);
        Ok(())
    }

    /// Returns the max depth of the position tree.
    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    /// Fetch the [Claim] at the given contract index.
    pub fn claim(&self, index: usize) -> Option<&Claim> {
        self.claims.get(index)
    }

    /// Returns every claim in contract index order.
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Returns the root claim, if the game has one.
    pub fn root(&self) -> Option<&Claim> {
        self.claims.first()
    }

    /// Returns `true` if `mv` has already been posted against the same parent.
    pub fn is_duplicate(&self, mv: &Move) -> bool {
        self.claims
            .iter()
            .any(|c| c.parent_index == Some(mv.parent_index) && c.data == mv.data)
    }
}

/// Wire form of a [FaultDisputeState]. Claims are re-validated on the way in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawState {
    max_depth: u8,
    claims: Vec<Claim>,
}

impl TryFrom<RawState> for FaultDisputeState {
    type Error = anyhow::Error;

    fn try_from(raw: RawState) -> Result<Self, Self::Error> {
        Self::try_from_claims(raw.max_depth, raw.claims)
    }
}

#[async_trait]
impl Game for FaultDisputeState {
    async fn parent(&self, claim: &Claim) -> Result<Claim, FaultError> {
        claim
            .parent_index
            .and_then(|index| self.claims.get(index))
            .copied()
            .ok_or(FaultError::MissingParent {
                contract_index: claim.contract_index,
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fault::{ClaimData, Position};
    use ethers::types::H256;

    fn claim(position: Position, parent_index: Option<usize>, contract_index: usize) -> Claim {
        Claim::new(
            ClaimData::new(H256::repeat_byte(contract_index as u8), position),
            parent_index,
            contract_index,
        )
    }

    fn sample() -> FaultDisputeState {
        let root = Position::ROOT;
        let attack = root.attack().unwrap();
        FaultDisputeState::try_from_claims(
            4,
            vec![
                claim(root, None, 0),
                claim(attack, Some(0), 1),
                claim(attack.defend().unwrap(), Some(1), 2),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn parent_lookup() {
        let state = sample();
        let leaf = *state.claim(2).unwrap();

        assert_eq!(state.parent(&leaf).await.unwrap(), *state.claim(1).unwrap());
        assert!(matches!(
            state.parent(state.root().unwrap()).await,
            Err(FaultError::MissingParent { contract_index: 0 })
        ));

        let dangling = claim(leaf.position(), Some(9), 3);
        assert!(matches!(
            state.parent(&dangling).await,
            Err(FaultError::MissingParent { contract_index: 3 })
        ));
    }

    #[test]
    fn push_rejects_malformed_claims() {
        let mut state = sample();
        let attack = Position::ROOT.attack().unwrap();

        // Wrong contract index.
        assert!(state.push(claim(attack, Some(0), 7)).is_err());
        // Second root.
        assert!(state.push(claim(Position::ROOT, None, 3)).is_err());
        // Unknown parent.
        assert!(state.push(claim(attack, Some(3), 3)).is_err());
        // Parent is not one level above.
        assert!(state.push(claim(attack, Some(1), 3)).is_err());
        // Below the max depth.
        let too_deep = Position::new(5, 0).unwrap();
        assert!(state.push(claim(too_deep, Some(2), 3)).is_err());

        assert!(state.push(claim(attack, Some(0), 3)).is_ok());
        assert_eq!(state.claims().len(), 4);
    }

    #[test]
    fn duplicate_moves_are_detected() {
        let state = sample();
        let existing = state.claim(1).unwrap();
        let mv = Move {
            data: existing.data,
            parent_index: 0,
            is_attack: true,
        };
        assert!(state.is_duplicate(&mv));
        assert!(!state.is_duplicate(&Move {
            parent_index: 1,
            ..mv
        }));
    }

    #[test]
    fn snapshot_from_json() {
        let json = r#"{
            "maxDepth": 4,
            "claims": [
                {
                    "value": "0x0000000000000000000000000000000000000000000000000000000000000001",
                    "position": { "depth": 0, "indexAtDepth": 0 },
                    "parentIndex": null,
                    "contractIndex": 0
                },
                {
                    "value": "0x0000000000000000000000000000000000000000000000000000000000000002",
                    "position": { "depth": 1, "indexAtDepth": 0 },
                    "parentIndex": 0,
                    "contractIndex": 1
                }
            ]
        }"#;
        let state: FaultDisputeState = serde_json::from_str(json).unwrap();
        assert_eq!(state.max_depth(), 4);
        assert_eq!(state.claims().len(), 2);
        assert_eq!(state.claim(1).unwrap().parent_index, Some(0));
        assert_eq!(state.claim(1).unwrap().value(), H256::from_low_u64_be(2));

        let orphan = json.replace(r#""parentIndex": 0"#, r#""parentIndex": 5"#);
        assert!(serde_json::from_str::<FaultDisputeState>(&orphan).is_err());
    }
}
