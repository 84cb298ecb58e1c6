//! The error module holds the [FaultError] returned by the claim solver and its collaborators.

use super::PositionError;
use thiserror::Error;

/// Errors produced while solving a fault dispute game.
#[derive(Error, Debug)]
pub enum FaultError {
    /// A move was requested against a leaf claim; only a step applies there.
    #[error("game depth reached")]
    GameDepthReached,
    /// A step was requested against a claim above the leaf level.
    #[error("cannot step on non-leaf claims")]
    StepNonLeafNode,
    /// There is nothing to step against. Not produced by the solver; the agreed leaf case is a
    /// defend step.
    #[error("cannot step on claims we agree with")]
    StepAgreedClaim,
    /// The claim's ancestry already disagrees with the trace.
    #[error("cannot step on claims that dispute invalid paths")]
    StepIgnoreInvalidPath,
    /// The claim is deeper than the game allows.
    #[error("claim {contract_index} at depth {depth} is below the max game depth {max_depth}")]
    InvalidClaimDepth {
        contract_index: usize,
        depth: u8,
        max_depth: u8,
    },
    /// The claim is the root, or its parent index does not resolve.
    #[error("missing parent for claim {contract_index}")]
    MissingParent { contract_index: usize },
    /// The game returned a parent that cannot be the claim's parent.
    #[error("claim {contract_index} at depth {depth} has a parent at depth {parent_depth}")]
    InvalidAncestry {
        contract_index: usize,
        depth: u8,
        parent_depth: u8,
    },
    /// A position left the representable tree.
    #[error(transparent)]
    Position(#[from] PositionError),
    /// The trace provider failed.
    #[error("trace provider failure: {0}")]
    Trace(#[source] anyhow::Error),
    /// The game failed to look up a claim.
    #[error("game lookup failure: {0}")]
    Game(#[source] anyhow::Error),
    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl FaultError {
    /// Returns `true` for outcomes that mean "nothing to do for this claim" rather than a
    /// failure to decide.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            FaultError::StepIgnoreInvalidPath | FaultError::StepAgreedClaim
        )
    }
}
