//! Data structures, types, and the claim solver implementation for the fault dispute game.

mod position;
pub use position::{Position, PositionError, MAX_POSITION_DEPTH};

mod types;
pub use types::*;

mod error;
pub use error::FaultError;

mod cancel;
pub use cancel::{cancel_pair, CancelHandle, CancelToken};

mod game;
pub use game::{FaultDisputeState, Game};

mod provider;
pub use provider::TraceProvider;

mod alphabet;
pub use alphabet::{AlphabetTraceProvider, ALPHABET_ABSOLUTE_PRESTATE};

mod solver;
pub use solver::ClaimSolver;
