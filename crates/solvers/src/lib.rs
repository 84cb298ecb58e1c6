//! Solvers for the dispute games played by the honest challenger.
//!
//! The [fault] module holds the claim solver for the fault dispute game: given a snapshot of the
//! game's claims and a trace provider, it decides which move to post against a claim, or which
//! step to execute against a leaf claim.

pub mod fault;
