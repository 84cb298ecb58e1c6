//! The provider module holds the [TraceProvider] trait.

use super::{Position, PreimageOracleData, TraceValue};
use async_trait::async_trait;
use ethers::types::Bytes;

/// The [TraceProvider] trait defines the interface of the execution engine that the solver
/// consults for ground truth. Both calls may be slow; the solver never retries them.
#[async_trait]
pub trait TraceProvider: Send + Sync {
    /// Fetch the canonical trace value that the given [Position] commits to.
    ///
    /// ### Takes
    /// - `position`: The position within the game tree.
    ///
    /// ### Returns
    /// - `Ok(TraceValue)`: The trace value at the position's trace index.
    /// - `Err(anyhow::Error)`: The trace could not be computed.
    async fn get(&self, position: Position) -> anyhow::Result<TraceValue>;

    /// Fetch the data required to execute the single step that ends at the given leaf
    /// [Position].
    ///
    /// ### Takes
    /// - `position`: A position at the max depth of the game.
    ///
    /// ### Returns
    /// - `Ok((pre_state, proof_data, oracle_data))`: The pre-state of the step, the proof needed
    ///   to execute it, and the preimage it reads, if any.
    /// - `Err(anyhow::Error)`: The step data could not be computed.
    async fn get_step_data(
        &self,
        position: Position,
    ) -> anyhow::Result<(Bytes, Bytes, Option<PreimageOracleData>)>;

    /// Fetch the state the trace begins from.
    async fn absolute_prestate(&self) -> anyhow::Result<Bytes>;
}
