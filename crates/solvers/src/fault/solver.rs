//! The solver module holds the [ClaimSolver], which decides how an honest participant responds to
//! the claims of a fault dispute game.

use super::{
    CancelToken, Claim, ClaimData, FaultError, Game, Move, Position, PreimageOracleData,
    Response, StepData, TraceProvider, TraceValue,
};
use ethers::types::Bytes;

/// The [ClaimSolver] computes the next move against a claim, or the data for a step against a
/// leaf claim, from a [TraceProvider] and a read-only [Game].
///
/// The solver holds no state between calls and may be shared across tasks.
#[derive(Debug, Clone)]
pub struct ClaimSolver<P> {
    /// The max depth of the game tree. Claims at this depth are leaves.
    game_depth: u8,
    /// The source of truth for the execution trace.
    provider: P,
}

impl<P: TraceProvider> ClaimSolver<P> {
    /// Creates a new [ClaimSolver].
    pub fn new(game_depth: u8, provider: P) -> Self {
        Self {
            game_depth,
            provider,
        }
    }

    /// Returns the max depth of the game tree.
    pub fn game_depth(&self) -> u8 {
        self.game_depth
    }

    /// Returns the solver's [TraceProvider].
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Responds to a claim: a step for leaf claims, a move otherwise.
    ///
    /// Skippable step outcomes (see [FaultError::is_skippable]) become [Response::DoNothing].
    pub async fn respond<G: Game + ?Sized>(
        &self,
        ctx: &CancelToken,
        game: &G,
        claim: &Claim,
    ) -> Result<Response, FaultError> {
        if claim.depth() == self.game_depth {
            match self.attempt_step(ctx, game, claim).await {
                Ok(step) => Ok(Response::Step(step)),
                Err(e) if e.is_skippable() => {
                    tracing::debug!(target: "claim-solver", "Skipping step on claim {}: {}", claim.contract_index, e);
                    Ok(Response::DoNothing)
                }
                Err(e) => Err(e),
            }
        } else {
            Ok(self
                .next_move(ctx, claim, game)
                .await?
                .map_or(Response::DoNothing, Response::Move))
        }
    }

    /// Finds the move an honest participant should make against a claim.
    ///
    /// ### Takes
    /// - `ctx`: Cancels the call when signalled.
    /// - `claim`: The claim to respond to.
    /// - `game`: The game the claim belongs to.
    ///
    /// ### Returns
    /// - `Ok(Some(Move))`: The counter claim to post.
    /// - `Ok(None)`: No move is warranted.
    /// - `Err(FaultError)`: The move could not be determined.
    pub async fn next_move<G: Game + ?Sized>(
        &self,
        ctx: &CancelToken,
        claim: &Claim,
        game: &G,
    ) -> Result<Option<Move>, FaultError> {
        if claim.depth() == self.game_depth {
            return Err(FaultError::GameDepthReached);
        }
        if claim.depth() > self.game_depth {
            return Err(FaultError::InvalidClaimDepth {
                contract_index: claim.contract_index,
                depth: claim.depth(),
                max_depth: self.game_depth,
            });
        }

        // Never counter a claim whose ancestry we already dispute. The dishonest ancestor is
        // countered directly instead.
        if !claim.is_root() {
            let parent = self.parent_of(ctx, game, claim).await?;
            if !self.agree_with_claim_path(ctx, game, &parent).await? {
                tracing::debug!(target: "claim-solver", "Claim {} disputes an invalid path, no move", claim.contract_index);
                return Ok(None);
            }
        }

        if self.agree_with_claim(ctx, &claim.data).await? {
            // Defending the root claim means there is nothing to dispute.
            if claim.is_root() {
                tracing::debug!(target: "claim-solver", "Agree with the root claim, no move");
                return Ok(None);
            }
            self.counter(ctx, claim, false).await.map(Some)
        } else {
            self.counter(ctx, claim, true).await.map(Some)
        }
    }

    /// Computes the data for a VM step against a leaf claim.
    ///
    /// ### Takes
    /// - `ctx`: Cancels the call when signalled.
    /// - `game`: The game the claim belongs to.
    /// - `claim`: A claim at the max depth of the game.
    ///
    /// ### Returns
    /// - `Ok(StepData)`: The step to execute.
    /// - `Err(FaultError::StepNonLeafNode)`: The claim is not a leaf.
    /// - `Err(FaultError::StepIgnoreInvalidPath)`: The claim's ancestry disagrees with the trace.
    /// - `Err(FaultError)`: The step could not be determined.
    pub async fn attempt_step<G: Game + ?Sized>(
        &self,
        ctx: &CancelToken,
        game: &G,
        claim: &Claim,
    ) -> Result<StepData, FaultError> {
        if claim.depth() != self.game_depth {
            return Err(FaultError::StepNonLeafNode);
        }

        let parent = self.parent_of(ctx, game, claim).await?;
        if !self.agree_with_claim_path(ctx, game, &parent).await? {
            return Err(FaultError::StepIgnoreInvalidPath);
        }

        // If we disagree with the leaf, its own step is wrong and we attack from the state before
        // it. If we agree, the dispute is over the step immediately after it.
        let claim_correct = self.agree_with_claim(ctx, &claim.data).await?;
        let step_position = if claim_correct {
            claim.position().move_right()?
        } else {
            claim.position()
        };
        let (pre_state, proof_data, oracle_data) = self.step_data_at(ctx, step_position).await?;

        tracing::debug!(
            target: "claim-solver",
            "Stepping on claim {} at {} (attack: {})",
            claim.contract_index,
            step_position,
            !claim_correct
        );
        Ok(StepData {
            leaf_claim: *claim,
            is_attack: !claim_correct,
            pre_state,
            proof_data,
            oracle_data,
        })
    }

    /// Returns `true` if the [TraceProvider] holds the claimed value at the claimed position.
    pub async fn agree_with_claim(
        &self,
        ctx: &CancelToken,
        claim: &ClaimData,
    ) -> Result<bool, FaultError> {
        let ours = self.trace_at(ctx, claim.position).await?;
        Ok(ours == claim.value)
    }

    /// Returns `true` if we agree with the claim and with every second claim above it. The walk
    /// stops at the root or at a child of the root.
    pub async fn agree_with_claim_path<G: Game + ?Sized>(
        &self,
        ctx: &CancelToken,
        game: &G,
        claim: &Claim,
    ) -> Result<bool, FaultError> {
        // `parent_of` only yields claims exactly one level up, so the walk ends at the root
        // within `claim.depth() / 2 + 1` iterations even on a malformed game.
        let mut current = *claim;
        loop {
            if !self.agree_with_claim(ctx, &current.data).await? {
                return Ok(false);
            }
            if current.is_root() {
                return Ok(true);
            }
            let parent = self.parent_of(ctx, game, &current).await?;
            if parent.is_root() {
                return Ok(true);
            }
            current = self.parent_of(ctx, game, &parent).await?;
        }
    }

    /// Builds the counter claim against `claim`.
    async fn counter(
        &self,
        ctx: &CancelToken,
        claim: &Claim,
        is_attack: bool,
    ) -> Result<Move, FaultError> {
        let position = claim.position().make_move(is_attack)?;
        let value = self.trace_at(ctx, position).await?;
        tracing::debug!(
            target: "claim-solver",
            "{} claim {} at {}",
            if is_attack { "Attacking" } else { "Defending" },
            claim.contract_index,
            position
        );
        Ok(Move {
            data: ClaimData::new(value, position),
            parent_index: claim.contract_index,
            is_attack,
        })
    }

    /// Fetches the parent of a claim, rejecting parents that are not exactly one level up.
    async fn parent_of<G: Game + ?Sized>(
        &self,
        ctx: &CancelToken,
        game: &G,
        claim: &Claim,
    ) -> Result<Claim, FaultError> {
        let parent = ctx.run(game.parent(claim)).await?;
        if parent.depth() + 1 != claim.depth() {
            return Err(FaultError::InvalidAncestry {
                contract_index: claim.contract_index,
                depth: claim.depth(),
                parent_depth: parent.depth(),
            });
        }
        Ok(parent)
    }

    async fn trace_at(
        &self,
        ctx: &CancelToken,
        position: Position,
    ) -> Result<TraceValue, FaultError> {
        tracing::trace!(target: "claim-solver", "Fetching trace value at {}", position);
        ctx.run(async { self.provider.get(position).await.map_err(FaultError::Trace) })
            .await
    }

    async fn step_data_at(
        &self,
        ctx: &CancelToken,
        position: Position,
    ) -> Result<(Bytes, Bytes, Option<PreimageOracleData>), FaultError> {
        tracing::trace!(target: "claim-solver", "Fetching step data at {}", position);
        ctx.run(async {
            self.provider
                .get_step_data(position)
                .await
                .map_err(FaultError::Trace)
        })
        .await
    }
}
