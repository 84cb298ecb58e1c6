//! The `agent` module contains the [Agent], which solves every claim in a game snapshot and hands
//! the resulting responses to a [Responder].

use crate::{AgentConfig, Responder};
use anyhow::{anyhow, Result};
use honest_challenger_solvers::fault::{
    CancelToken, Claim, ClaimSolver, FaultDisputeState, Response, TraceProvider,
};
use std::sync::Arc;
use tokio::{sync::Semaphore, task::JoinSet};

/// The [Agent] plays one side of a fault dispute game.
#[derive(Debug)]
pub struct Agent<P, R> {
    /// The configuration for the agent.
    pub config: AgentConfig,
    solver: Arc<ClaimSolver<P>>,
    responder: R,
}

impl<P, R> Agent<P, R>
where
    P: TraceProvider + 'static,
    R: Responder,
{
    /// Creates a new [Agent].
    pub fn new(config: AgentConfig, provider: P, responder: R) -> Self {
        Self {
            config,
            solver: Arc::new(ClaimSolver::new(config.max_depth, provider)),
            responder,
        }
    }

    /// Returns the agent's [ClaimSolver].
    pub fn solver(&self) -> &ClaimSolver<P> {
        &self.solver
    }

    /// Returns `true` if the claim sits on a level that we argue for. We never counter those.
    pub fn agree_with_claim_level(&self, claim: &Claim) -> bool {
        let is_odd_level = claim.depth() % 2 == 1;
        if self.config.agree_with_proposed_output {
            !is_odd_level
        } else {
            is_odd_level
        }
    }

    /// Solves every claim in the snapshot that sits on an opposing level.
    ///
    /// Claims are solved concurrently, up to `max_concurrency` at a time. The first failure aborts
    /// the remaining work and is returned. Moves that have already been posted become
    /// [Response::DoNothing].
    ///
    /// ### Returns
    /// - `Ok(Vec<(usize, Response)>)`: The response to each solved claim, ordered by contract
    ///   index.
    /// - `Err(anyhow::Error)`: A claim could not be solved. Solver failures downcast to
    ///   [FaultError](honest_challenger_solvers::fault::FaultError).
    pub async fn solve(
        &self,
        ctx: &CancelToken,
        game: Arc<FaultDisputeState>,
    ) -> Result<Vec<(usize, Response)>> {
        if game.max_depth() != self.config.max_depth {
            return Err(anyhow!(
                "Game max depth {} does not match the configured max depth {}",
                game.max_depth(),
                self.config.max_depth
            ));
        }

        let permits = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks = JoinSet::new();
        for claim in game.claims().iter().copied() {
            if self.agree_with_claim_level(&claim) {
                tracing::trace!(target: "challenger-agent", "Skipping claim {} on our own level", claim.contract_index);
                continue;
            }

            let (solver, game, ctx, permits) = (
                Arc::clone(&self.solver),
                Arc::clone(&game),
                ctx.clone(),
                Arc::clone(&permits),
            );
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await?;
                let response = solver.respond(&ctx, &*game, &claim).await?;
                Ok::<_, anyhow::Error>((claim.contract_index, response))
            });
        }

        let mut responses = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            // Returning drops the set, which aborts every task still running.
            responses.push(joined??);
        }
        responses.sort_by_key(|(index, _)| *index);

        for (index, response) in responses.iter_mut() {
            if let Response::Move(mv) = response {
                if game.is_duplicate(mv) {
                    tracing::debug!(target: "challenger-agent", "Move against claim {} already posted", index);
                    *response = Response::DoNothing;
                }
            }
        }

        Ok(responses)
    }

    /// Solves the snapshot and submits every actionable response.
    ///
    /// ### Returns
    /// - `Ok(usize)`: The number of responses submitted.
    /// - `Err(anyhow::Error)`: Solving or submission failed.
    pub async fn act(&self, ctx: &CancelToken, game: Arc<FaultDisputeState>) -> Result<usize> {
        let responses = self.solve(ctx, game).await?;

        let mut submitted = 0;
        for (index, response) in responses {
            if !response.is_actionable() {
                continue;
            }
            tracing::info!(target: "challenger-agent", "Submitting response to claim {}", index);
            self.responder.respond(response).await?;
            submitted += 1;
        }
        Ok(submitted)
    }
}
