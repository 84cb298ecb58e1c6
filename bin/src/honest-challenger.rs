use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser};
use honest_challenger_driver::{Agent, AgentConfig, ChannelResponder, DEFAULT_MAX_CONCURRENCY};
use honest_challenger_solvers::fault::{
    cancel_pair, AlphabetTraceProvider, FaultDisputeState, FaultError,
};
use std::{path::PathBuf, sync::Arc};
use tracing::Level;

/// Arguments for the `honest-challenger` binary.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Verbosity level (0-4)
    #[arg(long, short, help = "Verbosity level (0-4)", action = ArgAction::Count, env = "VERBOSITY")]
    v: u8,

    /// Path to a JSON snapshot of the dispute game.
    #[arg(
        long,
        short,
        help = "Path to a JSON snapshot of the dispute game.",
        env = "HONEST_CHALLENGER_GAME"
    )]
    game: PathBuf,

    /// The alphabet trace to solve against.
    #[arg(
        long,
        short,
        help = "The alphabet trace to solve against.",
        env = "HONEST_CHALLENGER_ALPHABET"
    )]
    alphabet: String,

    /// Whether we agree with the proposed output (the root claim).
    #[arg(
        long,
        help = "Whether we agree with the proposed output (the root claim).",
        env = "HONEST_CHALLENGER_AGREE_WITH_PROPOSED_OUTPUT"
    )]
    agree_with_proposed_output: bool,

    /// The maximum number of claims solved concurrently.
    #[arg(
        long,
        help = "The maximum number of claims solved concurrently.",
        default_value_t = DEFAULT_MAX_CONCURRENCY,
        env = "HONEST_CHALLENGER_MAX_CONCURRENCY"
    )]
    max_concurrency: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse the command arguments
    let Args {
        v,
        game,
        alphabet,
        agree_with_proposed_output,
        max_concurrency,
    } = Args::parse();

    // Initialize the tracing subscriber
    init_tracing_subscriber(v)?;

    // Load the game snapshot.
    let raw = tokio::fs::read_to_string(&game)
        .await
        .with_context(|| format!("Failed to read game snapshot {}", game.display()))?;
    let state: FaultDisputeState = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid game snapshot {}", game.display()))?;
    tracing::info!(target: "honest-challenger-cli", "Loaded game snapshot with {} claims.", state.claims().len());

    // Create the agent.
    let config = AgentConfig::new(state.max_depth(), agree_with_proposed_output, max_concurrency);
    let provider = AlphabetTraceProvider::new(alphabet.into_bytes(), config.max_depth)?;
    let (responder, mut responses) = ChannelResponder::channel();
    let agent = Agent::new(config, provider, responder);
    tracing::debug!(target: "honest-challenger-cli", "Agent created with config {:?}", config);

    // Print every response the agent submits.
    let printer = tokio::spawn(async move {
        while let Some(response) = responses.recv().await {
            match serde_json::to_string(&response) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    tracing::error!(target: "honest-challenger-cli", "Error serializing response: {}", e)
                }
            }
        }
    });

    // Cancel the solving pass on Ctrl-C.
    let (cancel, ctx) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(target: "honest-challenger-cli", "Interrupted, cancelling...");
            cancel.cancel();
        }
    });

    let result = agent.act(&ctx, Arc::new(state)).await;
    drop(agent);
    printer.await?;

    match result {
        Ok(submitted) => {
            tracing::info!(target: "honest-challenger-cli", "Submitted {} responses.", submitted);
            Ok(())
        }
        Err(e) if matches!(e.downcast_ref::<FaultError>(), Some(FaultError::Cancelled)) => {
            tracing::warn!(target: "honest-challenger-cli", "Solving cancelled before completion.");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Initializes the tracing subscriber
///
/// # Arguments
/// * `verbosity_level` - The verbosity level (0-4)
///
/// # Returns
/// * `Result<()>` - Ok if successful, Err otherwise.
fn init_tracing_subscriber(verbosity_level: u8) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(match verbosity_level {
            0 => Level::ERROR,
            1 => Level::WARN,
            2 => Level::INFO,
            3 => Level::DEBUG,
            _ => Level::TRACE,
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| anyhow!(e))
}
