//! The `config` module contains the [AgentConfig].

/// The number of claims solved at once when no limit is given.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// The max depth of the game tree when none is given.
pub const DEFAULT_MAX_DEPTH: u8 = 4;

/// The [AgentConfig] struct contains the configuration for the [Agent](crate::Agent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    /// The max depth of the game tree.
    pub max_depth: u8,
    /// Whether we agree with the proposed output, i.e. the root claim. This decides which levels
    /// of the game tree we argue for: even levels if we agree, odd levels if we do not.
    pub agree_with_proposed_output: bool,
    /// The maximum number of claims solved concurrently. Never zero.
    pub max_concurrency: usize,
}

impl AgentConfig {
    /// Creates a new [AgentConfig] with the given configuration.
    pub fn new(max_depth: u8, agree_with_proposed_output: bool, max_concurrency: usize) -> Self {
        Self {
            max_depth,
            agree_with_proposed_output,
            max_concurrency: max_concurrency.max(1),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH, false, DEFAULT_MAX_CONCURRENCY)
    }
}
