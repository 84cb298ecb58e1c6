#![doc = include_str!("../README.md")]

mod config;
pub use config::{AgentConfig, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_DEPTH};

mod responder;
pub use responder::{ChannelResponder, Responder, RESPONSE_CHANNEL_CAPACITY};

mod agent;
pub use agent::Agent;
