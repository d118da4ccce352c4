//! Agent orchestration module.

mod runner;
mod stats;

pub use runner::{Agent, AgentRunConfig};
pub use stats::AgentStats;
