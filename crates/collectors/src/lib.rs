//! # Collectors
//!
//! Metric sources of the agent.
//!
//! Responsibilities:
//! - Look up a concrete source by name (`create`)
//! - Provide the built-in sources (`Test`, `CPU`)
//! - Drive each source on its own interval (`SourceHandle`)
//!
//! ## Usage Example
//!
//! ```ignore
//! use collectors::{create_with_queue, SourceHandle};
//!
//! let (source, rx) = create_with_queue("CPU", 100)?;
//! let handle = SourceHandle::spawn(source);
//! // hand `rx` to the dispatcher
//! ```

mod cpu;
mod error;
mod registry;
mod scheduler;
mod test_collector;

pub use contracts::{MetricReceiver, MetricSource};
pub use cpu::CpuCollector;
pub use error::{CollectorError, Result};
pub use registry::{create, create_with_queue, KNOWN_COLLECTORS};
pub use scheduler::SourceHandle;
pub use test_collector::TestCollector;
