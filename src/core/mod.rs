//! Core application primitives (scheduling, request sequencing, the dev
//! backend and the interactive runtime)

pub mod http;
pub mod runtime;
pub mod scheduler;
pub mod sequence;

pub use runtime::{Command, DashboardRuntime, RuntimeConfig};
pub use scheduler::IntervalScheduler;
pub use sequence::RequestSequence;
