//! Synchronization of a database into a project
//!
//! - **engine**: the run state machine, structure phase and worker pool
//! - **progress**: progress ticks and sinks
//! - **report**: the summary of a successful run

mod engine;
mod progress;
mod report;

pub use engine::{SyncEngine, SyncOptions, SyncState};
pub use progress::{NoProgress, ProgressCounter, ProgressSink, ProgressTick};
pub use report::SyncReport;
