/*!
 * jobsh Library
 * Job-control shell engine: process groups, terminal hand-over,
 * asynchronous status reconciliation and round-robin time slicing
 */

pub mod builtins;
pub mod core;
pub mod jobs;
pub mod monitoring;
pub mod parser;
pub mod process;
pub mod scheduler;
pub mod shell;
pub mod signals;
pub mod terminal;

// Re-exports
pub use crate::core::{ShellConfig, ShellError, ShellResult};
pub use builtins::{BuiltinTable, Snapshot};
pub use jobs::{Job, JobId, JobStatus, JobStore, ProcState, StatusChange};
pub use monitoring::init_tracing;
pub use parser::{LaunchPlan, Pipeline};
pub use shell::{JobControl, Shell};
pub use signals::{NixSignaller, RecordingSignaller, Signaller};
