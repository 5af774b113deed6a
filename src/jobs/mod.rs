/*!
 * Jobs Module
 * Job model, store and reconciliation
 */

pub mod reconcile;
pub mod report;
pub mod store;
pub mod types;

pub use reconcile::{Settlement, StatusChange};
pub use store::JobStore;
pub use types::{Job, JobGroup, JobId, JobKind, JobStatus, ProcState, Process, ReplicaIndex};
