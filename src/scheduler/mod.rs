/*!
 * Scheduler Module
 * Time slicing of round-robin jobs
 */

pub mod rotation;
pub mod task;

pub use rotation::{rotate, signal_replica};
pub use task::{RotationCommand, RotationTask};
