/*!
 * Process Module
 * Launching, waiting on and supervising child processes
 */

pub mod census;
pub mod launcher;
pub mod output;
pub mod wait;
pub mod watchdog;

pub use census::{take_census, CensusEntry};
pub use launcher::{spawn_job, LaunchContext};
pub use output::FdWriter;
pub use wait::{poll_status, wait_group};
pub use watchdog::spawn_watchdog;
