/*!
 * Signals Module
 * Signal delivery and disposition management
 */

pub mod delivery;
pub mod disposition;
pub mod traits;

pub use delivery::{NixSignaller, RecordingSignaller, Target};
pub use disposition::{ignore_job_control_signals, restore_default_dispositions};
pub use traits::Signaller;
