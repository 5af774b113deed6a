/*!
 * Shell Limits and Constants
 *
 * Input caps, timer defaults and the fixed strings the shell prints.
 */

use std::time::Duration;

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Maximum arguments kept per pipeline stage; extra words are dropped
pub const MAX_ARGS: usize = 32;

/// Maximum command line length in bytes; longer input is truncated
pub const MAX_LINE_COMMAND: usize = 256;

// =============================================================================
// SCHEDULING
// =============================================================================

/// Time slice given to the active replica of a round-robin job
pub const ROTATION_QUANTUM: Duration = Duration::from_secs(1);

/// Worker threads for the background runtime (reaper, rotation, watchdogs)
pub const RUNTIME_WORKERS: usize = 2;

// =============================================================================
// PRESENTATION
// =============================================================================

/// Default interactive prompt
pub const DEFAULT_PROMPT: &str = "SHELL > ";

/// Column width of the status label in job listings
pub const STATUS_LABEL_WIDTH: usize = 15;

/// Permission bits for files created by output redirection
pub const REDIRECT_MODE: u32 = 0o644;

/// Exit status reported for a pipeline stage that could not be started
pub const FAILED_START_STATUS: i32 = 1;
