/*!
 * Core Module
 * Errors, limits and configuration shared by every subsystem
 */

pub mod config;
pub mod errors;
pub mod limits;

pub use config::ShellConfig;
pub use errors::{ShellError, ShellResult};
