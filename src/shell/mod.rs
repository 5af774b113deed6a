/*!
 * Shell Module
 * Session loop and job control context
 */

pub mod control;
pub mod session;

pub use control::JobControl;
pub use session::Shell;
