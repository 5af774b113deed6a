/*!
 * Terminal Module
 * Controlling terminal ownership and job hand-over
 */

pub mod arbiter;
pub mod device;

pub use arbiter::Arbiter;
pub use device::Terminal;
