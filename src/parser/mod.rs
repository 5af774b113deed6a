/*!
 * Command Parser
 * Turns a command line into pipeline stages plus launch modifiers
 */

pub mod plan;
mod tokenizer;
pub mod types;

pub use plan::LaunchPlan;
pub use types::{ParseLimits, Pipeline, Stage};
