/*!
 * Monitoring Module
 * Diagnostic output for the shell engine
 */

pub mod tracer;

pub use tracer::init_tracing;
