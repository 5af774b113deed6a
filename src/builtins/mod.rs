/*!
 * Built-ins Module
 * Commands implemented by the shell itself
 */

pub mod handlers;
pub mod history;
pub mod table;

pub use history::History;
pub use table::{Builtin, BuiltinTable, ForkedHandler, Handler, InlineHandler, Invocation, Snapshot};
