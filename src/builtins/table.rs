/*!
 * Built-in Table
 * Name to handler mapping, resolved once at startup
 */

use super::handlers;
use crate::core::ShellResult;
use crate::jobs::JobId;
use crate::parser::LaunchPlan;
use crate::shell::Shell;
use std::fmt;
use std::io::Write;

/// Arguments handed to an inline built-in
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// The job created for this command line
    pub job: JobId,
    pub args: &'a [String],
}

/// State captured before forking, read by forked built-ins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub jobs: Vec<String>,
    pub history: Vec<String>,
}

/// Runs inside the shell process
pub type InlineHandler = fn(&mut Shell, &Invocation<'_>) -> ShellResult<()>;

/// Runs in a forked child and writes to `out`; the return value is the
/// child's exit status
pub type ForkedHandler = fn(&[String], &Snapshot, &mut dyn Write) -> i32;

#[derive(Clone, Copy)]
pub enum Handler {
    Inline(InlineHandler),
    Forked(ForkedHandler),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(_) => f.write_str("Inline"),
            Self::Forked(_) => f.write_str("Forked"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub handler: Handler,
}

impl Builtin {
    pub fn runs_forked(&self) -> bool {
        matches!(self.handler, Handler::Forked(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuiltinTable {
    entries: Vec<Builtin>,
}

impl BuiltinTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// exit, fg, bg, jobs, cd, rr, history, timeout, children
    pub fn standard() -> Self {
        Self::new()
            .inline("exit", handlers::exit)
            .inline("fg", handlers::foreground)
            .inline("bg", handlers::background)
            .forked("jobs", handlers::jobs)
            .inline("cd", handlers::change_directory)
            .inline(LaunchPlan::ROUND_ROBIN, handlers::round_robin)
            .forked("history", handlers::history)
            .inline(LaunchPlan::TIMEOUT, handlers::timeout)
            .forked("children", handlers::children)
    }

    pub fn inline(mut self, name: &'static str, handler: InlineHandler) -> Self {
        self.entries.push(Builtin {
            name,
            handler: Handler::Inline(handler),
        });
        self
    }

    pub fn forked(mut self, name: &'static str, handler: ForkedHandler) -> Self {
        self.entries.push(Builtin {
            name,
            handler: Handler::Forked(handler),
        });
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&Builtin> {
        self.entries.iter().find(|builtin| builtin.name == name)
    }

    pub fn forked_handler(&self, name: &str) -> Option<ForkedHandler> {
        match self.lookup(name)?.handler {
            Handler::Forked(handler) => Some(handler),
            Handler::Inline(_) => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|builtin| builtin.name)
    }
}
