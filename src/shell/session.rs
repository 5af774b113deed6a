/*!
 * Shell Session
 * The interactive loop: read, reconcile, report, parse, dispatch
 */

use super::control::JobControl;
use crate::builtins::{BuiltinTable, Handler, Invocation};
use crate::core::limits::RUNTIME_WORKERS;
use crate::core::{ShellConfig, ShellResult};
use crate::parser::{LaunchPlan, Pipeline};
use crate::terminal::Terminal;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

pub struct Shell {
    control: Arc<JobControl>,
    runtime: Option<Runtime>,
    running: bool,
}

impl Shell {
    /// Interactive shell: claims the terminal and starts the reaper
    pub fn new(config: ShellConfig) -> ShellResult<Self> {
        let runtime = build_runtime()?;
        let terminal = Terminal::acquire()?;
        let control = JobControl::new(
            config,
            Some(terminal),
            Arc::new(BuiltinTable::standard()),
            runtime.handle().clone(),
        );
        control.start_reaper();
        Ok(Self::assemble(control, runtime))
    }

    /// Shell without terminal control or reaper; callers reconcile explicitly
    pub fn detached(config: ShellConfig) -> ShellResult<Self> {
        let runtime = build_runtime()?;
        let control = JobControl::new(
            config,
            None,
            Arc::new(BuiltinTable::standard()),
            runtime.handle().clone(),
        );
        Ok(Self::assemble(control, runtime))
    }

    fn assemble(control: Arc<JobControl>, runtime: Runtime) -> Self {
        Self {
            control,
            runtime: Some(runtime),
            running: true,
        }
    }

    pub fn control(&self) -> &Arc<JobControl> {
        &self.control
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_exit(&mut self) {
        self.running = false;
    }

    /// Read and execute lines from stdin until `exit` or end of input
    pub fn run(&mut self) {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut line = String::new();

        while self.running {
            self.report_pending();
            print!("{}", self.control.config().prompt);
            let _ = io::stdout().flush();

            line.clear();
            match input.read_line(&mut line) {
                Ok(0) => {
                    println!();
                    break;
                }
                Ok(_) => self.execute(&line),
                Err(err) => {
                    warn!(%err, "reading command line failed");
                    break;
                }
            }
        }

        self.shutdown();
    }

    /// Reconcile and print finished or notifying background jobs
    pub fn report_pending(&self) {
        self.control.reconcile();
        for line in self.control.drain_notifications() {
            println!("{line}");
        }
    }

    /// Parse one command line and dispatch it
    pub fn execute(&mut self, line: &str) {
        let pipeline = Pipeline::parse_with(line, self.control.config().parse_limits());
        if pipeline.is_empty() {
            return;
        }
        self.control.record_history(line);
        let id = self.control.create_job(line, &pipeline);

        let builtin = self.control.builtins().lookup(pipeline.program()).copied();
        match builtin.map(|b| b.handler) {
            Some(Handler::Inline(handler)) => {
                debug!(builtin = pipeline.program(), job = %id, "inline built-in");
                self.control.mark_internal(id);
                let invocation = Invocation {
                    job: id,
                    args: pipeline.first_args(),
                };
                if let Err(err) = handler(self, &invocation) {
                    println!("{err}");
                }
                self.control.discard_internal(id);
            }
            _ => match self.control.start(id, LaunchPlan::Plain) {
                Ok(report) => println!("{report}"),
                Err(err) => println!("{err}"),
            },
        }
    }

    pub fn shutdown(&mut self) {
        self.running = false;
        self.control.shutdown();
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
        println!("Bye");
        info!("shell exited");
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            self.control.shutdown();
            runtime.shutdown_background();
        }
    }
}

fn build_runtime() -> ShellResult<Runtime> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(RUNTIME_WORKERS)
        .thread_name("jobsh-worker")
        .enable_all()
        .build()?;
    Ok(runtime)
}
