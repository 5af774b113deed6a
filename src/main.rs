/*!
 * jobsh - Main Entry Point
 *
 * Interactive job-control shell. Exits 0 on `exit` or end of input; a
 * failure to claim the terminal is reported as a diagnostic.
 */

use jobsh::{init_tracing, Shell, ShellConfig};
use tracing::info;

fn main() -> miette::Result<()> {
    let config = ShellConfig::from_env();
    init_tracing(config.trace_json);

    info!(prompt = %config.prompt, "jobsh starting");
    let mut shell = Shell::new(config)?;
    shell.run();

    Ok(())
}
