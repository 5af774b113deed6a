/*!
 * Job Reports
 * User-facing status lines
 */

use super::types::{Job, JobStatus};

/// `[n]\t<label>\t<command>` plus ` {*N}` for replicated jobs
pub fn status_line(index: usize, job: &Job) -> String {
    let mut line = format!("[{}]\t{}\t{}", index, job.status(), job.command());
    if job.replicas() > 1 {
        line.push_str(&format!(" {{*{}}}", job.replicas()));
    }
    line
}

pub fn background_line(job: &Job) -> String {
    format!(
        "Background job ... pid : {}, command : {}",
        group_id(job),
        job.command()
    )
}

/// Outcome of a foreground wait
pub fn foreground_line(job: &Job) -> String {
    let outcome = match job.status() {
        JobStatus::Stopped => "stopped".to_string(),
        JobStatus::Signaled => format!("signaled : {}", job.info()),
        _ => format!("exited : {}", job.info()),
    };
    format!(
        "Foreground job ... pid : {}, command : {}, {}",
        group_id(job),
        job.command(),
        outcome
    )
}

fn group_id(job: &Job) -> i32 {
    job.pgid().map(|pid| pid.as_raw()).unwrap_or(-1)
}
