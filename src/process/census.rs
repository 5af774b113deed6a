/*!
 * Process Census
 * Snapshot of every process on the system, read from /proc
 */

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

const PROC_ROOT: &str = "/proc";
pub const CENSUS_HEADER: &str = "PID\tPPID\tTHREADS\tCHILDREN\tCOMMAND";

/// One row of the census table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CensusEntry {
    pub pid: i32,
    pub ppid: i32,
    pub threads: u64,
    pub children: usize,
    pub command: String,
}

impl CensusEntry {
    pub fn row(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.pid, self.ppid, self.threads, self.children, self.command
        )
    }
}

/// Parse the contents of `/proc/<pid>/stat`.
///
/// The command name sits between the first `(` and the last `)` and may
/// itself contain spaces or parentheses.
pub fn parse_stat(contents: &str) -> Option<CensusEntry> {
    let open = contents.find('(')?;
    let close = contents.rfind(')')?;
    if close < open {
        return None;
    }

    let pid = contents[..open].trim().parse().ok()?;
    let command = contents[open + 1..close].to_string();
    // Fields after the name start at `state` (field 3)
    let fields: Vec<&str> = contents[close + 1..].split_whitespace().collect();
    let ppid = fields.get(1)?.parse().ok()?;
    let threads = fields.get(17)?.parse().ok()?;

    Some(CensusEntry {
        pid,
        ppid,
        threads,
        children: 0,
        command,
    })
}

/// Every readable process, sorted by pid, with child counts filled in
pub fn take_census() -> io::Result<Vec<CensusEntry>> {
    take_census_from(Path::new(PROC_ROOT))
}

pub fn take_census_from(root: &Path) -> io::Result<Vec<CensusEntry>> {
    let mut entries = Vec::new();

    for dirent in fs::read_dir(root)? {
        let dirent = dirent?;
        let is_pid = dirent
            .file_name()
            .to_str()
            .is_some_and(|name| name.bytes().all(|b| b.is_ascii_digit()));
        if !is_pid {
            continue;
        }
        // The process may exit between listing and reading
        let Ok(stat) = fs::read_to_string(dirent.path().join("stat")) else {
            continue;
        };
        if let Some(entry) = parse_stat(&stat) {
            entries.push(entry);
        }
    }

    let mut children: HashMap<i32, usize> = HashMap::new();
    for entry in &entries {
        *children.entry(entry.ppid).or_default() += 1;
    }
    for entry in &mut entries {
        entry.children = children.get(&entry.pid).copied().unwrap_or(0);
    }
    entries.sort_by_key(|entry| entry.pid);

    Ok(entries)
}

/// Header line followed by one row per entry
pub fn render(entries: &[CensusEntry]) -> Vec<String> {
    std::iter::once(CENSUS_HEADER.to_string())
        .chain(entries.iter().map(CensusEntry::row))
        .collect()
}
