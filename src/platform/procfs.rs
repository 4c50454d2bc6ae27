//! PID → executable name via `/proc/<pid>/stat`.

use std::fs;
use std::io;

/// Resolve the executable (command) name of a running process.
///
/// Reads the second field of `/proc/<pid>/stat`. The kernel truncates it
/// to 15 bytes, which is enough for substring matching.
pub fn executable_name(pid: u32) -> io::Result<String> {
    let stat = fs::read_to_string(format!("/proc/{pid}/stat"))?;
    parse_comm(&stat)
        .map(str::to_string)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed /proc stat line"))
}

/// Extract the command name from a stat line.
///
/// The name is wrapped in parentheses and may itself contain spaces or
/// `)`, so take everything between the first `(` and the last `)`.
fn parse_comm(stat: &str) -> Option<&str> {
    let start = stat.find('(')?;
    let end = stat.rfind(')')?;
    if end <= start {
        return None;
    }
    Some(&stat[start + 1..end])
}
