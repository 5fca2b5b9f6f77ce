use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Log file read when `ODOO_LOG_FILE` is unset.
pub const DEFAULT_LOG_FILE: &str = "/var/log/odoo/odoo-server.log";

/// Lines returned by `get_server_logs` when the caller does not say.
pub const DEFAULT_LOG_LINES: usize = 50;

/// Upper bound on lines returned in one call.
pub const MAX_LOG_LINES: usize = 1000;

/// Returns the last `lines` lines of `path`, each terminated by `\n`.
///
/// Streams the file so that only `lines` lines are held in memory.
/// Invalid UTF-8 is replaced rather than failing the whole read.
pub(crate) fn tail(path: &Path, lines: usize) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut window: VecDeque<String> = VecDeque::with_capacity(lines.min(MAX_LOG_LINES));
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if window.len() == lines {
            window.pop_front();
        }
        let mut line = String::from_utf8_lossy(&buf).into_owned();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        window.push_back(line);
    }

    Ok(window.into_iter().collect())
}
