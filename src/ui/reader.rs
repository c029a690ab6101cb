use std::collections::VecDeque;
use std::io::{self, BufRead};

/// Source of operator input, one line at a time.
///
/// `Ok(None)` means end of input. Returned lines have their trailing newline removed.
pub trait LineReader {
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Read a line without echoing it (secrets). Defaults to `read_line`.
    fn read_secret(&mut self) -> io::Result<Option<String>> {
        self.read_line()
    }
}

/// Reads from the process stdin; suppresses echo for secrets when stdin is a terminal.
#[derive(Debug, Default)]
pub struct TerminalReader;

impl TerminalReader {
    pub fn new() -> Self {
        Self
    }
}

fn read_stdin_line() -> io::Result<Option<String>> {
    read_line_from(&mut io::stdin().lock())
}

/// One line from `src`. Bytes that are not UTF-8 are replaced, so the caller sees an
/// unrecognised choice rather than a read error.
fn read_line_from<B: BufRead>(src: &mut B) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    let n = src.read_until(b'\n', &mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(trim_newline(String::from_utf8_lossy(&buf).into_owned())))
}

fn trim_newline(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}

impl LineReader for TerminalReader {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        read_stdin_line()
    }

    #[cfg(unix)]
    fn read_secret(&mut self) -> io::Result<Option<String>> {
        if !atty::is(atty::Stream::Stdin) {
            return read_stdin_line();
        }
        // Save current stty state, disable echo, restore afterwards (or sane fallback)
        let saved = std::process::Command::new("stty")
            .arg("-g")
            .stdin(std::process::Stdio::inherit())
            .output()
            .ok()
            .and_then(|o| {
                if o.status.success() {
                    Some(String::from_utf8_lossy(&o.stdout).trim().to_string())
                } else {
                    None
                }
            });
        let _ = std::process::Command::new("stty")
            .arg("-echo")
            .stdin(std::process::Stdio::inherit())
            .status();

        let res = read_stdin_line();

        let restore = saved.as_deref().unwrap_or("sane");
        let _ = std::process::Command::new("stty")
            .arg(restore)
            .stdin(std::process::Stdio::inherit())
            .status();
        res
    }
}

/// Replays a fixed list of lines, then reports end of input. Drives the navigator in tests
/// and non-interactive runs.
#[derive(Debug, Default, Clone)]
pub struct ScriptedReader {
    lines: VecDeque<String>,
    secrets_read: usize,
}

impl ScriptedReader {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            secrets_read: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }

    /// How many lines were consumed through `read_secret`.
    pub fn secrets_read(&self) -> usize {
        self.secrets_read
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn read_secret(&mut self) -> io::Result<Option<String>> {
        let line = self.lines.pop_front();
        if line.is_some() {
            self.secrets_read += 1;
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_reader_replays_then_ends() {
        let mut r = ScriptedReader::new(["10", "1"]);
        assert_eq!(r.read_line().unwrap().as_deref(), Some("10"));
        assert_eq!(r.read_secret().unwrap().as_deref(), Some("1"));
        assert_eq!(r.secrets_read(), 1);
        assert_eq!(r.read_line().unwrap(), None);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn non_utf8_line_is_replaced_not_an_error() {
        let mut src = io::Cursor::new(b"\xff\xfe\n0\n".to_vec());
        let first = read_line_from(&mut src).unwrap().unwrap();
        assert_eq!(first, "\u{fffd}\u{fffd}");
        assert_eq!(read_line_from(&mut src).unwrap().as_deref(), Some("0"));
        assert_eq!(read_line_from(&mut src).unwrap(), None);
    }

    #[test]
    fn last_line_without_newline_is_returned() {
        let mut src = io::Cursor::new(b"exit".to_vec());
        assert_eq!(read_line_from(&mut src).unwrap().as_deref(), Some("exit"));
        assert_eq!(read_line_from(&mut src).unwrap(), None);
    }

    #[test]
    fn trim_newline_handles_crlf() {
        assert_eq!(trim_newline("abc\r\n".to_string()), "abc");
        assert_eq!(trim_newline("abc".to_string()), "abc");
    }
}
