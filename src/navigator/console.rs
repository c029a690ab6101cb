//! Prompting and status output on top of a `LineReader` and an output sink.
use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::color::{paint, CYAN, GREEN, RED, YELLOW};
use crate::errors::InputClosed;
use crate::ui::{draw_box, numbered, LineReader};

pub struct Console<R, W> {
    reader: R,
    out: W,
    use_color: bool,
    clear_screen: bool,
    redraw_delay: Duration,
}

impl<R: LineReader, W: Write> Console<R, W> {
    /// Plain console: no color, no screen clearing, no redraw delay.
    pub fn new(reader: R, out: W) -> Self {
        Self {
            reader,
            out,
            use_color: false,
            clear_screen: false,
            redraw_delay: Duration::ZERO,
        }
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn with_clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    pub fn with_redraw_delay(mut self, delay: Duration) -> Self {
        self.redraw_delay = delay;
        self
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.out)
    }

    pub fn paint(&self, code: &str, s: &str) -> String {
        paint(self.use_color, code, s)
    }

    pub fn clear(&mut self) -> Result<()> {
        if self.clear_screen {
            write!(self.out, "\x1b[2J\x1b[H")?;
        }
        Ok(())
    }

    /// Sleep for the configured redraw delay.
    pub fn linger(&self) {
        if !self.redraw_delay.is_zero() {
            thread::sleep(self.redraw_delay);
        }
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    pub fn blank(&mut self) -> Result<()> {
        writeln!(self.out)?;
        Ok(())
    }

    pub fn ok(&mut self, msg: &str) -> Result<()> {
        let s = self.paint(GREEN, &format!("[+] {msg}"));
        self.line(&s)
    }

    pub fn warn(&mut self, msg: &str) -> Result<()> {
        let s = self.paint(YELLOW, &format!("[!] {msg}"));
        self.line(&s)
    }

    pub fn error(&mut self, msg: &str) -> Result<()> {
        let s = self.paint(RED, &format!("[X] {msg}"));
        self.line(&s)
    }

    pub fn info(&mut self, msg: &str) -> Result<()> {
        let s = self.paint(CYAN, msg);
        self.line(&s)
    }

    pub fn boxed(&mut self, title: &str, lines: &[String], color: &str) -> Result<()> {
        draw_box(&mut self.out, title, lines, color, self.use_color)?;
        Ok(())
    }

    /// Print `label`, read one line. End of input is `InputClosed`.
    pub fn prompt(&mut self, label: &str) -> Result<String> {
        self.write_prompt(label)?;
        match self.reader.read_line().context("reading operator input")? {
            Some(line) => Ok(line),
            None => Err(InputClosed.into()),
        }
    }

    /// Like `prompt`, without echo on a terminal. Ends the prompt line itself since the
    /// operator's Enter is not echoed.
    pub fn prompt_secret(&mut self, label: &str) -> Result<String> {
        self.write_prompt(label)?;
        let line = self.reader.read_secret().context("reading operator input")?;
        self.blank()?;
        line.ok_or_else(|| InputClosed.into())
    }

    /// Read a menu choice; `Ok(None)` at end of input.
    pub fn read_choice(&mut self, label: &str) -> Result<Option<String>> {
        self.write_prompt(label)?;
        Ok(self.reader.read_line().context("reading operator input")?)
    }

    fn write_prompt(&mut self, label: &str) -> Result<()> {
        let s = self.paint(CYAN, &format!("> {label}"));
        write!(self.out, "{s}")?;
        self.out.flush()?;
        Ok(())
    }

    /// Wait for ENTER.
    pub fn pause(&mut self) -> Result<()> {
        self.blank()?;
        self.prompt("Press ENTER to return to the menu...")?;
        Ok(())
    }

    /// `y`/`Y` confirms; anything else declines.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.prompt(&format!("{question} (y/n): "))?;
        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }

    /// Show `items` numbered in a box and read a selection.
    ///
    /// Returns the 0-based index, or `None` when the operator typed `0` or an invalid choice
    /// (the latter is reported and followed by the redraw delay).
    pub fn choose<S: AsRef<str>>(
        &mut self,
        title: &str,
        items: &[S],
        color: &str,
        label: &str,
    ) -> Result<Option<usize>> {
        self.blank()?;
        self.boxed(title, &numbered(items), color)?;
        self.blank()?;
        let raw = self.prompt(&format!("{label} (0 to cancel): "))?;
        self.pick_index(&raw, items.len())
    }

    /// Map a typed selection to a 0-based index; `0` and invalid input yield `None`.
    pub(crate) fn pick_index(&mut self, raw: &str, len: usize) -> Result<Option<usize>> {
        let raw = raw.trim();
        if raw == "0" {
            return Ok(None);
        }
        match raw.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => Ok(Some(n - 1)),
            _ => {
                self.error("Invalid choice")?;
                self.linger();
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::is_input_closed;
    use crate::ui::ScriptedReader;

    fn console(lines: &[&str]) -> Console<ScriptedReader, Vec<u8>> {
        Console::new(ScriptedReader::new(lines.iter().copied()), Vec::new())
    }

    #[test]
    fn prompt_at_eof_is_input_closed() {
        let mut c = console(&[]);
        let err = c.prompt("Name: ").unwrap_err();
        assert!(is_input_closed(&err));
    }

    #[test]
    fn choose_returns_index_or_none() {
        let mut c = console(&["2", "0", "9"]);
        let items = ["a", "b"];
        assert_eq!(c.choose("T", &items, CYAN, "Pick").unwrap(), Some(1));
        assert_eq!(c.choose("T", &items, CYAN, "Pick").unwrap(), None);
        assert_eq!(c.choose("T", &items, CYAN, "Pick").unwrap(), None);
        let (_, out) = c.into_parts();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Invalid choice").count(), 1);
        assert!(text.contains("2. b"));
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn pick_index_propagates_output_errors() {
        let mut c = Console::new(ScriptedReader::new(Vec::<String>::new()), BrokenSink);
        assert!(c.pick_index("9", 2).is_err());
        assert_eq!(c.pick_index("0", 2).unwrap(), None);
        assert_eq!(c.pick_index("2", 2).unwrap(), Some(1));
    }

    #[test]
    fn secret_prompt_ends_its_line_on_the_sink() {
        let mut c = console(&["hunter2"]);
        assert_eq!(c.prompt_secret("Password: ").unwrap(), "hunter2");
        let (reader, out) = c.into_parts();
        assert_eq!(reader.secrets_read(), 1);
        assert_eq!(String::from_utf8(out).unwrap(), "> Password: \n");
    }

    #[test]
    fn confirm_accepts_only_y() {
        let mut c = console(&["Y", "yes", ""]);
        assert!(c.confirm("Delete?").unwrap());
        assert!(!c.confirm("Delete?").unwrap());
        assert!(!c.confirm("Delete?").unwrap());
    }
}
