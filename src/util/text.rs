use std::io;

/// Builder for file bodies assembled from single-line fragments.
///
/// Used for project templates and for scripts typed in line by line, so no source file
/// ever needs a multi-line string literal.
///
/// Invariants:
/// - Each pushed line must not contain `\n`, `\r`, or `\0`.
/// - `build()` joins lines with `\n` and ends with `\n` when non-empty.
#[derive(Debug, Default, Clone)]
pub struct TextLines {
    lines: Vec<String>,
}

impl TextLines {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Push one logical line (no embedded CR/LF/NUL).
    pub fn push(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn build(&self) -> io::Result<String> {
        if let Some(i) = self
            .lines
            .iter()
            .position(|l| l.contains('\n') || l.contains('\r') || l.contains('\0'))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("text line {i} contains a newline or NUL; use atomic lines"),
            ));
        }
        if self.lines.is_empty() {
            return Ok(String::new());
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}
