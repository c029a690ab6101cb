use std::io::{self, Write};

use crate::color::{paint, strip_ansi, BOLD};

/// Outer width of every box, borders included.
pub const BOX_WIDTH: usize = 70;

/// Draw a titled double-line box. Content lines may carry ANSI color; padding is computed on
/// the visible text. Lines wider than the box are not truncated.
pub fn draw_box<W: Write>(
    out: &mut W,
    title: &str,
    lines: &[String],
    color: &str,
    use_color: bool,
) -> io::Result<()> {
    let inner = BOX_WIDTH - 2;
    let bar = "═".repeat(inner);
    let edge = paint(use_color, color, "║");
    writeln!(out, "{}", paint(use_color, color, &format!("╔{bar}╗")))?;
    let title_text = pad_visible(&format!(" {title} "), inner);
    writeln!(out, "{edge}{}{edge}", paint(use_color, BOLD, &title_text))?;
    writeln!(out, "{}", paint(use_color, color, &format!("╠{bar}╣")))?;
    for line in lines {
        writeln!(out, "{edge} {} {edge}", pad_visible(line, inner - 2))?;
    }
    writeln!(out, "{}", paint(use_color, color, &format!("╚{bar}╝")))
}

/// Right-pad `s` with spaces so its visible width reaches `width`.
pub fn pad_visible(s: &str, width: usize) -> String {
    let visible = strip_ansi(s).chars().count();
    let mut out = s.to_string();
    if visible < width {
        out.push_str(&" ".repeat(width - visible));
    }
    out
}

/// `"<n>. <text>"` lines, 1-based.
pub fn numbered<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_lines_have_constant_visible_width() {
        let mut buf = Vec::new();
        let lines = vec!["1. \x1b[32m[JS]\x1b[0m app.js".to_string(), String::new()];
        draw_box(&mut buf, "SCRIPTS", &lines, crate::color::CYAN, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        for l in text.lines() {
            assert_eq!(strip_ansi(l).chars().count(), BOX_WIDTH, "{l:?}");
        }
        assert!(text.contains("SCRIPTS"));
    }

    #[test]
    fn numbered_is_one_based() {
        assert_eq!(numbered(["a", "b"]), vec!["1. a", "2. b"]);
    }
}
