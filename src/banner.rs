use std::io::{self, Write};

use crate::color::{paint, BOLD, CYAN, GREEN, MAGENTA, YELLOW};

const RULE: &str = "═══════════════════════════════════════════════════════════";

fn framed<W: Write>(out: &mut W, use_color: bool, rows: &[&str]) -> io::Result<()> {
    let width = 64;
    let top = format!("   ╔{}╗", "═".repeat(width));
    let bottom = format!("   ╚{}╝", "═".repeat(width));
    writeln!(out, "{}", paint(use_color, CYAN, &top))?;
    for row in rows {
        let len = row.chars().count();
        let left = width.saturating_sub(len) / 2;
        let right = width.saturating_sub(len + left);
        let line = format!("   ║{}{}{}║", " ".repeat(left), row, " ".repeat(right));
        writeln!(out, "{}", paint(use_color, CYAN, &line))?;
    }
    writeln!(out, "{}", paint(use_color, CYAN, &bottom))
}

/// Printed once before the first screen.
pub fn print_startup_banner<W: Write>(out: &mut W, use_color: bool) -> io::Result<()> {
    writeln!(out)?;
    framed(out, use_color, &["", "Starting AeroNull Project Runner...", ""])?;
    writeln!(out)
}

/// Heading drawn at the top of every screen.
pub fn write_header<W: Write>(out: &mut W, use_color: bool) -> io::Result<()> {
    let title = format!("AERONULL PROJECT RUNNER v{}", env!("CARGO_PKG_VERSION"));
    writeln!(out)?;
    framed(
        out,
        use_color,
        &[title.as_str(), "Advanced Multi-Purpose Script Management Tool"],
    )?;
    writeln!(out)
}

pub fn write_farewell<W: Write>(out: &mut W, use_color: bool) -> io::Result<()> {
    let title = format!("AERONULL PROJECT RUNNER v{}", env!("CARGO_PKG_VERSION"));
    writeln!(out)?;
    framed(
        out,
        use_color,
        &["", "Thank you for using", title.as_str(), "", "See you next time!", ""],
    )?;
    writeln!(out)
}

/// Body of the About screen.
pub fn about_lines(use_color: bool) -> Vec<String> {
    let c = |code: &str, s: &str| paint(use_color, code, s);
    let feature = |s: &str| format!("{} {s}", c(GREEN, "[+]"));
    let strength = |s: &str| format!("{} {s}", c(MAGENTA, ">>"));
    vec![
        c(CYAN, RULE),
        c(BOLD, "ABOUT AERONULL PROJECT"),
        c(CYAN, RULE),
        String::new(),
        format!("{} {}", c(YELLOW, "Version:"), env!("CARGO_PKG_VERSION")),
        format!("{} {}", c(YELLOW, "Built:"), env!("AERONULL_BUILD_DATE")),
        format!("{} {}", c(YELLOW, "Target:"), env!("AERONULL_BUILD_TARGET")),
        format!("{} Termux/Linux/VPS", c(YELLOW, "Platform:")),
        String::new(),
        c(CYAN, "FEATURES:"),
        feature("Script Runner (JS, Python, Bash, Ruby, PHP, Go)"),
        feature("ZIP Extractor & Manager"),
        feature("Coding Workspace"),
        feature("Web Projects on Port 3000"),
        feature("VPS Manager & Remote Control"),
        feature("Command Executor (npm, pm2, yarn, git)"),
        feature("File Editor & Manager"),
        feature("Storage Management"),
        feature("Project Generator"),
        String::new(),
        c(CYAN, "HIGHLIGHTS:"),
        strength("Runs any shell command"),
        strength("Menu-driven, keyboard only"),
        strength("Small and fast"),
        strength("VPS & Termux support"),
        String::new(),
        c(YELLOW, "Use responsibly!"),
        c(CYAN, RULE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_mentions_version() {
        let mut buf = Vec::new();
        write_header(&mut buf, false).unwrap();
        let s = String::from_utf8(buf).unwrap();
        assert!(s.contains(env!("CARGO_PKG_VERSION")));
        assert!(!s.contains('\x1b'));
    }

    #[test]
    fn about_has_build_info() {
        let lines = about_lines(false);
        assert!(lines.iter().any(|l| l.starts_with("Built: ")));
    }
}
