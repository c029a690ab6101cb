use std::io::Write;

use anyhow::{Context as _, Result};
use tracing::warn;

use super::{report_exit, require_input, running_banner, Con, Flow};
use crate::color::{GREEN, MAGENTA, RED, YELLOW};
use crate::navigator::Services;
use crate::ui::LineReader;
use crate::util::fs::make_executable;
use crate::util::{shell_join, split_args, TextLines};
use crate::workspace::{validate_entry_name, ScriptEntry, ScriptKind};

const END_MARKER: &str = "END";

fn script_lines<R: LineReader, W: Write>(con: Con<'_, R, W>, scripts: &[ScriptEntry]) -> Vec<String> {
    scripts
        .iter()
        .map(|s| format!("{} {}", con.paint(GREEN, s.kind.tag()), s.name))
        .collect()
}

/// Draw the "nothing here" box when `scripts` is empty; returns whether any exist.
fn any_scripts<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    scripts: &[ScriptEntry],
) -> Result<bool> {
    if scripts.is_empty() {
        con.boxed("SCRIPTS", &["No scripts available".to_string()], YELLOW)?;
        return Ok(false);
    }
    Ok(true)
}

pub(super) fn list<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<Flow> {
    let scripts = svc.workspace.list_scripts();
    if any_scripts(con, &scripts)? {
        let lines = crate::ui::numbered(script_lines(con, &scripts));
        con.boxed("SCRIPTS", &lines, MAGENTA)?;
    }
    Ok(Flow::Pause)
}

pub(super) fn run<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<Flow> {
    let scripts = svc.workspace.list_scripts();
    if !any_scripts(con, &scripts)? {
        return Ok(Flow::Pause);
    }
    let items = script_lines(con, &scripts);
    let Some(idx) = con.choose("SCRIPTS", &items, MAGENTA, "Script number to run")? else {
        return Ok(Flow::Return);
    };
    let entry = &scripts[idx];
    let args = con.prompt("Arguments (leave empty for none): ")?;
    let Some(request) = entry.run_request(&args) else {
        con.error(&format!("Unsupported file type: {}", entry.name))?;
        return Ok(Flow::Pause);
    };
    if entry.kind == ScriptKind::Shell {
        make_executable(&entry.path)
            .with_context(|| format!("setting permissions on {}", entry.path.display()))?;
    }
    if let Err(e) = svc.workspace.record_history(&entry.name, &args) {
        warn!("failed to record history: {e}");
    }

    let mut shown = vec![entry.name.clone()];
    shown.extend(split_args(&args));
    running_banner(con, &format!("Running: {}", shell_join(&shown)))?;
    let res = svc.exec.run(request);
    report_exit(con, &res, "Script")?;
    Ok(Flow::Pause)
}

pub(super) fn add<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<Flow> {
    let Some(name) = require_input(con, "Script file name (e.g. script.js): ", "File name")? else {
        return Ok(Flow::Pause);
    };
    let name = match validate_entry_name(&name) {
        Ok(n) => n.to_string(),
        Err(e) => {
            con.error(&e.to_string())?;
            return Ok(Flow::Pause);
        }
    };
    if svc.workspace.scripts_dir().join(&name).exists() {
        con.error("File already exists!")?;
        return Ok(Flow::Pause);
    }

    con.blank()?;
    con.warn(&format!("Enter the script code (type {END_MARKER} on a new line to finish):"))?;
    con.blank()?;
    let mut body = TextLines::new();
    loop {
        let line = con.prompt("")?;
        if line.trim() == END_MARKER {
            break;
        }
        body.push(line);
    }
    svc.workspace.add_script(&name, &body)?;
    con.blank()?;
    con.ok(&format!("Script saved: {name}"))?;
    Ok(Flow::Pause)
}

pub(super) fn delete<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<Flow> {
    let scripts = svc.workspace.list_scripts();
    if scripts.is_empty() {
        con.error("No scripts to delete")?;
        return Ok(Flow::Pause);
    }
    let items = script_lines(con, &scripts);
    let Some(idx) = con.choose("DELETE SCRIPT", &items, RED, "Script number to delete")? else {
        return Ok(Flow::Return);
    };
    svc.workspace.delete_script(&scripts[idx])?;
    con.blank()?;
    con.ok("Script deleted")?;
    Ok(Flow::Pause)
}
