//! Menu actions. Each one runs to completion (prompting as needed) and returns a `Flow`.
//!
//! `0` at any sub-dialog prompt cancels the action. Errors bubble up to the navigator, which
//! reports them and pauses; `InputClosed` ends the session.
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Result};

use super::console::Console;
use super::screen::{Action, Screen};
use super::state::{FolderContext, NavigatorState};
use super::Services;
use crate::ui::LineReader;
use crate::util::exec::{ExecFailure, ExecRequest, ExecResult};
use crate::util::split_args;

mod archives;
mod projects;
mod scripts;
mod shell;
mod storage;
mod vps;

/// Where the navigator goes once an action finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Wait for ENTER, then redraw the originating screen.
    Pause,
    /// Redraw the originating screen immediately.
    Return,
    Goto(Screen),
}

pub(crate) type Con<'a, R, W> = &'a mut Console<R, W>;

pub fn perform<R: LineReader, W: Write>(
    action: Action,
    con: &mut Console<R, W>,
    svc: &Services,
    state: &mut NavigatorState,
) -> Result<Flow> {
    use projects::ProjectKind::{Coding, Web};
    use Action as A;
    match action {
        A::ListScripts => scripts::list(con, svc),
        A::RunScript => scripts::run(con, svc),
        A::AddScript => scripts::add(con, svc),
        A::DeleteScript => scripts::delete(con, svc),

        A::ExtractZip => archives::extract_zip(con, svc),
        A::PickExtractedFolder => archives::pick_folder(con, svc, state),
        A::RunExtractedProject => archives::run_extracted_project(con, svc),
        A::ShowFolderStructure => archives::show_structure(con, folder(state)?),
        A::EditFolderFile => archives::edit_file(con, svc, folder(state)?),
        A::RunInFolder => archives::run_in_folder(con, svc, folder(state)?),
        A::DeleteFolder => archives::delete_folder(con, folder(state)?),

        A::RunAnyCommand => shell::run_any_command(con, svc),

        A::AddHost => vps::add(con, svc),
        A::ListHosts => vps::list(con, svc),
        A::TestHost => vps::test(con, svc),
        A::RunHostCommand => vps::run_command(con, svc),
        A::TransferToHost => vps::transfer(con, svc),
        A::DeleteHost => vps::delete(con, svc),
        A::BackupToHost => vps::backup(con, svc),

        A::CreateCodingProject => projects::create(con, svc, Coding),
        A::ListCodingProjects => projects::list(con, svc, Coding),
        A::EditCodingProject => projects::edit(con, svc),
        A::RunCodingProject => projects::run_command(con, svc),
        A::DeleteCodingProject => projects::delete(con, svc, Coding),

        A::CreateWebProject => projects::create(con, svc, Web),
        A::ListWebProjects => projects::list(con, svc, Web),
        A::RunWebServer => projects::run_server(con, svc),
        A::DeleteWebProject => projects::delete(con, svc, Web),

        A::ClearCache => storage::clear_cache(con, svc),
        A::ClearDebug => storage::clear_debug(con, svc),
        A::ClearHistory => storage::clear_history(con, svc),
        A::ClearAll => storage::clear_all(con, svc),
    }
}

fn folder(state: &NavigatorState) -> Result<FolderContext> {
    state
        .folder
        .clone()
        .ok_or_else(|| anyhow!("no extracted folder selected"))
}

/// Print a one-line summary of an inherited-mode run.
fn report_exit<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    res: &ExecResult,
    what: &str,
) -> Result<()> {
    con.blank()?;
    match &res.failure {
        _ if res.success => con.ok(&format!("{what} finished")),
        Some(ExecFailure::Spawn(_)) | Some(ExecFailure::Rejected(_)) => {
            con.error(&res.describe())
        }
        _ => con.warn(&format!("{what} finished with {}", res.describe())),
    }
}

/// Banner printed before handing the terminal to a child.
fn running_banner<R: LineReader, W: Write>(con: Con<'_, R, W>, text: &str) -> Result<()> {
    con.blank()?;
    let lines = vec![text.to_string()];
    con.boxed("RUN", &lines, crate::color::CYAN)?;
    con.blank()
}

/// Operator shell text, run through the configured shell in `cwd`, on the terminal.
fn shell_request(svc: &Services, command: &str, cwd: Option<&Path>) -> ExecRequest {
    let req = ExecRequest::shell(svc.settings.shell.clone(), command).inherited();
    match cwd {
        Some(dir) => req.cwd(dir),
        None => req,
    }
}

/// Open `file` in `$EDITOR` (which may carry its own arguments).
fn open_editor<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    file: &Path,
) -> Result<()> {
    let mut words = split_args(&svc.settings.editor);
    if words.is_empty() {
        words.push(crate::config::DEFAULT_EDITOR.to_string());
    }
    let program = words.remove(0);
    con.info("Opening editor...")?;
    let res = svc.exec.run(
        ExecRequest::new(program)
            .args(words)
            .arg(file.as_os_str().to_os_string())
            .inherited(),
    );
    if res.success {
        con.ok("File saved")
    } else {
        con.error(&format!("Editor exited with {}", res.describe()))
    }
}

/// Read a non-empty line; `None` (after an error message) when blank.
fn require_input<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    label: &str,
    what: &str,
) -> Result<Option<String>> {
    let raw = con.prompt(label)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        con.error(&format!("{what} must not be empty"))?;
        return Ok(None);
    }
    Ok(Some(trimmed.to_string()))
}
