use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::{info, warn};

use super::vps::load_hosts;
use super::{open_editor, report_exit, require_input, running_banner, shell_request, Con, Flow};
use crate::color::{BLUE, CYAN, GREEN, MAGENTA, YELLOW};
use crate::navigator::{FolderContext, NavigatorState, Screen, Services};
use crate::store::RemoteHost;
use crate::ui::{numbered, LineReader};
use crate::util::exec::ExecRequest;
use crate::util::fs::{display_relative, files_under};
use crate::util::format_bytes;
use crate::workspace::{
    find_zip_files, parse_unzip_listing, validate_entry_name, zip_stem, FolderEntry, ZipSource,
};

const VIEW_TOKEN: &str = "view";
const VIEW_LIMIT: usize = 40;
const STRUCTURE_LIMIT: usize = 50;
const EDIT_LIMIT: usize = 30;

fn folder_items(folders: &[FolderEntry]) -> Vec<String> {
    folders
        .iter()
        .map(|f| format!("{} ({})", f.name, format_bytes(f.size())))
        .collect()
}

/// Pick an extracted folder; `None` after reporting when there is nothing to pick.
fn choose_folder<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    label: &str,
) -> Result<Option<FolderEntry>> {
    let folders = svc.workspace.extracted_folders();
    if folders.is_empty() {
        con.error("No extracted folders found")?;
        return Ok(None);
    }
    let items = folder_items(&folders);
    let Some(idx) = con.choose("EXTRACTED FOLDERS", &items, MAGENTA, label)? else {
        return Ok(None);
    };
    Ok(folders.into_iter().nth(idx))
}

pub(super) fn extract_zip<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    let zips = find_zip_files(&svc.settings.download_dirs);
    let hosts = load_hosts(con, svc)?;
    if zips.is_empty() && hosts.is_empty() {
        con.error("No ZIP files found in the download folders and no VPS configured")?;
        return Ok(Flow::Pause);
    }

    let mut items: Vec<String> = zips
        .iter()
        .map(|z| format!("{} {}", con.paint(GREEN, z.origin.tag()), z.name))
        .collect();
    items.extend(
        hosts
            .iter()
            .map(|h| format!("{} {}", con.paint(BLUE, "[VPS]"), h.name)),
    );
    con.blank()?;
    con.boxed("ZIP SOURCES", &numbered(&items), YELLOW)?;
    con.blank()?;
    let raw = con.prompt(&format!(
        "Number to extract ('{VIEW_TOKEN}' to list a ZIP, 0 to cancel): "
    ))?;
    if raw.trim().eq_ignore_ascii_case(VIEW_TOKEN) {
        return view_zip(con, svc, &zips);
    }
    let Some(idx) = con.pick_index(&raw, items.len())? else {
        return Ok(Flow::Return);
    };
    match zips.get(idx) {
        Some(zip) => extract_local(con, svc, zip),
        None => extract_from_host(con, svc, &hosts[idx - zips.len()]),
    }
}

fn unzip_into<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    zip: &Path,
    dest: &Path,
) -> Result<bool> {
    fs::create_dir_all(dest).with_context(|| format!("creating {}", dest.display()))?;
    running_banner(
        con,
        &format!("Extracting {} -> {}", zip.display(), dest.display()),
    )?;
    let res = svc.exec.run(
        ExecRequest::new(svc.settings.unzip_bin.clone())
            .arg("-o")
            .arg(zip.as_os_str().to_os_string())
            .arg("-d")
            .arg(dest.as_os_str().to_os_string())
            .inherited(),
    );
    report_exit(con, &res, "Extraction")?;
    if res.success {
        info!(dest = %dest.display(), "archive extracted");
        con.ok(&format!("Extracted to: {}", dest.display()))?;
    }
    Ok(res.success)
}

fn extract_local<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    zip: &ZipSource,
) -> Result<Flow> {
    let dest = svc.workspace.extracted_dir().join(zip_stem(&zip.name));
    unzip_into(con, svc, &zip.path, &dest)?;
    Ok(Flow::Pause)
}

fn extract_from_host<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    host: &RemoteHost,
) -> Result<Flow> {
    let Some(remote) = require_input(con, "Remote ZIP path: ", "Remote path")? else {
        return Ok(Flow::Pause);
    };
    let file_name = remote.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let file_name = validate_entry_name(file_name)?;
    let extracted = svc.workspace.extracted_dir();
    let local = extracted.join(file_name);

    running_banner(
        con,
        &format!("Downloading {}:{remote}", host.destination()),
    )?;
    let res = svc.remote.download_file(host, &remote, &local);
    if !res.success {
        con.error(&format!("Download failed: {}", res.describe()))?;
        remove_download(&local);
        return Ok(Flow::Pause);
    }

    let dest = extracted.join(format!("{}_{}", host.host, zip_stem(&remote)));
    let outcome = unzip_into(con, svc, &local, &dest);
    remove_download(&local);
    outcome?;
    Ok(Flow::Pause)
}

fn remove_download(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("failed to remove downloaded archive {}: {e}", path.display());
        }
    }
}

fn view_zip<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    zips: &[ZipSource],
) -> Result<Flow> {
    if zips.is_empty() {
        con.error("No local ZIP files to view")?;
        return Ok(Flow::Pause);
    }
    let items: Vec<&str> = zips.iter().map(|z| z.name.as_str()).collect();
    let Some(idx) = con.choose("VIEW ZIP", &items, CYAN, "ZIP number to view")? else {
        return Ok(Flow::Return);
    };
    let zip = &zips[idx];
    let res = svc.exec.run(
        ExecRequest::new(svc.settings.unzip_bin.clone())
            .arg("-l")
            .arg(zip.path.as_os_str().to_os_string())
            .captured(),
    );
    if !res.success {
        con.error(&format!("Cannot list {}: {}", zip.name, res.describe()))?;
        return Ok(Flow::Pause);
    }

    let entries = parse_unzip_listing(&res.stdout);
    let mut lines: Vec<String> = entries
        .iter()
        .take(VIEW_LIMIT)
        .map(|e| {
            let tag = if e.ends_with('/') { "[DIR]" } else { "[FILE]" };
            format!("{} {e}", con.paint(CYAN, tag))
        })
        .collect();
    if entries.len() > VIEW_LIMIT {
        lines.push(format!("... and {} more items", entries.len() - VIEW_LIMIT));
    }
    if lines.is_empty() {
        lines.push("Archive is empty".to_string());
    }
    con.blank()?;
    con.boxed(&format!("CONTENTS: {}", zip.name), &lines, CYAN)?;
    Ok(Flow::Pause)
}

pub(super) fn pick_folder<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    state: &mut NavigatorState,
) -> Result<Flow> {
    let Some(folder) = choose_folder(con, svc, "Folder number to manage")? else {
        if state.screen != Screen::ExtractedFolder {
            return Ok(Flow::Pause);
        }
        if svc.workspace.extracted_folders().is_empty() {
            con.pause()?;
        }
        return Ok(Flow::Goto(Screen::MainMenu));
    };
    state.enter_folder(FolderContext {
        name: folder.name,
        path: folder.path,
    });
    Ok(Flow::Goto(Screen::ExtractedFolder))
}

pub(super) fn run_extracted_project<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    let Some(folder) = choose_folder(con, svc, "Folder number to run")? else {
        return Ok(Flow::Pause);
    };
    let Some(command) = require_input(con, "Command to run (e.g. npm start): ", "Command")?
    else {
        return Ok(Flow::Pause);
    };
    running_banner(con, &format!("Running in {}: {command}", folder.name))?;
    let res = svc.exec.run(shell_request(svc, &command, Some(&folder.path)));
    report_exit(con, &res, "Command")?;
    Ok(Flow::Pause)
}

pub(super) fn show_structure<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    folder: FolderContext,
) -> Result<Flow> {
    let files = files_under(&folder.path)
        .with_context(|| format!("listing {}", folder.path.display()))?;
    let mut lines: Vec<String> = files
        .iter()
        .take(STRUCTURE_LIMIT)
        .map(|p| display_relative(p, &folder.path))
        .collect();
    if files.len() > STRUCTURE_LIMIT {
        lines.push(format!("... and {} more files", files.len() - STRUCTURE_LIMIT));
    }
    if lines.is_empty() {
        lines.push("Folder is empty".to_string());
    }
    con.blank()?;
    con.boxed(&format!("STRUCTURE: {}", folder.name), &lines, CYAN)?;
    Ok(Flow::Pause)
}

pub(super) fn edit_file<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    folder: FolderContext,
) -> Result<Flow> {
    let files = files_under(&folder.path)
        .with_context(|| format!("listing {}", folder.path.display()))?;
    if files.is_empty() {
        con.error("Folder is empty")?;
        return Ok(Flow::Pause);
    }
    let shown: Vec<String> = files
        .iter()
        .take(EDIT_LIMIT)
        .map(|p| display_relative(p, &folder.path))
        .collect();
    let Some(idx) = con.choose("EDIT FILE", &shown, YELLOW, "File number to edit")? else {
        return Ok(Flow::Return);
    };
    open_editor(con, svc, &files[idx])?;
    Ok(Flow::Return)
}

pub(super) fn run_in_folder<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    folder: FolderContext,
) -> Result<Flow> {
    let Some(command) = require_input(con, "Command to run: ", "Command")? else {
        return Ok(Flow::Pause);
    };
    running_banner(con, &format!("Running in {}: {command}", folder.name))?;
    let res = svc.exec.run(shell_request(svc, &command, Some(&folder.path)));
    report_exit(con, &res, "Command")?;
    con.blank()?;
    if con.confirm("Return to folder menu?")? {
        Ok(Flow::Return)
    } else {
        Ok(Flow::Goto(Screen::MainMenu))
    }
}

pub(super) fn delete_folder<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    folder: FolderContext,
) -> Result<Flow> {
    con.warn(&format!("This deletes {} and everything in it", folder.name))?;
    if !con.confirm("Are you sure?")? {
        return Ok(Flow::Return);
    }
    fs::remove_dir_all(&folder.path)
        .with_context(|| format!("deleting {}", folder.path.display()))?;
    info!(folder = %folder.name, "extracted folder deleted");
    con.ok("Folder deleted")?;
    con.pause()?;
    Ok(Flow::Goto(Screen::MainMenu))
}
