use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use super::{report_exit, require_input, running_banner, Con, Flow};
use crate::color::{BLUE, DIM, GREEN, RED, YELLOW};
use crate::navigator::Services;
use crate::store::RemoteHost;
use crate::ui::LineReader;

const DEFAULT_USERNAME: &str = "root";

/// Registered hosts. A store that cannot be read is reported and treated as empty.
pub(super) fn load_hosts<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Vec<RemoteHost>> {
    match svc.store.load() {
        Ok(hosts) => Ok(hosts),
        Err(e) => {
            warn!("host store unreadable: {e}");
            con.error(&format!("Cannot read VPS list: {e}"))?;
            Ok(Vec::new())
        }
    }
}

fn pick_host<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    title: &str,
    color: &str,
) -> Result<Option<(usize, RemoteHost)>> {
    let hosts = load_hosts(con, svc)?;
    if hosts.is_empty() {
        con.error("No VPS configured. Add one first.")?;
        return Ok(None);
    }
    let items: Vec<&str> = hosts.iter().map(|h| h.name.as_str()).collect();
    let Some(idx) = con.choose(title, &items, color, "VPS number")? else {
        return Ok(None);
    };
    Ok(hosts.into_iter().nth(idx).map(|h| (idx, h)))
}

pub(super) fn add<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<Flow> {
    let Some(host) = require_input(con, "Host/IP: ", "Host")? else {
        return Ok(Flow::Pause);
    };
    let username = con.prompt(&format!("Username [{DEFAULT_USERNAME}]: "))?;
    let username = match username.trim() {
        "" => DEFAULT_USERNAME.to_string(),
        u => u.to_string(),
    };
    let secret = con.prompt_secret("Password: ")?;
    if secret.is_empty() {
        con.error("Password must not be empty")?;
        return Ok(Flow::Pause);
    }
    let record = svc.store.add(&host, &username, &secret)?;
    con.ok(&format!("VPS added: {}", record.name))?;
    Ok(Flow::Pause)
}

pub(super) fn list<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<Flow> {
    let hosts = load_hosts(con, svc)?;
    if hosts.is_empty() {
        con.warn("No VPS configured")?;
        return Ok(Flow::Pause);
    }
    let mut lines = Vec::with_capacity(hosts.len() * 2);
    for (i, h) in hosts.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, h.name));
        lines.push(con.paint(DIM, &format!("   added {}", h.added_at)));
    }
    con.boxed("VPS SERVERS", &lines, BLUE)?;
    Ok(Flow::Pause)
}

pub(super) fn test<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<Flow> {
    let Some((_, host)) = pick_host(con, svc, "TEST CONNECTION", BLUE)? else {
        return Ok(Flow::Pause);
    };
    con.blank()?;
    con.info(&format!("Testing connection to {}...", host.destination()))?;
    let res = svc.remote.test_connection(&host);
    if res.success {
        con.ok("Connection successful")?;
    } else {
        con.error(&format!("Connection failed: {}", res.describe()))?;
        let stderr = res.stderr.trim();
        if !stderr.is_empty() {
            con.line(stderr)?;
        }
    }
    Ok(Flow::Pause)
}

pub(super) fn run_command<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    let Some((_, host)) = pick_host(con, svc, "RUN COMMAND", BLUE)? else {
        return Ok(Flow::Pause);
    };
    let Some(command) = require_input(con, "Command: ", "Command")? else {
        return Ok(Flow::Pause);
    };
    con.blank()?;
    con.info(&format!("Executing on {}...", host.destination()))?;
    let res = svc.remote.run_command(&host, &command);

    let stdout = res.stdout.trim_end();
    if !stdout.is_empty() {
        let tag = con.paint(GREEN, "[OUTPUT]");
        con.line(&tag)?;
        con.line(stdout)?;
    }
    let stderr = res.stderr.trim_end();
    if !stderr.is_empty() {
        let tag = con.paint(RED, "[ERROR]");
        con.line(&tag)?;
        con.line(stderr)?;
    }
    if !res.success {
        con.warn(&format!("Command finished with {}", res.describe()))?;
    }
    Ok(Flow::Pause)
}

pub(super) fn transfer<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    let Some((_, host)) = pick_host(con, svc, "TRANSFER FILE", BLUE)? else {
        return Ok(Flow::Pause);
    };
    let Some(local) = require_input(con, "Local file path: ", "Local path")? else {
        return Ok(Flow::Pause);
    };
    let local = PathBuf::from(local);
    if !local.is_file() {
        con.error(&format!("File not found: {}", local.display()))?;
        return Ok(Flow::Pause);
    }
    let remote = con.prompt("Remote path (leave empty for home directory): ")?;
    running_banner(
        con,
        &format!("Uploading {} to {}", local.display(), host.destination()),
    )?;
    let res = svc.remote.transfer_file(&local, &host, remote.trim());
    report_exit(con, &res, "Transfer")?;
    Ok(Flow::Pause)
}

pub(super) fn delete<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<Flow> {
    let Some((idx, host)) = pick_host(con, svc, "DELETE VPS", RED)? else {
        return Ok(Flow::Pause);
    };
    if !con.confirm(&format!("Delete {}?", host.name))? {
        con.warn("Deletion cancelled")?;
        return Ok(Flow::Pause);
    }
    let removed = svc.store.remove(idx)?;
    con.ok(&format!("VPS deleted: {}", removed.name))?;
    Ok(Flow::Pause)
}

pub(super) fn backup<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<Flow> {
    let Some((_, host)) = pick_host(con, svc, "BACKUP TO VPS", YELLOW)? else {
        return Ok(Flow::Pause);
    };
    running_banner(
        con,
        &format!(
            "Backing up {} to {}",
            svc.workspace.root().display(),
            host.destination()
        ),
    )?;
    let outcome = svc.remote.backup(&host, svc.workspace.root());
    con.blank()?;
    let name = outcome
        .archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if outcome.result.success {
        con.ok(&format!("Backup uploaded: ~/{name}"))?;
    } else {
        con.error(&format!("Backup failed: {}", outcome.result.describe()))?;
    }
    Ok(Flow::Pause)
}
