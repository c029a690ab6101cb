use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};

use super::{Con, Flow};
use crate::navigator::Services;
use crate::ui::LineReader;

fn has_entries(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut rd| rd.next().is_some())
        .unwrap_or(false)
}

fn report<R: LineReader, W: Write>(con: Con<'_, R, W>, what: &str, had_data: bool) -> Result<()> {
    if had_data {
        con.ok(&format!("{what} cleared"))
    } else {
        con.warn(&format!("{what} already empty"))
    }
}

fn cache<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<()> {
    let had = has_entries(&svc.workspace.cache_dir());
    svc.workspace.clear_cache().context("clearing cache")?;
    report(con, "Cache", had)
}

fn debug<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<()> {
    let had = has_entries(&svc.workspace.debug_dir());
    svc.workspace.clear_debug().context("clearing debug files")?;
    report(con, "Debug files", had)
}

fn history<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<()> {
    let had = svc.workspace.usage().history > 0;
    svc.workspace.clear_history().context("clearing history")?;
    report(con, "History", had)
}

pub(super) fn clear_cache<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    cache(con, svc)?;
    Ok(Flow::Pause)
}

pub(super) fn clear_debug<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    debug(con, svc)?;
    Ok(Flow::Pause)
}

pub(super) fn clear_history<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    history(con, svc)?;
    Ok(Flow::Pause)
}

pub(super) fn clear_all<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    if !con.confirm("Clear cache, debug files and history?")? {
        con.warn("Cleanup cancelled")?;
        return Ok(Flow::Pause);
    }
    cache(con, svc)?;
    debug(con, svc)?;
    history(con, svc)?;
    con.blank()?;
    con.ok("All temporary data cleared")?;
    Ok(Flow::Pause)
}
