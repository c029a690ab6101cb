//! The on-disk workspace: directory layout, listings, history and cleanup.
//!
//! ```text
//! <root>/
//!   scripts/            operator scripts (flat)
//!   scripts/extracted/  one folder per extracted archive
//!   coding/             coding workspace projects
//!   web-projects/       web projects (port 3000)
//!   .cache/  .debug/    scratch and log directories
//!   .history            one line per script run
//!   .vps_config.json    host store
//! ```
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use crate::store::STORE_FILE_NAME;
use crate::telemetry::LOG_FILE_NAME;
use crate::util::exec::{ExecRequest, ExecService};
use crate::util::fs::{dir_size, ensure_file_exists, reset_dir, reset_dir_keeping, subdirs};
use crate::util::{split_args, TextLines};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    pub fn extracted_dir(&self) -> PathBuf {
        self.scripts_dir().join("extracted")
    }

    pub fn coding_dir(&self) -> PathBuf {
        self.root.join("coding")
    }

    pub fn web_dir(&self) -> PathBuf {
        self.root.join("web-projects")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(".cache")
    }

    pub fn debug_dir(&self) -> PathBuf {
        self.root.join(".debug")
    }

    pub fn history_file(&self) -> PathBuf {
        self.root.join(".history")
    }

    pub fn store_file(&self) -> PathBuf {
        self.root.join(STORE_FILE_NAME)
    }

    /// Create every workspace directory and the history file. Idempotent.
    pub fn ensure(&self) -> io::Result<()> {
        for dir in [
            self.scripts_dir(),
            self.extracted_dir(),
            self.coding_dir(),
            self.web_dir(),
            self.cache_dir(),
            self.debug_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }
        ensure_file_exists(&self.history_file())
    }

    // ----- scripts -----

    /// Recognized files directly in `scripts/`, sorted by name.
    pub fn list_scripts(&self) -> Vec<ScriptEntry> {
        let Ok(rd) = fs::read_dir(self.scripts_dir()) else {
            return Vec::new();
        };
        let mut out: Vec<ScriptEntry> = rd
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| {
                let name = e.file_name().into_string().ok()?;
                let kind = ScriptKind::from_name(&name)?;
                Some(ScriptEntry {
                    path: e.path(),
                    name,
                    kind,
                })
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Write a new script. Refuses names that already exist or that would leave `scripts/`.
    pub fn add_script(&self, name: &str, body: &TextLines) -> io::Result<PathBuf> {
        let name = validate_entry_name(name)?;
        let path = self.scripts_dir().join(name);
        if path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{name} already exists"),
            ));
        }
        fs::create_dir_all(self.scripts_dir())?;
        fs::write(&path, body.build()?)?;
        info!(script = name, lines = body.len(), "script added");
        Ok(path)
    }

    pub fn delete_script(&self, entry: &ScriptEntry) -> io::Result<()> {
        fs::remove_file(&entry.path)?;
        info!(script = %entry.name, "script deleted");
        Ok(())
    }

    /// Append `<rfc3339> - <name> <args>` to the history file.
    pub fn record_history(&self, name: &str, args: &str) -> io::Result<()> {
        let line = history_line(SystemTime::now(), name, args);
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.history_file())?;
        f.write_all(line.as_bytes())
    }

    // ----- project folders -----

    pub fn coding_projects(&self) -> Vec<FolderEntry> {
        folder_entries(&self.coding_dir())
    }

    pub fn web_projects(&self) -> Vec<FolderEntry> {
        folder_entries(&self.web_dir())
    }

    pub fn extracted_folders(&self) -> Vec<FolderEntry> {
        folder_entries(&self.extracted_dir())
    }

    // ----- storage -----

    pub fn usage(&self) -> WorkspaceUsage {
        WorkspaceUsage {
            cache: dir_size(&self.cache_dir()),
            debug: dir_size(&self.debug_dir()),
            history: fs::metadata(self.history_file())
                .map(|m| m.len())
                .unwrap_or(0),
        }
    }

    /// Empty `.cache/`. Returns false when it was already absent.
    pub fn clear_cache(&self) -> io::Result<bool> {
        let existed = reset_dir(&self.cache_dir())?;
        info!(existed, "cache cleared");
        Ok(existed)
    }

    /// Empty `.debug/`. The session log is truncated, not removed.
    pub fn clear_debug(&self) -> io::Result<bool> {
        let existed = reset_dir_keeping(&self.debug_dir(), LOG_FILE_NAME)?;
        info!(existed, "debug dir cleared");
        Ok(existed)
    }

    /// Delete the history file. Returns false when it did not exist.
    pub fn clear_history(&self) -> io::Result<bool> {
        match fs::remove_file(self.history_file()) {
            Ok(()) => {
                info!("history cleared");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Reject names that are empty or would escape their parent directory.
pub fn validate_entry_name(name: &str) -> io::Result<&str> {
    let name = name.trim();
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0', '\n', '\r']);
    if bad {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid name: {name:?}"),
        ));
    }
    Ok(name)
}

pub fn history_line(at: SystemTime, name: &str, args: &str) -> String {
    format!(
        "{} - {} {}\n",
        humantime::format_rfc3339_millis(at),
        name,
        args
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    JavaScript,
    Shell,
    Python,
    Ruby,
    Php,
    Go,
    Zip,
    Text,
    Markdown,
}

impl ScriptKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        Some(match ext.as_str() {
            "js" => ScriptKind::JavaScript,
            "sh" => ScriptKind::Shell,
            "py" => ScriptKind::Python,
            "rb" => ScriptKind::Ruby,
            "php" => ScriptKind::Php,
            "go" => ScriptKind::Go,
            "zip" => ScriptKind::Zip,
            "txt" => ScriptKind::Text,
            "md" => ScriptKind::Markdown,
            _ => return None,
        })
    }

    pub fn tag(self) -> &'static str {
        match self {
            ScriptKind::JavaScript => "[JS]",
            ScriptKind::Shell => "[SH]",
            ScriptKind::Python => "[PY]",
            ScriptKind::Ruby => "[RB]",
            ScriptKind::Php => "[PHP]",
            ScriptKind::Go => "[GO]",
            ScriptKind::Zip => "[ZIP]",
            ScriptKind::Text => "[TXT]",
            ScriptKind::Markdown => "[MD]",
        }
    }

    /// Interpreter program and leading arguments; `None` for non-runnable kinds.
    pub fn interpreter(self) -> Option<(&'static str, &'static [&'static str])> {
        match self {
            ScriptKind::JavaScript => Some(("node", &[])),
            ScriptKind::Shell => Some(("bash", &[])),
            ScriptKind::Python => Some(("python", &[])),
            ScriptKind::Ruby => Some(("ruby", &[])),
            ScriptKind::Php => Some(("php", &[])),
            ScriptKind::Go => Some(("go", &["run"])),
            ScriptKind::Zip | ScriptKind::Text | ScriptKind::Markdown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: ScriptKind,
}

impl ScriptEntry {
    /// Inherited-mode request running this script with whitespace-split `args`.
    pub fn run_request(&self, args: &str) -> Option<ExecRequest> {
        let (program, lead) = self.kind.interpreter()?;
        Some(
            ExecRequest::new(program)
                .args(lead.iter().copied())
                .arg(self.path.as_os_str().to_os_string())
                .args(split_args(args))
                .inherited(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub name: String,
    pub path: PathBuf,
}

impl FolderEntry {
    pub fn size(&self) -> u64 {
        dir_size(&self.path)
    }
}

fn folder_entries(dir: &Path) -> Vec<FolderEntry> {
    subdirs(dir)
        .into_iter()
        .map(|name| FolderEntry {
            path: dir.join(&name),
            name,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkspaceUsage {
    pub cache: u64,
    pub debug: u64,
    pub history: u64,
}

/// Capacity of the filesystem holding `$HOME`, as printed by `df -h`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskSummary {
    pub total: String,
    pub used: String,
    pub available: String,
    pub percent: String,
}

impl DiskSummary {
    pub fn unavailable() -> Self {
        Self {
            total: NOT_AVAILABLE.to_string(),
            used: NOT_AVAILABLE.to_string(),
            available: NOT_AVAILABLE.to_string(),
            percent: NOT_AVAILABLE.to_string(),
        }
    }

    /// Parse the last line of `df -h` output; missing columns become `N/A`.
    pub fn parse_df(output: &str) -> Self {
        let Some(last) = output.lines().rev().find(|l| !l.trim().is_empty()) else {
            return Self::unavailable();
        };
        let cols: Vec<&str> = last.split_whitespace().collect();
        let col = |i: usize| {
            cols.get(i)
                .map(|s| s.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };
        Self {
            total: col(1),
            used: col(2),
            available: col(3),
            percent: col(4),
        }
    }

    /// Run `df -h <home>` (captured, bounded by `timeout`).
    pub fn probe(exec: &ExecService, home: &Path, timeout: Duration) -> Self {
        let res = exec.run(
            ExecRequest::new("df")
                .arg("-h")
                .arg(home.as_os_str().to_os_string())
                .captured()
                .timeout(timeout),
        );
        if !res.success {
            debug!(outcome = %res.describe(), "disk summary unavailable");
            return Self::unavailable();
        }
        Self::parse_df(&res.stdout)
    }
}

// ----- archives -----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipOrigin {
    Telegram,
    Download,
}

impl ZipOrigin {
    pub fn tag(self) -> &'static str {
        match self {
            ZipOrigin::Telegram => "[TG]",
            ZipOrigin::Download => "[DL]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipSource {
    pub name: String,
    pub path: PathBuf,
    pub origin: ZipOrigin,
}

/// `.zip` files directly inside each of `dirs`, in directory order then name order.
/// Directories that alias each other (symlinked storage roots) are listed once.
pub fn find_zip_files(dirs: &[PathBuf]) -> Vec<ZipSource> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut out = Vec::new();
    for dir in dirs {
        let Ok(rd) = fs::read_dir(dir) else {
            continue;
        };
        let origin = if dir.to_string_lossy().contains("Telegram") {
            ZipOrigin::Telegram
        } else {
            ZipOrigin::Download
        };
        let mut found: Vec<ZipSource> = rd
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| !t.is_dir()).unwrap_or(false))
            .filter_map(|e| {
                let name = e.file_name().into_string().ok()?;
                let is_zip = Path::new(&name)
                    .extension()
                    .and_then(|x| x.to_str())
                    .map(|x| x.eq_ignore_ascii_case("zip"))
                    .unwrap_or(false);
                is_zip.then(|| ZipSource {
                    path: e.path(),
                    name,
                    origin,
                })
            })
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        for z in found {
            let key = fs::canonicalize(&z.path).unwrap_or_else(|_| z.path.clone());
            if seen.insert(key) {
                out.push(z);
            }
        }
    }
    out
}

/// File name of `path` without a trailing `.zip`.
pub fn zip_stem(path: &str) -> String {
    let base = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path);
    match base.len().checked_sub(4) {
        Some(cut) if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".zip") => {
            base[..cut].to_string()
        }
        _ => base.to_string(),
    }
}

/// Entry names from `unzip -l` output (header, separator and totals lines skipped).
pub fn parse_unzip_listing(output: &str) -> Vec<String> {
    output.lines().filter_map(parse_unzip_line).collect()
}

fn parse_unzip_line(line: &str) -> Option<String> {
    let (length, rest) = split_token(line)?;
    let (date, rest) = split_token(rest)?;
    let (time, name) = split_token(rest)?;
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    let is_date = date.len() >= 8
        && date.contains('-')
        && date.split('-').all(digits);
    let is_time = time.split(':').count() == 2 && time.split(':').all(digits);
    let name = name.trim();
    if digits(length) && is_date && is_time && !name.is_empty() {
        Some(name.to_string())
    } else {
        None
    }
}

fn split_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(i) => Some((&s[..i], &s[i..])),
        None => Some((s, "")),
    }
}
