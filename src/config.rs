//! Environment-driven settings.
//!
//! Everything here is read once at startup. Durations use humantime syntax (`10s`, `1m 30s`,
//! `250ms`); values that fail to parse fall back to the default with a warning.
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REDRAW_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_EDITOR: &str = "nano";

const ANDROID_DOWNLOAD_DIRS: [&str; 4] = [
    "/storage/emulated/0/Download/Telegram/",
    "/storage/emulated/0/Download/",
    "/sdcard/Download/Telegram/",
    "/sdcard/Download/",
];

#[derive(Debug, Clone)]
pub struct Settings {
    /// Workspace root holding scripts, projects and the host store.
    pub root: PathBuf,
    /// Target of the disk-capacity summary.
    pub home: PathBuf,
    pub probe_timeout: Duration,
    pub command_timeout: Duration,
    pub redraw_delay: Duration,
    pub editor: String,
    /// Interpreter for operator-typed command lines.
    pub shell: String,
    pub ssh_bin: OsString,
    pub scp_bin: OsString,
    pub tar_bin: OsString,
    pub unzip_bin: OsString,
    pub use_sshpass: bool,
    pub download_dirs: Vec<PathBuf>,
}

impl Settings {
    /// Defaults rooted at `root`, ignoring the environment. Tests start from here.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            home: root.clone(),
            root,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            redraw_delay: DEFAULT_REDRAW_DELAY,
            editor: DEFAULT_EDITOR.to_string(),
            shell: "bash".to_string(),
            ssh_bin: OsString::from("ssh"),
            scp_bin: OsString::from("scp"),
            tar_bin: OsString::from("tar"),
            unzip_bin: OsString::from("unzip"),
            use_sshpass: false,
            download_dirs: Vec::new(),
        }
    }

    pub fn from_env() -> Self {
        let home = home::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let root = env_nonempty("AERONULL_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("aeronull"));

        let mut s = Self::with_root(root);
        s.home = home.clone();
        s.probe_timeout = env_duration("AERONULL_PROBE_TIMEOUT", DEFAULT_PROBE_TIMEOUT);
        s.command_timeout = env_duration("AERONULL_COMMAND_TIMEOUT", DEFAULT_COMMAND_TIMEOUT);
        s.redraw_delay = env_duration("AERONULL_REDRAW_DELAY", DEFAULT_REDRAW_DELAY);
        s.editor = env_nonempty("EDITOR").unwrap_or_else(|| DEFAULT_EDITOR.to_string());
        s.shell = if which::which("bash").is_ok() {
            "bash".to_string()
        } else {
            "sh".to_string()
        };
        if let Some(v) = env_nonempty("AERONULL_SSH_BIN") {
            s.ssh_bin = v.into();
        }
        if let Some(v) = env_nonempty("AERONULL_SCP_BIN") {
            s.scp_bin = v.into();
        }
        if let Some(v) = env_nonempty("AERONULL_TAR_BIN") {
            s.tar_bin = v.into();
        }
        if let Some(v) = env_nonempty("AERONULL_UNZIP_BIN") {
            s.unzip_bin = v.into();
        }
        s.use_sshpass = env::var("AERONULL_SSHPASS").ok().as_deref() != Some("0")
            && which::which("sshpass").is_ok();
        s.download_dirs = match env::var_os("AERONULL_DOWNLOAD_DIRS") {
            Some(v) if !v.is_empty() => env::split_paths(&v).collect(),
            _ => default_download_dirs(&home),
        };
        s
    }
}

pub fn default_download_dirs(home: &std::path::Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = ANDROID_DOWNLOAD_DIRS.iter().map(PathBuf::from).collect();
    dirs.push(home.join("Downloads"));
    dirs
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_duration(name: &str, default: Duration) -> Duration {
    match env_nonempty(name) {
        Some(raw) => parse_duration(&raw).unwrap_or_else(|| {
            warn!(variable = name, value = %raw, "unparseable duration; using default");
            default
        }),
        None => default,
    }
}

/// Parse a humantime duration; `None` when the text is not a duration.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    humantime::parse_duration(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_root_uses_documented_defaults() {
        let s = Settings::with_root("/tmp/aeronull-x");
        assert_eq!(s.root, PathBuf::from("/tmp/aeronull-x"));
        assert_eq!(s.probe_timeout, Duration::from_secs(10));
        assert_eq!(s.command_timeout, Duration::from_secs(30));
        assert_eq!(s.editor, "nano");
        assert_eq!(s.ssh_bin, OsString::from("ssh"));
        assert!(!s.use_sshpass);
    }

    #[test]
    fn durations_parse_humantime() {
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 1m 30s "), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("soon"), None);
    }

    #[test]
    fn default_download_dirs_include_home_downloads() {
        let dirs = default_download_dirs(std::path::Path::new("/home/op"));
        assert_eq!(dirs.len(), 5);
        assert!(dirs.contains(&PathBuf::from("/home/op/Downloads")));
        assert!(dirs[0].to_string_lossy().contains("Telegram"));
    }
}
