//! Remote actions against a `RemoteHost`, carried over the system `ssh`/`scp`/`tar` programs.
//!
//! Host-key verification is disabled for every invocation (`StrictHostKeyChecking=no`): the
//! operator trusts the hosts they register. This is intentional and must stay visible here.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{info, warn};

use crate::config::Settings;
use crate::store::RemoteHost;
use crate::util::exec::{ExecFailure, ExecRequest, ExecResult, ExecService};
use crate::util::reject_newlines;

/// Marker echoed by the connectivity probe.
pub const PROBE_MARKER: &str = "SUCCESS";

const HOST_KEY_OPTS: [&str; 2] = ["-o", "StrictHostKeyChecking=no"];

/// External programs used as transport.
#[derive(Debug, Clone)]
pub struct Transport {
    pub ssh: OsString,
    pub scp: OsString,
    pub tar: OsString,
    /// Wrap ssh/scp in `sshpass -e` when the host carries a secret.
    pub sshpass: bool,
    pub probe_timeout: Duration,
    pub command_timeout: Duration,
}

impl Transport {
    pub fn from_settings(s: &Settings) -> Self {
        Self {
            ssh: s.ssh_bin.clone(),
            scp: s.scp_bin.clone(),
            tar: s.tar_bin.clone(),
            sshpass: s.use_sshpass,
            probe_timeout: s.probe_timeout,
            command_timeout: s.command_timeout,
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::from_settings(&Settings::with_root("."))
    }
}

/// Result of `RemoteClient::backup`.
#[derive(Debug)]
pub struct BackupOutcome {
    /// Where the archive was written; removed before `backup` returns.
    pub archive: PathBuf,
    pub result: ExecResult,
}

#[derive(Debug, Clone)]
pub struct RemoteClient {
    exec: ExecService,
    transport: Transport,
}

impl RemoteClient {
    pub fn new(exec: ExecService, transport: Transport) -> Self {
        Self { exec, transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Start a request for `program`, wrapped in `sshpass -e` when applicable.
    fn base_request(&self, program: &OsString, host: &RemoteHost) -> ExecRequest {
        if self.transport.sshpass && !host.secret.is_empty() {
            ExecRequest::new("sshpass")
                .arg("-e")
                .arg(program.clone())
                .env("SSHPASS", host.secret.clone())
        } else {
            ExecRequest::new(program.clone())
        }
    }

    fn ssh_request(&self, host: &RemoteHost, remote_command: &str) -> ExecRequest {
        self.base_request(&self.transport.ssh, host)
            .args(HOST_KEY_OPTS)
            .args(["-o", "PasswordAuthentication=yes"])
            .arg(host.destination())
            .arg(remote_command)
    }

    /// Connectivity probe: exit 0 and the marker in stdout are both required.
    pub fn test_connection(&self, host: &RemoteHost) -> ExecResult {
        info!(host = %host.host, "testing connection");
        let req = self
            .ssh_request(host, &format!("echo \"{PROBE_MARKER}\""))
            .captured()
            .timeout(self.transport.probe_timeout);
        self.exec.run(req).require_marker(PROBE_MARKER)
    }

    /// Run operator-supplied text on the remote host (captured, bounded).
    pub fn run_command(&self, host: &RemoteHost, command: &str) -> ExecResult {
        info!(host = %host.host, "running remote command");
        let req = self
            .ssh_request(host, command)
            .captured()
            .timeout(self.transport.command_timeout);
        self.exec.run(req)
    }

    /// Copy a local file to `host:remote` with visible progress. An empty `remote` targets
    /// the remote home directory. The caller checks that `local` exists.
    pub fn transfer_file(&self, local: &Path, host: &RemoteHost, remote: &str) -> ExecResult {
        if let Err(msg) = reject_newlines(remote, "remote path") {
            return invalid_input(msg);
        }
        info!(host = %host.host, local = %local.display(), "uploading file");
        let req = self
            .base_request(&self.transport.scp, host)
            .args(HOST_KEY_OPTS)
            .arg(local.as_os_str().to_os_string())
            .arg(format!("{}:{}", host.destination(), remote))
            .inherited();
        self.exec.run(req)
    }

    /// Copy `host:remote` to a local path.
    pub fn download_file(&self, host: &RemoteHost, remote: &str, local: &Path) -> ExecResult {
        if let Err(msg) = reject_newlines(remote, "remote path") {
            return invalid_input(msg);
        }
        info!(host = %host.host, remote, "downloading file");
        let req = self
            .base_request(&self.transport.scp, host)
            .args(HOST_KEY_OPTS)
            .arg(format!("{}:{}", host.destination(), remote))
            .arg(local.as_os_str().to_os_string())
            .inherited();
        self.exec.run(req)
    }

    /// Archive `workspace_root` into a timestamped tarball, upload it to the remote home and
    /// delete the local archive whatever the outcome.
    pub fn backup(&self, host: &RemoteHost, workspace_root: &Path) -> BackupOutcome {
        let name = backup_archive_name(SystemTime::now());
        let scratch = match tempfile::Builder::new().prefix("aeronull-backup-").tempdir() {
            Ok(d) => d,
            Err(e) => {
                return BackupOutcome {
                    archive: PathBuf::from(&name),
                    result: invalid_input(format!("cannot create scratch dir: {e}")),
                }
            }
        };
        let archive = scratch.path().join(&name);

        let tar = self.exec.run(
            ExecRequest::new(self.transport.tar.clone())
                .arg("-czf")
                .arg(archive.as_os_str().to_os_string())
                .arg("-C")
                .arg(workspace_root.as_os_str().to_os_string())
                .arg(".")
                .inherited(),
        );

        let result = if tar.success {
            self.transfer_file(&archive, host, "")
        } else {
            warn!(outcome = %tar.describe(), "archive creation failed");
            tar
        };

        if archive.exists() {
            if let Err(e) = std::fs::remove_file(&archive) {
                warn!("failed to remove local archive {}: {e}", archive.display());
            }
        }
        drop(scratch);

        BackupOutcome { archive, result }
    }
}

/// `aeronull-backup-<rfc3339 with ':' and '.' replaced by '-'>.tar.gz`
pub fn backup_archive_name(at: SystemTime) -> String {
    let stamp = humantime::format_rfc3339_millis(at)
        .to_string()
        .replace([':', '.'], "-");
    format!("aeronull-backup-{stamp}.tar.gz")
}

fn invalid_input(msg: String) -> ExecResult {
    ExecResult::failed(ExecFailure::Rejected(msg), Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> RemoteHost {
        RemoteHost::new("10.0.0.5", "root", "x").unwrap()
    }

    #[test]
    fn archive_name_is_filesystem_safe() {
        let at = humantime::parse_rfc3339("2026-10-15T08:30:05.123Z").unwrap();
        assert_eq!(
            backup_archive_name(at),
            "aeronull-backup-2026-10-15T08-30-05-123Z.tar.gz"
        );
    }

    #[test]
    fn ssh_request_disables_host_key_checking() {
        let client = RemoteClient::new(ExecService::default(), Transport::default());
        let req = client.ssh_request(&host(), "uptime");
        let args: Vec<String> = req
            .get_args()
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(req.program(), &OsString::from("ssh"));
        assert_eq!(
            args,
            vec![
                "-o",
                "StrictHostKeyChecking=no",
                "-o",
                "PasswordAuthentication=yes",
                "root@10.0.0.5",
                "uptime"
            ]
        );
    }

    #[test]
    fn sshpass_wraps_only_when_secret_present() {
        let transport = Transport {
            sshpass: true,
            ..Transport::default()
        };
        let client = RemoteClient::new(ExecService::default(), transport);
        let req = client.ssh_request(&host(), "true");
        assert_eq!(req.program(), &OsString::from("sshpass"));
        assert_eq!(req.get_args()[0], OsString::from("-e"));
        assert!(req
            .get_env()
            .iter()
            .any(|(k, v)| k == "SSHPASS" && v == "x"));

        let mut no_secret = host();
        no_secret.secret.clear();
        let req = client.ssh_request(&no_secret, "true");
        assert_eq!(req.program(), &OsString::from("ssh"));
    }

    #[test]
    fn multi_line_remote_path_is_refused_without_spawning() {
        let client = RemoteClient::new(ExecService::default(), Transport::default());
        let res = client.transfer_file(Path::new("/etc/hostname"), &host(), "a\nb");
        assert!(!res.success);
        assert_eq!(res.failure.as_ref().map(|f| f.reason()), Some("rejected"));
        assert!(res.describe().contains("contains newline"));
    }
}
