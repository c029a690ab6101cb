#![cfg(unix)]
mod common;

use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use aeronull::{ExecService, RemoteClient, RemoteHost, Transport};

fn fake_program(dir: &Path, name: &str, body: &str) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&p, fs::Permissions::from_mode(0o755)).unwrap();
    p
}

fn client(ssh: &Path, scp: &Path, probe_timeout: Duration) -> RemoteClient {
    let transport = Transport {
        ssh: OsString::from(ssh),
        scp: OsString::from(scp),
        sshpass: false,
        probe_timeout,
        ..Transport::default()
    };
    RemoteClient::new(ExecService::default(), transport)
}

fn host() -> RemoteHost {
    RemoteHost::new("10.0.0.5", "root", "x").unwrap()
}

#[test]
fn probe_requires_exit_zero_and_marker() {
    if !common::have_tool("sh") {
        eprintln!("skipping: sh not found");
        return;
    }
    let td = tempfile::tempdir().unwrap();
    let scp = fake_program(td.path(), "scp", "exit 0");

    let ok = fake_program(td.path(), "ssh-ok", "echo SUCCESS");
    let res = client(&ok, &scp, Duration::from_secs(5)).test_connection(&host());
    assert!(res.success, "{}", res.describe());

    let silent = fake_program(td.path(), "ssh-silent", "echo hello");
    let res = client(&silent, &scp, Duration::from_secs(5)).test_connection(&host());
    assert!(!res.success);
    assert_eq!(res.code, Some(0));
    assert_eq!(res.failure.as_ref().map(|f| f.reason()), Some("missing-marker"));

    let refused = fake_program(td.path(), "ssh-refused", "echo SUCCESS; exit 255");
    let res = client(&refused, &scp, Duration::from_secs(5)).test_connection(&host());
    assert!(!res.success);
    assert_eq!(res.code, Some(255));
    assert!(res.failure.is_none());
}

#[test]
fn probe_is_bounded_by_connectivity_timeout() {
    if !common::have_tool("sleep") {
        eprintln!("skipping: sleep not found");
        return;
    }
    let td = tempfile::tempdir().unwrap();
    let scp = fake_program(td.path(), "scp", "exit 0");
    let pid_file = td.path().join("ssh.pid");
    let hang = fake_program(
        td.path(),
        "ssh-hang",
        &format!("echo $$ > '{}'; exec sleep 10", pid_file.display()),
    );
    let bound = Duration::from_millis(300);
    let started = Instant::now();
    let res = client(&hang, &scp, bound).test_connection(&host());
    let elapsed = started.elapsed();
    assert!(res.is_timeout(), "{}", res.describe());
    assert!(!res.success);
    assert!(elapsed >= bound, "probe gave up early after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "probe took {elapsed:?}");

    let pid = fs::read_to_string(&pid_file).unwrap();
    let alive = Command::new("kill")
        .arg("-0")
        .arg(pid.trim())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!alive.success(), "ssh process {} still running", pid.trim());
}

#[test]
fn remote_command_is_passed_as_last_argument() {
    let td = tempfile::tempdir().unwrap();
    let scp = fake_program(td.path(), "scp", "exit 0");
    let echo = fake_program(td.path(), "ssh-echo", "echo \"$@\"; echo oops >&2; exit 3");
    let res = client(&echo, &scp, Duration::from_secs(5)).run_command(&host(), "uptime -p");
    assert!(!res.success);
    assert_eq!(res.code, Some(3));
    assert!(
        res.stdout.trim_end().ends_with("root@10.0.0.5 uptime -p"),
        "{}",
        res.stdout
    );
    assert!(res.stdout.contains("StrictHostKeyChecking=no"));
    assert_eq!(res.stderr.trim(), "oops");
}

#[test]
fn backup_uploads_then_removes_local_archive() {
    if !common::have_tool("tar") {
        eprintln!("skipping: tar not found");
        return;
    }
    let td = tempfile::tempdir().unwrap();
    let root = td.path().join("workspace");
    fs::create_dir_all(root.join("scripts")).unwrap();
    fs::write(root.join("scripts/a.sh"), "echo hi\n").unwrap();
    let remote_home = td.path().join("remote-home");
    fs::create_dir_all(&remote_home).unwrap();

    let ssh = fake_program(td.path(), "ssh", "exit 0");
    // args: -o StrictHostKeyChecking=no <local> <dest>
    let scp = fake_program(
        td.path(),
        "scp",
        &format!("cp \"$3\" '{}'/", remote_home.display()),
    );
    let outcome = client(&ssh, &scp, Duration::from_secs(5)).backup(&host(), &root);
    assert!(outcome.result.success, "{}", outcome.result.describe());
    assert!(!outcome.archive.exists(), "local archive left behind");

    let uploaded: Vec<String> = fs::read_dir(&remote_home)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(uploaded.len(), 1);
    assert!(uploaded[0].starts_with("aeronull-backup-"));
    assert!(uploaded[0].ends_with(".tar.gz"));
}

#[test]
fn failed_upload_still_removes_local_archive() {
    if !common::have_tool("tar") {
        eprintln!("skipping: tar not found");
        return;
    }
    let td = tempfile::tempdir().unwrap();
    let root = td.path().join("workspace");
    fs::create_dir_all(&root).unwrap();
    let ssh = fake_program(td.path(), "ssh", "exit 0");
    let scp = fake_program(td.path(), "scp", "exit 1");
    let outcome = client(&ssh, &scp, Duration::from_secs(5)).backup(&host(), &root);
    assert!(!outcome.result.success);
    assert_eq!(outcome.result.code, Some(1));
    assert!(!outcome.archive.exists());
}
