use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// How long to wait for pipe readers after a timed-out child was killed.
/// Grandchildren may keep the pipes open; their output is dropped.
const READER_GRACE: Duration = Duration::from_millis(250);

/// Stdio disposition of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// stdout/stderr are buffered and returned; the timeout is enforced.
    #[default]
    Captured,
    /// The child shares the operator's terminal; no timeout.
    Inherited,
}

/// Why an execution did not succeed, beyond a plain non-zero exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecFailure {
    Timeout(Duration),
    Spawn(String),
    Wait(String),
    /// Exit 0 but the expected marker was absent from stdout.
    MissingMarker(String),
    /// Refused before spawning (bad operator input).
    Rejected(String),
}

impl ExecFailure {
    /// Short machine-stable reason tag.
    pub fn reason(&self) -> &'static str {
        match self {
            ExecFailure::Timeout(_) => "timeout",
            ExecFailure::Spawn(_) => "spawn",
            ExecFailure::Wait(_) => "wait",
            ExecFailure::MissingMarker(_) => "missing-marker",
            ExecFailure::Rejected(_) => "rejected",
        }
    }
}

impl fmt::Display for ExecFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecFailure::Timeout(d) => write!(f, "timeout after {}", humantime::format_duration(*d)),
            ExecFailure::Spawn(e) => write!(f, "failed to start: {e}"),
            ExecFailure::Wait(e) => write!(f, "failed to wait for process: {e}"),
            ExecFailure::MissingMarker(m) => write!(f, "expected marker {m:?} not found in output"),
            ExecFailure::Rejected(msg) => f.write_str(msg),
        }
    }
}

/// Structured command execution with timeouts.
#[derive(Debug, Clone)]
pub struct ExecService {
    default_timeout: Duration,
}

impl ExecService {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run one request to completion (or forced termination). Never fails:
    /// spawn and wait problems are reported through `ExecResult::failure`.
    #[tracing::instrument(
        level = "debug",
        skip(self, request),
        fields(program = ?request.program, mode = ?request.mode)
    )]
    pub fn run(&self, request: ExecRequest) -> ExecResult {
        let started = Instant::now();
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        if let Some(ref cwd) = request.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &request.env {
            cmd.env(key, value);
        }

        match request.mode {
            ExecMode::Captured => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
            }
            ExecMode::Inherited => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
        }

        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                debug!("spawn failed: {e}");
                return ExecResult::failed(
                    ExecFailure::Spawn(format!("{:?}: {e}", request.program)),
                    started.elapsed(),
                );
            }
        };

        match request.mode {
            ExecMode::Inherited => match child.wait() {
                Ok(status) => ExecResult::from_status(status, String::new(), String::new(), started.elapsed()),
                Err(e) => ExecResult::failed(ExecFailure::Wait(e.to_string()), started.elapsed()),
            },
            ExecMode::Captured => {
                let timeout = request.timeout.unwrap_or(self.default_timeout);
                run_captured(&mut child, timeout, started)
            }
        }
    }
}

impl Default for ExecService {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

fn run_captured(child: &mut Child, timeout: Duration, started: Instant) -> ExecResult {
    let stdout_rx = spawn_reader(child.stdout.take());
    let stderr_rx = spawn_reader(child.stderr.take());

    let waited = if timeout.is_zero() {
        child.wait().map(Some)
    } else {
        wait_at_least(child, timeout)
    };

    match waited {
        Ok(Some(status)) => {
            let stdout = stdout_rx.recv().unwrap_or_default();
            let stderr = stderr_rx.recv().unwrap_or_default();
            ExecResult::from_status(status, stdout, stderr, started.elapsed())
        }
        Ok(None) => {
            warn!(?timeout, "child exceeded timeout; killing");
            let _ = child.kill();
            let _ = child.wait();
            let stdout = stdout_rx.recv_timeout(READER_GRACE).unwrap_or_default();
            let stderr = stderr_rx.recv_timeout(READER_GRACE).unwrap_or_default();
            ExecResult {
                success: false,
                code: None,
                stdout,
                stderr,
                failure: Some(ExecFailure::Timeout(timeout)),
                duration: started.elapsed(),
            }
        }
        Err(e) => {
            let _ = child.kill();
            let _ = child.wait();
            ExecResult::failed(ExecFailure::Wait(e.to_string()), started.elapsed())
        }
    }
}

/// `wait_timeout` may return a little before the deadline; keep waiting until the full
/// bound has elapsed so a timeout is never reported early.
fn wait_at_least(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let wait_started = Instant::now();
    loop {
        let remaining = timeout.saturating_sub(wait_started.elapsed());
        if remaining.is_zero() {
            return child.try_wait();
        }
        if let Some(status) = child.wait_timeout(remaining)? {
            return Ok(Some(status));
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(stream: Option<R>) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let text = match stream {
            Some(mut reader) => read_stream(&mut reader).unwrap_or_default(),
            None => String::new(),
        };
        let _ = tx.send(text);
    });
    rx
}

fn read_stream(reader: &mut impl Read) -> io::Result<String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[derive(Debug, Default, Clone)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: Vec<(OsString, OsString)>,
    mode: ExecMode,
    timeout: Option<Duration>,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Run `script` through `shell -c`. The only path by which operator text reaches a shell.
    pub fn shell(shell: impl Into<OsString>, script: &str) -> Self {
        Self::new(shell).arg("-c").arg(script)
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn mode(mut self, mode: ExecMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn captured(self) -> Self {
        self.mode(ExecMode::Captured)
    }

    pub fn inherited(self) -> Self {
        self.mode(ExecMode::Inherited)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_mode(&self) -> ExecMode {
        self.mode
    }

    pub fn get_env(&self) -> &[(OsString, OsString)] {
        &self.env
    }
}

#[derive(Debug, Clone)]
pub struct ExecResult {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub failure: Option<ExecFailure>,
    pub duration: Duration,
}

impl ExecResult {
    fn from_status(status: ExitStatus, stdout: String, stderr: String, duration: Duration) -> Self {
        debug!(code = ?status.code(), ?duration, "child exited");
        Self {
            success: status.success(),
            code: status.code(),
            stdout,
            stderr,
            failure: None,
            duration,
        }
    }

    pub fn failed(failure: ExecFailure, duration: Duration) -> Self {
        Self {
            success: false,
            code: None,
            stdout: String::new(),
            stderr: String::new(),
            failure: Some(failure),
            duration,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.failure, Some(ExecFailure::Timeout(_)))
    }

    /// Downgrade a successful result whose stdout lacks `marker`.
    pub fn require_marker(mut self, marker: &str) -> Self {
        if self.success && !self.stdout.contains(marker) {
            self.success = false;
            self.failure = Some(ExecFailure::MissingMarker(marker.to_string()));
        }
        self
    }

    /// One-line, human-readable summary of the outcome.
    pub fn describe(&self) -> String {
        match (&self.failure, self.code) {
            (Some(f), _) => f.to_string(),
            (None, Some(0)) => "exit code 0".to_string(),
            (None, Some(c)) => format!("exit code {c}"),
            (None, None) => "terminated by signal".to_string(),
        }
    }
}
