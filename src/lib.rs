//! AeroNull: an interactive console for local scripts, scaffolded projects and remote hosts.
//!
//! Architecture
//! - Binary glue (src/main.rs) parses the CLI, prepares the workspace, takes the session lock
//!   and hands the terminal to the navigator.
//! - navigator::*: screen table, session state, console I/O and the menu actions.
//! - util::exec: the only place child processes are spawned (captured with a timeout, or
//!   inherited on the operator's terminal).
//!
//! Key modules
//! - workspace.rs: directory layout, script/project listings, history, storage cleanup.
//! - store.rs: the JSON host store (`.vps_config.json`).
//! - remote.rs: ssh/scp/tar transport for probe, remote command, transfer and backup.
//! - templates.rs: coding and web project scaffolds.
//! - color.rs, banner.rs, ui/*: presentation (exact strings preserved).
//!
//! Environment
//! - AERONULL_ROOT: workspace root (default `$HOME/aeronull`).
//! - AERONULL_PROBE_TIMEOUT / AERONULL_COMMAND_TIMEOUT / AERONULL_REDRAW_DELAY: humantime
//!   durations.
//! - AERONULL_SSH_BIN / SCP_BIN / TAR_BIN / UNZIP_BIN: transport program overrides.
//! - AERONULL_SSHPASS=0 disables the `sshpass` wrapper; AERONULL_DOWNLOAD_DIRS overrides the
//!   ZIP search path list.
//! - AERONULL_LOG / RUST_LOG: log filter; AERONULL_TRACING_FMT=1 logs to stderr.
//! - AERONULL_COLOR / NO_COLOR: color control.

pub mod banner;
pub mod color;
pub mod config;
pub mod errors;
pub mod lock;
pub mod navigator;
pub mod remote;
pub mod store;
pub mod telemetry;
pub mod templates;
pub mod ui;
pub mod util;
pub mod workspace;

pub use color::*;
pub use config::Settings;
pub use errors::{exit_code_for_io_error, is_input_closed, InputClosed, StoreError};
pub use lock::{acquire_lock_at, acquire_session_lock, SessionLock};
pub use navigator::{Console, Navigator, NavigatorState, Screen, Services, SessionEnd};
pub use remote::{RemoteClient, Transport};
pub use store::{HostStore, RemoteHost};
pub use telemetry::telemetry_init;
pub use ui::{LineReader, ScriptedReader, TerminalReader};
pub use util::exec::{ExecFailure, ExecMode, ExecRequest, ExecResult, ExecService};
pub use workspace::Workspace;
