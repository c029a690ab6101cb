use std::io::{self, Write};
use std::process::ExitCode;

use aeronull::banner::{print_startup_banner, write_farewell};
use aeronull::{
    acquire_session_lock, color_enabled_stderr, color_enabled_stdout, exit_code_for_io_error,
    log_error_stderr, telemetry_init, Console, Navigator, Services, SessionEnd, Settings,
    TerminalReader, Workspace,
};
use clap::Parser;
use tracing::{error, info};

mod cli;

use cli::Cli;

fn main() -> ExitCode {
    let _cli = Cli::parse();
    dotenvy::dotenv().ok();

    let settings = Settings::from_env();
    let err_color = color_enabled_stderr();

    let workspace = Workspace::new(settings.root.clone());
    if let Err(e) = workspace.ensure() {
        log_error_stderr(
            err_color,
            &format!(
                "aeronull: cannot prepare workspace {}: {e}",
                settings.root.display()
            ),
        );
        return ExitCode::from(exit_code_for_io_error(&e));
    }

    // Only one session may drive the host store at a time
    let lock = match acquire_session_lock(&settings.root) {
        Ok(l) => l,
        Err(e) => {
            log_error_stderr(err_color, &format!("aeronull: {e}"));
            return ExitCode::from(1);
        }
    };

    let log_file = telemetry_init(&workspace.debug_dir());
    info!(
        version = env!("CARGO_PKG_VERSION"),
        root = %settings.root.display(),
        log = ?log_file,
        lock = %lock.path().display(),
        "session started"
    );

    let use_color = color_enabled_stdout();
    let interactive = atty::is(atty::Stream::Stdout);
    let stdout = io::stdout();
    {
        let mut out = stdout.lock();
        let _ = print_startup_banner(&mut out, use_color);
        let _ = out.flush();
    }

    let console = Console::new(TerminalReader::new(), stdout)
        .with_color(use_color)
        .with_clear_screen(interactive)
        .with_redraw_delay(settings.redraw_delay);
    let mut navigator = Navigator::new(Services::new(settings), console);

    let code = match navigator.run() {
        Ok(SessionEnd::Exited) => {
            let mut console = navigator.into_console();
            let _ = write_farewell(console.out(), use_color);
            ExitCode::SUCCESS
        }
        Ok(SessionEnd::InputClosed) => {
            println!();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("session aborted: {e:#}");
            log_error_stderr(err_color, &format!("aeronull: {e:#}"));
            ExitCode::from(1)
        }
    };

    drop(lock);
    code
}
