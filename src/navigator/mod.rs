//! Menu navigator: render the current screen, read one line, transition, repeat.
//!
//! The loop owns a single `NavigatorState`. Input is validated through the pure
//! `screen::transition` table; actions run to completion and hand back a `Flow`.
//! End of input ends the session cleanly.
use std::io::Write;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::banner::{about_lines, write_header};
use crate::color::{CYAN, RED, YELLOW};
use crate::config::Settings;
use crate::errors::is_input_closed;
use crate::remote::{RemoteClient, Transport};
use crate::store::HostStore;
use crate::ui::LineReader;
use crate::util::exec::ExecService;
use crate::util::format_bytes;
use crate::workspace::{DiskSummary, Workspace};

pub mod actions;
pub mod console;
pub mod screen;
pub mod state;

pub use actions::Flow;
pub use console::Console;
pub use screen::{transition, Action, Screen, ScreenDef, Step};
pub use state::{FolderContext, NavigatorState};

/// Everything actions need besides the console.
#[derive(Debug, Clone)]
pub struct Services {
    pub settings: Settings,
    pub workspace: Workspace,
    pub store: HostStore,
    pub exec: ExecService,
    pub remote: RemoteClient,
}

impl Services {
    pub fn new(settings: Settings) -> Self {
        let exec = ExecService::new(settings.command_timeout);
        let remote = RemoteClient::new(exec.clone(), Transport::from_settings(&settings));
        Self {
            workspace: Workspace::new(settings.root.clone()),
            store: HostStore::in_root(&settings.root),
            exec,
            remote,
            settings,
        }
    }

    pub fn disk_summary(&self) -> DiskSummary {
        DiskSummary::probe(&self.exec, &self.settings.home, self.settings.probe_timeout)
    }
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The operator chose Exit on the main menu.
    Exited,
    /// Operator input reached end-of-file.
    InputClosed,
}

pub struct Navigator<R, W> {
    console: Console<R, W>,
    services: Services,
    state: NavigatorState,
}

impl<R: LineReader, W: Write> Navigator<R, W> {
    pub fn new(services: Services, console: Console<R, W>) -> Self {
        Self {
            console,
            services,
            state: NavigatorState::new(),
        }
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Drive the session until Exit or end of input.
    ///
    /// Errors are limited to failures writing to the output sink; action failures are
    /// reported to the operator and the loop continues on a stable screen.
    pub fn run(&mut self) -> Result<SessionEnd> {
        loop {
            if self.state.is_finished() {
                info!("session ended by operator");
                return Ok(SessionEnd::Exited);
            }
            self.render()?;
            let n = self.state.screen.option_count();
            let label = format!("Choose [0-{n}]: ");
            let Some(line) = self.console.read_choice(&label)? else {
                info!("operator input closed");
                return Ok(SessionEnd::InputClosed);
            };
            let step = transition(self.state.screen, &line);
            debug!(screen = ?self.state.screen, ?step, "transition");
            match step {
                Step::Invalid => {
                    self.console.error("Invalid choice")?;
                    self.console.linger();
                }
                Step::Exit => self.state.exit(),
                Step::Goto(screen) => self.state.goto(screen),
                Step::Act(action) => {
                    if let Some(end) = self.act(action)? {
                        return Ok(end);
                    }
                }
            }
        }
    }

    fn act(&mut self, action: Action) -> Result<Option<SessionEnd>> {
        self.state.pending = Some(action);
        let outcome = actions::perform(action, &mut self.console, &self.services, &mut self.state);
        self.state.pending = None;

        let after = match outcome {
            Ok(Flow::Pause) => self.console.pause(),
            Ok(Flow::Return) => Ok(()),
            Ok(Flow::Goto(screen)) => {
                self.state.goto(screen);
                Ok(())
            }
            Err(e) if is_input_closed(&e) => Err(e),
            Err(e) => {
                warn!(?action, error = %format!("{e:#}"), "action failed");
                self.console.blank()?;
                self.console.error(&format!("{e:#}"))?;
                self.console.pause()
            }
        };
        match after {
            Ok(()) => Ok(None),
            Err(e) if is_input_closed(&e) => {
                info!(?action, "operator input closed during action");
                Ok(Some(SessionEnd::InputClosed))
            }
            Err(e) => Err(e),
        }
    }

    fn render(&mut self) -> Result<()> {
        let use_color = self.console.use_color();
        self.console.clear()?;
        write_header(self.console.out(), use_color)?;

        let screen = self.state.screen;
        let def = screen.def();
        let mut title = def.title.to_string();
        match screen {
            Screen::MainMenu => {
                let disk = self.services.disk_summary();
                let line = format!(
                    "  [STORAGE] {} available of {} ({} used)",
                    disk.available, disk.total, disk.percent
                );
                let s = self.console.paint(YELLOW, &line);
                self.console.line(&s)?;
                self.console.blank()?;
            }
            Screen::StorageCleanup => {
                let disk = self.services.disk_summary();
                let usage = self.services.workspace.usage();
                let info = vec![
                    format!("Total Storage: {}", disk.total),
                    format!("Used: {} ({})", disk.used, disk.percent),
                    format!("Available: {}", disk.available),
                    String::new(),
                    format!("Cache: {}", format_bytes(usage.cache)),
                    format!("Debug: {}", format_bytes(usage.debug)),
                    format!("History: {}", format_bytes(usage.history)),
                ];
                self.console.boxed("STORAGE INFO", &info, CYAN)?;
                self.console.blank()?;
            }
            Screen::ExtractedFolder => {
                if let Some(folder) = &self.state.folder {
                    title = format!("{title}: {}", folder.name);
                }
            }
            Screen::About => {
                for l in about_lines(use_color) {
                    self.console.line(&format!("  {l}"))?;
                }
                self.console.blank()?;
            }
            _ => {}
        }

        let mut items: Vec<String> = def
            .options
            .iter()
            .enumerate()
            .map(|(i, (label, _))| {
                let key = self.console.paint(CYAN, &format!("[{}]", i + 1));
                format!("{key} {label}")
            })
            .collect();
        let zero = if def.escape == Step::Exit {
            self.console.paint(RED, "[0]")
        } else {
            self.console.paint(CYAN, "[0]")
        };
        items.push(format!("{zero} {}", def.escape_label()));
        self.console.boxed(&title, &items, def.color)?;
        self.console.blank()
    }
}
