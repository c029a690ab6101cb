//! Screens and the pure transition table.
//!
//! Every screen has a static definition: title, ordered options and the target of `0`.
//! `transition` maps (screen, raw input) to a `Step` without touching any state, so the
//! whole menu tree can be checked without a terminal.
use crate::color::{BLUE, CYAN, MAGENTA};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    MainMenu,
    VpsManager,
    CodingWorkspace,
    WebProjects,
    StorageCleanup,
    ExtractedFolder,
    About,
    Exit,
}

/// Operations reachable from a menu option. Each runs to completion and returns a `Flow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ListScripts,
    RunScript,
    AddScript,
    DeleteScript,
    ExtractZip,
    PickExtractedFolder,
    RunExtractedProject,
    RunAnyCommand,

    AddHost,
    ListHosts,
    TestHost,
    RunHostCommand,
    TransferToHost,
    DeleteHost,
    BackupToHost,

    CreateCodingProject,
    ListCodingProjects,
    EditCodingProject,
    RunCodingProject,
    DeleteCodingProject,

    CreateWebProject,
    ListWebProjects,
    RunWebServer,
    DeleteWebProject,

    ClearCache,
    ClearDebug,
    ClearHistory,
    ClearAll,

    ShowFolderStructure,
    EditFolderFile,
    RunInFolder,
    DeleteFolder,
}

/// Result of interpreting one line of input on a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Goto(Screen),
    Act(Action),
    Exit,
    Invalid,
}

#[derive(Debug)]
pub struct ScreenDef {
    pub title: &'static str,
    pub color: &'static str,
    pub options: &'static [(&'static str, Step)],
    /// What `0` does on this screen.
    pub escape: Step,
}

impl ScreenDef {
    pub fn escape_label(&self) -> &'static str {
        match self.escape {
            Step::Exit => "Exit",
            _ => "Back",
        }
    }
}

use Action as A;
use Step::{Act, Goto};

static MAIN_MENU: ScreenDef = ScreenDef {
    title: "MAIN MENU",
    color: MAGENTA,
    options: &[
        ("List Scripts", Act(A::ListScripts)),
        ("Run Script", Act(A::RunScript)),
        ("Add New Script", Act(A::AddScript)),
        ("Delete Script", Act(A::DeleteScript)),
        ("Extract ZIP from Download/VPS", Act(A::ExtractZip)),
        ("Manage Extracted ZIPs", Act(A::PickExtractedFolder)),
        ("Run Project", Act(A::RunExtractedProject)),
        ("Coding Workspace", Goto(Screen::CodingWorkspace)),
        ("Web Projects (Port 3000)", Goto(Screen::WebProjects)),
        ("VPS Manager", Goto(Screen::VpsManager)),
        ("Run Command (Full Access)", Act(A::RunAnyCommand)),
        ("Storage & Cleanup", Goto(Screen::StorageCleanup)),
        ("About AeroNull", Goto(Screen::About)),
    ],
    escape: Step::Exit,
};

static VPS_MANAGER: ScreenDef = ScreenDef {
    title: "VPS MANAGER",
    color: CYAN,
    options: &[
        ("Add New VPS", Act(A::AddHost)),
        ("List VPS", Act(A::ListHosts)),
        ("Test VPS Connection", Act(A::TestHost)),
        ("Run Command on VPS", Act(A::RunHostCommand)),
        ("Transfer File to VPS", Act(A::TransferToHost)),
        ("Delete VPS", Act(A::DeleteHost)),
        ("Backup to VPS", Act(A::BackupToHost)),
        ("Back", Goto(Screen::MainMenu)),
    ],
    escape: Goto(Screen::MainMenu),
};

static CODING_WORKSPACE: ScreenDef = ScreenDef {
    title: "CODING WORKSPACE",
    color: CYAN,
    options: &[
        ("Create New Project", Act(A::CreateCodingProject)),
        ("List Projects", Act(A::ListCodingProjects)),
        ("Edit Project", Act(A::EditCodingProject)),
        ("Run Project", Act(A::RunCodingProject)),
        ("Delete Project", Act(A::DeleteCodingProject)),
        ("Back", Goto(Screen::MainMenu)),
    ],
    escape: Goto(Screen::MainMenu),
};

static WEB_PROJECTS: ScreenDef = ScreenDef {
    title: "WEB PROJECTS - PORT 3000",
    color: CYAN,
    options: &[
        ("Create New Web Project", Act(A::CreateWebProject)),
        ("List Web Projects", Act(A::ListWebProjects)),
        ("Run Web Server (Port 3000)", Act(A::RunWebServer)),
        ("Delete Web Project", Act(A::DeleteWebProject)),
        ("Back", Goto(Screen::MainMenu)),
    ],
    escape: Goto(Screen::MainMenu),
};

static STORAGE_CLEANUP: ScreenDef = ScreenDef {
    title: "CLEANUP OPTIONS",
    color: BLUE,
    options: &[
        ("Clear Cache", Act(A::ClearCache)),
        ("Clear Debug", Act(A::ClearDebug)),
        ("Clear History", Act(A::ClearHistory)),
        ("Clear All", Act(A::ClearAll)),
        ("Back to Menu", Goto(Screen::MainMenu)),
    ],
    escape: Goto(Screen::MainMenu),
};

static EXTRACTED_FOLDER: ScreenDef = ScreenDef {
    title: "MANAGE",
    color: MAGENTA,
    options: &[
        ("Show File Structure", Act(A::ShowFolderStructure)),
        ("Edit File", Act(A::EditFolderFile)),
        ("Run Command", Act(A::RunInFolder)),
        ("Delete Folder", Act(A::DeleteFolder)),
        ("Back", Act(A::PickExtractedFolder)),
    ],
    escape: Goto(Screen::MainMenu),
};

static ABOUT: ScreenDef = ScreenDef {
    title: "INFO",
    color: CYAN,
    options: &[("Back", Goto(Screen::MainMenu))],
    escape: Goto(Screen::MainMenu),
};

static EXIT: ScreenDef = ScreenDef {
    title: "EXIT",
    color: CYAN,
    options: &[],
    escape: Step::Exit,
};

impl Screen {
    pub fn def(self) -> &'static ScreenDef {
        match self {
            Screen::MainMenu => &MAIN_MENU,
            Screen::VpsManager => &VPS_MANAGER,
            Screen::CodingWorkspace => &CODING_WORKSPACE,
            Screen::WebProjects => &WEB_PROJECTS,
            Screen::StorageCleanup => &STORAGE_CLEANUP,
            Screen::ExtractedFolder => &EXTRACTED_FOLDER,
            Screen::About => &ABOUT,
            Screen::Exit => &EXIT,
        }
    }

    pub fn option_count(self) -> usize {
        self.def().options.len()
    }
}

/// Interpret one line of input on `screen`.
///
/// The trimmed input must be `0` or an integer in `1..=options`; anything else (empty,
/// non-numeric, out of range, signed) is `Step::Invalid`.
pub fn transition(screen: Screen, input: &str) -> Step {
    if screen == Screen::Exit {
        return Step::Exit;
    }
    let def = screen.def();
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Step::Invalid;
    }
    let Ok(n) = trimmed.parse::<usize>() else {
        return Step::Invalid;
    };
    if n == 0 {
        return def.escape;
    }
    def.options
        .get(n - 1)
        .map(|(_, step)| *step)
        .unwrap_or(Step::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Screen; 7] = [
        Screen::MainMenu,
        Screen::VpsManager,
        Screen::CodingWorkspace,
        Screen::WebProjects,
        Screen::StorageCleanup,
        Screen::ExtractedFolder,
        Screen::About,
    ];

    #[test]
    fn zero_exits_main_and_returns_elsewhere() {
        assert_eq!(transition(Screen::MainMenu, "0"), Step::Exit);
        for s in ALL.iter().copied().filter(|s| *s != Screen::MainMenu) {
            assert_eq!(transition(s, "0"), Step::Goto(Screen::MainMenu), "{s:?}");
        }
    }

    #[test]
    fn invalid_inputs_are_rejected_everywhere() {
        for s in ALL {
            let past_end = (s.option_count() + 1).to_string();
            for bad in ["", "   ", "abc", "-1", "+1", "1.0", "99", past_end.as_str()] {
                assert_eq!(transition(s, bad), Step::Invalid, "{s:?} {bad:?}");
            }
        }
    }

    #[test]
    fn main_menu_table_matches_numbering() {
        assert_eq!(transition(Screen::MainMenu, " 1 "), Step::Act(Action::ListScripts));
        assert_eq!(transition(Screen::MainMenu, "10"), Step::Goto(Screen::VpsManager));
        assert_eq!(transition(Screen::MainMenu, "13"), Step::Goto(Screen::About));
        assert_eq!(Screen::MainMenu.option_count(), 13);
    }

    #[test]
    fn every_sub_menu_keeps_an_explicit_back_option() {
        for s in ALL.iter().copied().filter(|s| *s != Screen::MainMenu) {
            let last = s.def().options.last().expect("options");
            assert_eq!(last.0, "Back", "{s:?}");
            if s != Screen::ExtractedFolder {
                assert_eq!(last.1, Step::Goto(Screen::MainMenu), "{s:?}");
            }
            assert_eq!(s.def().escape_label(), "Back");
        }
        assert_eq!(
            transition(Screen::ExtractedFolder, "5"),
            Step::Act(Action::PickExtractedFolder)
        );
        assert_eq!(Screen::MainMenu.def().escape_label(), "Exit");
    }

    #[test]
    fn vps_manager_has_seven_actions() {
        let acts = Screen::VpsManager
            .def()
            .options
            .iter()
            .filter(|(_, s)| matches!(s, Step::Act(_)))
            .count();
        assert_eq!(acts, 7);
    }
}
