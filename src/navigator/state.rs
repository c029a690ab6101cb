use std::path::PathBuf;

use super::screen::{Action, Screen};

/// The extracted folder managed by the `ExtractedFolder` screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderContext {
    pub name: String,
    pub path: PathBuf,
}

/// Session state threaded through the loop. Mutated only between input reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorState {
    pub screen: Screen,
    pub folder: Option<FolderContext>,
    /// Action currently in flight (sub-dialog).
    pub pending: Option<Action>,
}

impl Default for NavigatorState {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigatorState {
    pub fn new() -> Self {
        Self {
            screen: Screen::MainMenu,
            folder: None,
            pending: None,
        }
    }

    /// Move to `screen`. Leaving the folder screen drops its context; entering it without
    /// one falls back to the main menu.
    pub fn goto(&mut self, screen: Screen) {
        if screen != Screen::ExtractedFolder {
            self.folder = None;
        }
        self.screen = if screen == Screen::ExtractedFolder && self.folder.is_none() {
            Screen::MainMenu
        } else {
            screen
        };
    }

    pub fn enter_folder(&mut self, folder: FolderContext) {
        self.folder = Some(folder);
        self.screen = Screen::ExtractedFolder;
    }

    pub fn exit(&mut self) {
        self.folder = None;
        self.pending = None;
        self.screen = Screen::Exit;
    }

    pub fn is_finished(&self) -> bool {
        self.screen == Screen::Exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_screen_requires_context() {
        let mut st = NavigatorState::new();
        st.goto(Screen::ExtractedFolder);
        assert_eq!(st.screen, Screen::MainMenu);

        st.enter_folder(FolderContext {
            name: "site".into(),
            path: PathBuf::from("/w/scripts/extracted/site"),
        });
        assert_eq!(st.screen, Screen::ExtractedFolder);
        st.goto(Screen::ExtractedFolder);
        assert!(st.folder.is_some());

        st.goto(Screen::MainMenu);
        assert!(st.folder.is_none());
    }

    #[test]
    fn exit_is_terminal() {
        let mut st = NavigatorState::new();
        st.exit();
        assert!(st.is_finished());
    }
}
