use std::path::Path;
use std::process::{Command, Stdio};

use aeronull::{Console, Navigator, ScriptedReader, Services, SessionEnd, Settings};

#[allow(dead_code)]
pub type TestNavigator = Navigator<ScriptedReader, Vec<u8>>;

#[allow(dead_code)]
pub fn have_tool(name: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {name}"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Settings rooted at `root` with an existing workspace.
#[allow(dead_code)]
pub fn settings(root: &Path) -> Settings {
    let s = Settings::with_root(root);
    aeronull::Workspace::new(root).ensure().expect("workspace");
    s
}

#[allow(dead_code)]
pub fn navigator(settings: Settings, lines: &[&str]) -> TestNavigator {
    let console = Console::new(ScriptedReader::new(lines.iter().copied()), Vec::new());
    Navigator::new(Services::new(settings), console)
}

/// Run to completion; returns how the session ended, the transcript and the reader.
#[allow(dead_code)]
pub fn run_session(settings: Settings, lines: &[&str]) -> (SessionEnd, String, ScriptedReader) {
    let mut nav = navigator(settings, lines);
    let end = nav.run().expect("navigator run");
    let (reader, out) = nav.into_console().into_parts();
    (end, String::from_utf8(out).expect("utf8 output"), reader)
}
