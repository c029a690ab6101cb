mod common;

use std::fs;

use aeronull::{HostStore, Screen, SessionEnd};
use common::{navigator, run_session, settings};

#[test]
fn add_host_then_list_shows_display_name() {
    let td = tempfile::tempdir().unwrap();
    let lines = [
        "10",       // VPS manager
        "1",        // add
        "10.0.0.5", // host
        "",         // username -> root
        "s3cret",   // secret
        "",         // pause
        "2",        // list
        "",         // pause
        "0",        // back
        "0",        // exit
    ];
    let (end, out, reader) = run_session(settings(td.path()), &lines);
    assert_eq!(end, SessionEnd::Exited);
    assert!(out.contains("VPS added: ssh root@10.0.0.5"), "{out}");
    assert_eq!(out.matches("ssh root@10.0.0.5").count(), 2, "{out}");
    assert_eq!(reader.secrets_read(), 1);
    assert_eq!(reader.remaining(), 0);

    let hosts = HostStore::in_root(td.path()).load().unwrap();
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].secret, "s3cret");
}

#[test]
fn invalid_choices_never_change_the_screen() {
    let td = tempfile::tempdir().unwrap();
    let mut nav = navigator(settings(td.path()), &["99", "abc", "", "-1", "1.5"]);
    let end = nav.run().unwrap();
    assert_eq!(end, SessionEnd::InputClosed);
    assert_eq!(nav.state().screen, Screen::MainMenu);
    let (_, out) = nav.into_console().into_parts();
    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.matches("Invalid choice").count(), 5, "{out}");
}

#[test]
fn invalid_choice_on_sub_screen_stays_there() {
    let td = tempfile::tempdir().unwrap();
    let mut nav = navigator(settings(td.path()), &["12", "6", "x"]);
    assert_eq!(nav.run().unwrap(), SessionEnd::InputClosed);
    assert_eq!(nav.state().screen, Screen::StorageCleanup);
}

#[test]
fn zero_exits_from_main_and_returns_from_sub_screens() {
    let td = tempfile::tempdir().unwrap();
    let mut nav = navigator(settings(td.path()), &["8", "0", "13", "1"]);
    assert_eq!(nav.run().unwrap(), SessionEnd::InputClosed);
    assert_eq!(nav.state().screen, Screen::MainMenu);

    let (end, out, _) = run_session(settings(td.path()), &["0"]);
    assert_eq!(end, SessionEnd::Exited);
    assert!(out.contains("AERONULL PROJECT RUNNER"));
}

#[test]
fn end_of_input_inside_an_action_ends_the_session() {
    let td = tempfile::tempdir().unwrap();
    let (end, _, _) = run_session(settings(td.path()), &["10", "1", "10.0.0.5"]);
    assert_eq!(end, SessionEnd::InputClosed);
    assert!(HostStore::in_root(td.path()).load().unwrap().is_empty());
}

#[test]
fn add_script_then_list_it() {
    let td = tempfile::tempdir().unwrap();
    let lines = ["3", "hello.sh", "echo hi", "echo bye", "END", "", "1", "", "0"];
    let (end, out, _) = run_session(settings(td.path()), &lines);
    assert_eq!(end, SessionEnd::Exited);
    assert!(out.contains("Script saved: hello.sh"), "{out}");
    assert!(out.contains("[SH] hello.sh"), "{out}");
    let body = fs::read_to_string(td.path().join("scripts/hello.sh")).unwrap();
    assert_eq!(body, "echo hi\necho bye\n");
}

#[test]
fn adding_an_existing_script_is_refused() {
    let td = tempfile::tempdir().unwrap();
    let s = settings(td.path());
    fs::write(td.path().join("scripts/a.js"), "1").unwrap();
    let (_, out, reader) = run_session(s, &["3", "a.js", ""]);
    assert!(out.contains("File already exists!"), "{out}");
    assert_eq!(reader.remaining(), 0);
    assert_eq!(fs::read_to_string(td.path().join("scripts/a.js")).unwrap(), "1");
}

#[test]
fn cancelled_sub_dialog_returns_without_pause() {
    let td = tempfile::tempdir().unwrap();
    let s = settings(td.path());
    fs::write(td.path().join("scripts/a.js"), "").unwrap();
    let (end, _, reader) = run_session(s, &["4", "0", "0"]);
    assert_eq!(end, SessionEnd::Exited);
    assert_eq!(reader.remaining(), 0);
    assert!(td.path().join("scripts/a.js").exists());
}

#[test]
fn clear_cache_reports_state() {
    let td = tempfile::tempdir().unwrap();
    let s = settings(td.path());
    fs::write(td.path().join(".cache/blob"), "x").unwrap();
    let (_, out, _) = run_session(s, &["12", "1", "", "1", ""]);
    assert!(out.contains("Cache cleared"), "{out}");
    assert!(out.contains("Cache already empty"), "{out}");
    assert!(out.contains("STORAGE INFO"));
    assert_eq!(fs::read_dir(td.path().join(".cache")).unwrap().count(), 0);
}

#[test]
fn coding_project_from_template() {
    let td = tempfile::tempdir().unwrap();
    let lines = ["8", "1", "demo", "2", "", "2", ""];
    let (_, out, _) = run_session(settings(td.path()), &lines);
    assert!(out.contains("Project created"), "{out}");
    assert!(td.path().join("coding/demo/main.py").is_file());
    assert!(out.contains("demo ("), "{out}");
}

#[test]
fn unknown_template_choice_writes_a_readme() {
    let td = tempfile::tempdir().unwrap();
    let (_, _, _) = run_session(settings(td.path()), &["9", "1", "site", "42", ""]);
    let readme = fs::read_to_string(td.path().join("web-projects/site/README.md")).unwrap();
    assert!(readme.contains("Web Project Created with AeroNull"));
}

#[test]
fn extracted_folder_screen_shows_structure_and_deletes() {
    let td = tempfile::tempdir().unwrap();
    let s = settings(td.path());
    let site = td.path().join("scripts/extracted/site");
    fs::create_dir_all(site.join("css")).unwrap();
    fs::write(site.join("index.html"), "<h1/>").unwrap();
    fs::write(site.join("css/app.css"), "").unwrap();

    let mut nav = navigator(s, &["6", "1", "1", ""]);
    assert_eq!(nav.run().unwrap(), SessionEnd::InputClosed);
    assert_eq!(nav.state().screen, Screen::ExtractedFolder);
    assert_eq!(nav.state().folder.as_ref().map(|f| f.name.as_str()), Some("site"));
    let (_, out) = nav.into_console().into_parts();
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("MANAGE: site"), "{out}");
    assert!(out.contains("css/app.css"), "{out}");

    let mut nav = navigator(settings(td.path()), &["6", "1", "4", "y", ""]);
    assert_eq!(nav.run().unwrap(), SessionEnd::InputClosed);
    assert_eq!(nav.state().screen, Screen::MainMenu);
    assert!(nav.state().folder.is_none());
    assert!(!site.exists());
}

#[test]
fn folder_screen_back_reopens_the_folder_picker() {
    let td = tempfile::tempdir().unwrap();
    fs::create_dir_all(td.path().join("scripts/extracted/api")).unwrap();
    fs::create_dir_all(td.path().join("scripts/extracted/site")).unwrap();

    let mut nav = navigator(settings(td.path()), &["6", "1", "5", "2"]);
    assert_eq!(nav.run().unwrap(), SessionEnd::InputClosed);
    assert_eq!(nav.state().screen, Screen::ExtractedFolder);
    assert_eq!(nav.state().folder.as_ref().map(|f| f.name.as_str()), Some("site"));
    let (_, out) = nav.into_console().into_parts();
    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.matches("EXTRACTED FOLDERS").count(), 2, "{out}");

    let mut nav = navigator(settings(td.path()), &["6", "1", "5", "0"]);
    assert_eq!(nav.run().unwrap(), SessionEnd::InputClosed);
    assert_eq!(nav.state().screen, Screen::MainMenu);
    assert!(nav.state().folder.is_none());
}

#[test]
fn failed_lookup_is_reported_and_screen_stays_stable() {
    let td = tempfile::tempdir().unwrap();
    let mut nav = navigator(settings(td.path()), &["6", ""]);
    assert_eq!(nav.run().unwrap(), SessionEnd::InputClosed);
    assert_eq!(nav.state().screen, Screen::MainMenu);
    let (_, out) = nav.into_console().into_parts();
    assert!(String::from_utf8(out).unwrap().contains("No extracted folders found"));
}

#[test]
fn corrupt_host_store_is_reported_as_empty() {
    let td = tempfile::tempdir().unwrap();
    let s = settings(td.path());
    fs::write(td.path().join(".vps_config.json"), "{not json").unwrap();
    let (_, out, _) = run_session(s, &["10", "2", ""]);
    assert!(out.contains("Cannot read VPS list"), "{out}");
    assert!(out.contains("No VPS configured"), "{out}");
}
