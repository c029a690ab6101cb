use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::info;

use super::{open_editor, report_exit, require_input, running_banner, shell_request, Con, Flow};
use crate::color::{CYAN, GREEN, MAGENTA, RED, YELLOW};
use crate::navigator::Services;
use crate::templates::{
    create_project, fallback_readme, web_fallback_readme, CodingTemplate, TemplateFile,
    WebTemplate, WEB_PORT,
};
use crate::ui::LineReader;
use crate::util::exec::ExecRequest;
use crate::util::fs::{display_relative, files_under};
use crate::util::format_bytes;
use crate::workspace::FolderEntry;

const EDIT_LIMIT: usize = 30;

/// Which project tree an action works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ProjectKind {
    Coding,
    Web,
}

impl ProjectKind {
    fn dir(self, svc: &Services) -> PathBuf {
        match self {
            ProjectKind::Coding => svc.workspace.coding_dir(),
            ProjectKind::Web => svc.workspace.web_dir(),
        }
    }

    fn projects(self, svc: &Services) -> Vec<FolderEntry> {
        match self {
            ProjectKind::Coding => svc.workspace.coding_projects(),
            ProjectKind::Web => svc.workspace.web_projects(),
        }
    }

    fn title(self) -> &'static str {
        match self {
            ProjectKind::Coding => "CODING PROJECTS",
            ProjectKind::Web => "WEB PROJECTS",
        }
    }

    fn template_labels(self) -> Vec<&'static str> {
        match self {
            ProjectKind::Coding => CodingTemplate::ALL.iter().map(|t| t.label()).collect(),
            ProjectKind::Web => WebTemplate::ALL.iter().map(|t| t.label()).collect(),
        }
    }

    /// Files for the typed template choice; unknown choices get a README only.
    fn files_for(self, choice: &str, name: &str) -> io::Result<Vec<TemplateFile>> {
        match self {
            ProjectKind::Coding => match CodingTemplate::from_choice(choice) {
                Some(t) => t.files(name),
                None => fallback_readme(name),
            },
            ProjectKind::Web => match WebTemplate::from_choice(choice) {
                Some(t) => t.files(name),
                None => web_fallback_readme(name),
            },
        }
    }
}

fn project_items(projects: &[FolderEntry]) -> Vec<String> {
    projects
        .iter()
        .map(|p| format!("{} ({})", p.name, format_bytes(p.size())))
        .collect()
}

fn choose_project<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    kind: ProjectKind,
    color: &str,
    label: &str,
) -> Result<Option<FolderEntry>> {
    let projects = kind.projects(svc);
    if projects.is_empty() {
        con.error("No projects found")?;
        return Ok(None);
    }
    let items = project_items(&projects);
    let Some(idx) = con.choose(kind.title(), &items, color, label)? else {
        return Ok(None);
    };
    Ok(projects.into_iter().nth(idx))
}

fn file_icon(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "js" | "jsx" => "[JS]",
        "py" => "[PY]",
        "sh" => "[SH]",
        "html" => "[HTML]",
        "css" => "[CSS]",
        "json" => "[JSON]",
        _ => "[FILE]",
    }
}

pub(super) fn create<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    kind: ProjectKind,
) -> Result<Flow> {
    let Some(name) = require_input(con, "Project name: ", "Project name")? else {
        return Ok(Flow::Pause);
    };
    con.blank()?;
    let labels = crate::ui::numbered(kind.template_labels());
    con.boxed("TEMPLATES", &labels, MAGENTA)?;
    con.blank()?;
    let choice = con.prompt("Template number: ")?;
    let files = kind.files_for(&choice, &name)?;

    let dir = match create_project(&kind.dir(svc), &name, &files) {
        Ok(dir) => dir,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            con.error("Project already exists!")?;
            return Ok(Flow::Pause);
        }
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
            con.error(&e.to_string())?;
            return Ok(Flow::Pause);
        }
        Err(e) => return Err(e).context("creating project"),
    };
    con.blank()?;
    con.ok(&format!("Project created: {}", dir.display()))?;
    if kind == ProjectKind::Web {
        con.info(&format!(
            "Start it from this menu; it listens on http://localhost:{WEB_PORT}"
        ))?;
    }
    Ok(Flow::Pause)
}

pub(super) fn list<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    kind: ProjectKind,
) -> Result<Flow> {
    let projects = kind.projects(svc);
    if projects.is_empty() {
        con.warn("No projects yet")?;
        return Ok(Flow::Pause);
    }
    let lines = crate::ui::numbered(project_items(&projects));
    con.boxed(kind.title(), &lines, CYAN)?;
    Ok(Flow::Pause)
}

pub(super) fn edit<R: LineReader, W: Write>(con: Con<'_, R, W>, svc: &Services) -> Result<Flow> {
    let Some(project) =
        choose_project(con, svc, ProjectKind::Coding, YELLOW, "Project number to edit")?
    else {
        return Ok(Flow::Pause);
    };
    let files = files_under(&project.path)
        .with_context(|| format!("listing {}", project.path.display()))?;
    if files.is_empty() {
        con.error("Project has no files")?;
        return Ok(Flow::Pause);
    }
    let shown: Vec<String> = files
        .iter()
        .take(EDIT_LIMIT)
        .map(|p| {
            format!(
                "{} {}",
                con.paint(GREEN, file_icon(p)),
                display_relative(p, &project.path)
            )
        })
        .collect();
    let Some(idx) = con.choose("EDIT FILE", &shown, YELLOW, "File number to edit")? else {
        return Ok(Flow::Return);
    };
    open_editor(con, svc, &files[idx])?;
    Ok(Flow::Pause)
}

pub(super) fn run_command<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    let Some(project) =
        choose_project(con, svc, ProjectKind::Coding, GREEN, "Project number to run")?
    else {
        return Ok(Flow::Pause);
    };
    let Some(command) = require_input(con, "Command to run (e.g. node index.js): ", "Command")?
    else {
        return Ok(Flow::Pause);
    };
    running_banner(con, &format!("Running in {}: {command}", project.name))?;
    let res = svc.exec.run(shell_request(svc, &command, Some(&project.path)));
    report_exit(con, &res, "Command")?;
    Ok(Flow::Pause)
}

pub(super) fn run_server<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    let Some(project) =
        choose_project(con, svc, ProjectKind::Web, GREEN, "Project number to start")?
    else {
        return Ok(Flow::Pause);
    };
    if !project.path.join("server.js").is_file() {
        con.error(&format!("server.js not found in {}", project.name))?;
        return Ok(Flow::Pause);
    }
    running_banner(
        con,
        &format!(
            "Serving {} on http://localhost:{WEB_PORT} (Ctrl+C to stop)",
            project.name
        ),
    )?;
    let res = svc.exec.run(
        ExecRequest::new("node")
            .arg("server.js")
            .cwd(&project.path)
            .inherited(),
    );
    report_exit(con, &res, "Server")?;
    Ok(Flow::Pause)
}

pub(super) fn delete<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
    kind: ProjectKind,
) -> Result<Flow> {
    let Some(project) = choose_project(con, svc, kind, RED, "Project number to delete")? else {
        return Ok(Flow::Pause);
    };
    if !con.confirm(&format!("Delete {}? This cannot be undone", project.name))? {
        con.warn("Deletion cancelled")?;
        return Ok(Flow::Pause);
    }
    fs::remove_dir_all(&project.path)
        .with_context(|| format!("deleting {}", project.path.display()))?;
    info!(project = %project.name, ?kind, "project deleted");
    con.ok("Project deleted")?;
    Ok(Flow::Pause)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icons_follow_extension() {
        assert_eq!(file_icon(Path::new("src/App.JSX")), "[JS]");
        assert_eq!(file_icon(Path::new("main.py")), "[PY]");
        assert_eq!(file_icon(Path::new("Makefile")), "[FILE]");
    }

    #[test]
    fn unknown_template_choice_writes_readme() {
        let files = ProjectKind::Web.files_for("9", "site").unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].body.contains("Web Project Created with AeroNull"));
        let files = ProjectKind::Coding.files_for("1", "app").unwrap();
        assert!(files.iter().any(|f| f.path == "index.js"));
    }
}
