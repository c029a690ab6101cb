//! Project scaffolds for the coding workspace and the web projects screen.
//!
//! File bodies are assembled with `TextLines`; `package.json` files are generated with
//! `serde_json` so project names are always escaped correctly.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::info;

use crate::util::fs::make_executable;
use crate::util::TextLines;
use crate::workspace::validate_entry_name;

/// Port every web template listens on.
pub const WEB_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct TemplateFile {
    /// Relative to the project directory; may contain one sub-directory.
    pub path: &'static str,
    pub body: String,
    pub executable: bool,
}

impl TemplateFile {
    fn text(path: &'static str, body: &TextLines) -> io::Result<Self> {
        Ok(Self {
            path,
            body: body.build()?,
            executable: false,
        })
    }

    fn json(path: &'static str, value: &serde_json::Value) -> io::Result<Self> {
        let mut body = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        body.push('\n');
        Ok(Self {
            path,
            body,
            executable: false,
        })
    }

    fn executable(mut self) -> Self {
        self.executable = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodingTemplate {
    Node,
    Python,
    Bash,
    StaticSite,
    ExpressApi,
    React,
    Empty,
}

impl CodingTemplate {
    pub const ALL: [CodingTemplate; 7] = [
        CodingTemplate::Node,
        CodingTemplate::Python,
        CodingTemplate::Bash,
        CodingTemplate::StaticSite,
        CodingTemplate::ExpressApi,
        CodingTemplate::React,
        CodingTemplate::Empty,
    ];

    /// `"1"`..`"7"`; anything else is `None` (the caller falls back to a bare README).
    pub fn from_choice(choice: &str) -> Option<Self> {
        let n: usize = choice.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            CodingTemplate::Node => "Node.js (JavaScript)",
            CodingTemplate::Python => "Python",
            CodingTemplate::Bash => "Bash Script",
            CodingTemplate::StaticSite => "HTML/CSS/JS",
            CodingTemplate::ExpressApi => "Express.js API",
            CodingTemplate::React => "React Project",
            CodingTemplate::Empty => "Empty Project",
        }
    }

    pub fn files(self, name: &str) -> io::Result<Vec<TemplateFile>> {
        match self {
            CodingTemplate::Node => Ok(vec![
                TemplateFile::text(
                    "index.js",
                    &TextLines::from_lines([
                        "console.log('Hello from AeroNull!');".to_string(),
                        String::new(),
                        "const main = () => {".to_string(),
                        format!("  console.log('Project: {}');", js_single(name)),
                        "  console.log('Running...');".to_string(),
                        "};".to_string(),
                        String::new(),
                        "main();".to_string(),
                    ]),
                )?,
                TemplateFile::json(
                    "package.json",
                    &json!({
                        "name": name,
                        "version": "1.0.0",
                        "main": "index.js",
                        "scripts": { "start": "node index.js", "dev": "nodemon index.js" }
                    }),
                )?,
            ]),
            CodingTemplate::Python => Ok(vec![
                TemplateFile::text(
                    "main.py",
                    &TextLines::from_lines([
                        "#!/usr/bin/env python3".to_string(),
                        String::new(),
                        "def main():".to_string(),
                        "    print('Hello from AeroNull!')".to_string(),
                        format!("    print('Project: {}')", js_single(name)),
                        "    print('Running...')".to_string(),
                        String::new(),
                        "if __name__ == '__main__':".to_string(),
                        "    main()".to_string(),
                    ]),
                )?,
                TemplateFile::text("requirements.txt", &TextLines::new())?,
            ]),
            CodingTemplate::Bash => Ok(vec![TemplateFile::text(
                "run.sh",
                &TextLines::from_lines([
                    "#!/bin/bash".to_string(),
                    String::new(),
                    "echo \"Hello from AeroNull!\"".to_string(),
                    format!("echo {}", crate::util::shell_escape(&format!("Project: {name}"))),
                    "echo \"Running...\"".to_string(),
                ]),
            )?
            .executable()]),
            CodingTemplate::StaticSite => Ok(vec![
                TemplateFile::text("index.html", &html_page(name, "AeroNull Project", false))?,
                TemplateFile::text("style.css", &gradient_css())?,
                TemplateFile::text(
                    "script.js",
                    &TextLines::from_lines([
                        format!("console.log('Hello from {}!');", js_single(name)),
                        String::new(),
                        "document.addEventListener('DOMContentLoaded', () => {".to_string(),
                        "  console.log('Page loaded successfully');".to_string(),
                        "});".to_string(),
                    ]),
                )?,
            ]),
            CodingTemplate::ExpressApi => Ok(vec![
                TemplateFile::text("server.js", &express_api(name))?,
                express_package(name)?,
            ]),
            CodingTemplate::React => react_files(name, false),
            CodingTemplate::Empty => Ok(vec![TemplateFile::text(
                "README.md",
                &TextLines::from_lines([
                    format!("# {name}"),
                    String::new(),
                    format!("Created with AeroNull Project Runner v{}", env!("CARGO_PKG_VERSION")),
                    String::new(),
                    "## Getting Started".to_string(),
                    String::new(),
                    "Add your files and start coding!".to_string(),
                ]),
            )?]),
        }
    }
}

/// Scaffold written for an unrecognized coding template choice.
pub fn fallback_readme(name: &str) -> io::Result<Vec<TemplateFile>> {
    Ok(vec![TemplateFile::text(
        "README.md",
        &TextLines::from_lines([
            format!("# {name}"),
            String::new(),
            format!("Created with AeroNull Project Runner v{}", env!("CARGO_PKG_VERSION")),
        ]),
    )?])
}

/// Scaffold written for an unrecognized web template choice.
pub fn web_fallback_readme(name: &str) -> io::Result<Vec<TemplateFile>> {
    Ok(vec![TemplateFile::text(
        "README.md",
        &TextLines::from_lines([
            format!("# {name}"),
            String::new(),
            "Web Project Created with AeroNull".to_string(),
        ]),
    )?])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebTemplate {
    Basic,
    Express,
    React,
    Static,
    Api,
}

impl WebTemplate {
    pub const ALL: [WebTemplate; 5] = [
        WebTemplate::Basic,
        WebTemplate::Express,
        WebTemplate::React,
        WebTemplate::Static,
        WebTemplate::Api,
    ];

    pub fn from_choice(choice: &str) -> Option<Self> {
        let n: usize = choice.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            WebTemplate::Basic => "Basic HTML/CSS/JS",
            WebTemplate::Express => "Express.js Server",
            WebTemplate::React => "React App",
            WebTemplate::Static => "Static Website",
            WebTemplate::Api => "API Server",
        }
    }

    pub fn files(self, name: &str) -> io::Result<Vec<TemplateFile>> {
        match self {
            WebTemplate::Basic => Ok(vec![
                TemplateFile::text("index.html", &html_page(name, "AeroNull Web Project", true))?,
                TemplateFile::text("style.css", &gradient_css())?,
                TemplateFile::text(
                    "script.js",
                    &TextLines::from_lines([
                        format!("console.log('{} loaded!');", js_single(name)),
                        String::new(),
                        "document.getElementById('clickBtn').addEventListener('click', function() {"
                            .to_string(),
                        "  this.textContent = 'Clicked!';".to_string(),
                        "  setTimeout(() => { this.textContent = 'Click Me!'; }, 1000);".to_string(),
                        "});".to_string(),
                    ]),
                )?,
                TemplateFile::text("server.js", &static_server(&["index.html", "style.css", "script.js"]))?,
                node_package(name, "server.js")?,
            ]),
            WebTemplate::Express => Ok(vec![
                TemplateFile::text(
                    "server.js",
                    &TextLines::from_lines([
                        "const express = require('express');".to_string(),
                        "const app = express();".to_string(),
                        format!("const PORT = {WEB_PORT};"),
                        String::new(),
                        "app.use(express.json());".to_string(),
                        "app.use(express.static('public'));".to_string(),
                        String::new(),
                        "app.get('/', (req, res) => {".to_string(),
                        format!(
                            "  res.send('<h1>{}</h1><p>Express.js Server Running on Port {WEB_PORT}</p>');",
                            js_single(&html_escape(name))
                        ),
                        "});".to_string(),
                        String::new(),
                        "app.get('/api/info', (req, res) => {".to_string(),
                        format!(
                            "  res.json({{ project: '{}', server: 'Express.js', port: PORT, status: 'running' }});",
                            js_single(name)
                        ),
                        "});".to_string(),
                        String::new(),
                        "app.listen(PORT, () => {".to_string(),
                        "  console.log(`Server running on port ${PORT}`);".to_string(),
                        "});".to_string(),
                    ]),
                )?,
                express_package(name)?,
            ]),
            WebTemplate::React => react_files(name, true),
            WebTemplate::Static => Ok(vec![
                TemplateFile::text("index.html", &html_page(name, "Static Website Created with AeroNull", false))?,
                TemplateFile::text("style.css", &gradient_css())?,
                TemplateFile::text("server.js", &static_server(&["index.html", "style.css"]))?,
                node_package(name, "server.js")?,
            ]),
            WebTemplate::Api => Ok(vec![
                TemplateFile::text("server.js", &users_api(name))?,
                express_package(name)?,
            ]),
        }
    }
}

/// Create `<parent>/<name>` and write `files` into it. Refuses an existing project.
pub fn create_project(parent: &Path, name: &str, files: &[TemplateFile]) -> io::Result<PathBuf> {
    let name = validate_entry_name(name)?;
    let dir = parent.join(name);
    if dir.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("project {name} already exists"),
        ));
    }
    fs::create_dir_all(&dir)?;
    for f in files {
        let path = dir.join(f.path);
        if let Some(p) = path.parent() {
            fs::create_dir_all(p)?;
        }
        fs::write(&path, &f.body)?;
        if f.executable {
            make_executable(&path)?;
        }
    }
    info!(project = name, files = files.len(), "project created");
    Ok(dir)
}

fn js_single(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn html_page(name: &str, tagline: &str, with_button: bool) -> TextLines {
    let title = html_escape(name);
    let mut t = TextLines::new();
    t.push("<!DOCTYPE html>")
        .push("<html lang=\"en\">")
        .push("<head>")
        .push("  <meta charset=\"UTF-8\">")
        .push("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")
        .push(format!("  <title>{title}</title>"))
        .push("  <link rel=\"stylesheet\" href=\"style.css\">")
        .push("</head>")
        .push("<body>")
        .push("  <div class=\"container\">")
        .push(format!("    <h1>{title}</h1>"))
        .push(format!("    <p>{tagline}</p>"));
    if with_button {
        t.push("    <button id=\"clickBtn\">Click Me!</button>");
    }
    t.push("  </div>");
    if with_button {
        t.push("  <script src=\"script.js\"></script>");
    }
    t.push("</body>").push("</html>");
    t
}

fn gradient_css() -> TextLines {
    TextLines::from_lines([
        "* { margin: 0; padding: 0; box-sizing: border-box; }",
        "",
        "body {",
        "  font-family: Arial, sans-serif;",
        "  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);",
        "  color: white;",
        "  min-height: 100vh;",
        "  display: flex;",
        "  justify-content: center;",
        "  align-items: center;",
        "}",
        "",
        ".container { text-align: center; padding: 40px; }",
        "h1 { font-size: 3rem; margin-bottom: 20px; }",
        "p { font-size: 1.5rem; margin-bottom: 30px; }",
        "button { padding: 15px 30px; border: none; border-radius: 50px; cursor: pointer; }",
    ])
}

/// Plain `http` server for a fixed set of files (no directory traversal possible).
fn static_server(files: &[&str]) -> TextLines {
    let list = files
        .iter()
        .map(|f| format!("'/{f}'"))
        .collect::<Vec<_>>()
        .join(", ");
    TextLines::from_lines([
        "const http = require('http');".to_string(),
        "const fs = require('fs');".to_string(),
        "const path = require('path');".to_string(),
        String::new(),
        format!("const FILES = new Set([{list}]);"),
        "const TYPES = { '.html': 'text/html', '.css': 'text/css', '.js': 'text/javascript' };"
            .to_string(),
        String::new(),
        "const server = http.createServer((req, res) => {".to_string(),
        "  const url = req.url === '/' ? '/index.html' : req.url;".to_string(),
        "  if (!FILES.has(url)) {".to_string(),
        "    res.writeHead(404);".to_string(),
        "    return res.end('File not found');".to_string(),
        "  }".to_string(),
        "  fs.readFile(path.join(__dirname, url), (err, content) => {".to_string(),
        "    if (err) {".to_string(),
        "      res.writeHead(404);".to_string(),
        "      return res.end('File not found');".to_string(),
        "    }".to_string(),
        "    res.writeHead(200, { 'Content-Type': TYPES[path.extname(url)] || 'text/plain' });"
            .to_string(),
        "    res.end(content);".to_string(),
        "  });".to_string(),
        "});".to_string(),
        String::new(),
        format!("const PORT = {WEB_PORT};"),
        "server.listen(PORT, () => {".to_string(),
        "  console.log(`Server running at http://localhost:${PORT}`);".to_string(),
        "});".to_string(),
    ])
}

fn express_api(name: &str) -> TextLines {
    TextLines::from_lines([
        "const express = require('express');".to_string(),
        "const app = express();".to_string(),
        format!("const PORT = process.env.PORT || {WEB_PORT};"),
        String::new(),
        "app.use(express.json());".to_string(),
        "app.use(express.urlencoded({ extended: true }));".to_string(),
        String::new(),
        "app.get('/', (req, res) => {".to_string(),
        format!(
            "  res.json({{ message: 'AeroNull API', project: '{}', status: 'running' }});",
            js_single(name)
        ),
        "});".to_string(),
        String::new(),
        "app.get('/api/health', (req, res) => {".to_string(),
        "  res.json({ status: 'OK', timestamp: new Date() });".to_string(),
        "});".to_string(),
        String::new(),
        "app.listen(PORT, () => {".to_string(),
        "  console.log(`Server running on port ${PORT}`);".to_string(),
        "});".to_string(),
    ])
}

fn users_api(name: &str) -> TextLines {
    TextLines::from_lines([
        "const express = require('express');".to_string(),
        "const app = express();".to_string(),
        format!("const PORT = {WEB_PORT};"),
        String::new(),
        "app.use(express.json());".to_string(),
        String::new(),
        "let users = [".to_string(),
        "  { id: 1, name: 'John Doe', email: 'john@example.com' },".to_string(),
        "  { id: 2, name: 'Jane Smith', email: 'jane@example.com' }".to_string(),
        "];".to_string(),
        String::new(),
        "app.get('/', (req, res) => {".to_string(),
        format!(
            "  res.json({{ message: '{} API Server', endpoints: ['GET /api/users', 'POST /api/users', 'GET /api/users/:id', 'PUT /api/users/:id', 'DELETE /api/users/:id'] }});",
            js_single(name)
        ),
        "});".to_string(),
        String::new(),
        "app.get('/api/users', (req, res) => res.json(users));".to_string(),
        String::new(),
        "app.get('/api/users/:id', (req, res) => {".to_string(),
        "  const user = users.find(u => u.id === parseInt(req.params.id));".to_string(),
        "  if (!user) return res.status(404).json({ error: 'User not found' });".to_string(),
        "  res.json(user);".to_string(),
        "});".to_string(),
        String::new(),
        "app.post('/api/users', (req, res) => {".to_string(),
        "  const user = { id: users.length + 1, name: req.body.name, email: req.body.email };"
            .to_string(),
        "  users.push(user);".to_string(),
        "  res.status(201).json(user);".to_string(),
        "});".to_string(),
        String::new(),
        "app.put('/api/users/:id', (req, res) => {".to_string(),
        "  const user = users.find(u => u.id === parseInt(req.params.id));".to_string(),
        "  if (!user) return res.status(404).json({ error: 'User not found' });".to_string(),
        "  user.name = req.body.name || user.name;".to_string(),
        "  user.email = req.body.email || user.email;".to_string(),
        "  res.json(user);".to_string(),
        "});".to_string(),
        String::new(),
        "app.delete('/api/users/:id', (req, res) => {".to_string(),
        "  const index = users.findIndex(u => u.id === parseInt(req.params.id));".to_string(),
        "  if (index === -1) return res.status(404).json({ error: 'User not found' });".to_string(),
        "  users.splice(index, 1);".to_string(),
        "  res.json({ message: 'User deleted' });".to_string(),
        "});".to_string(),
        String::new(),
        "app.listen(PORT, () => {".to_string(),
        "  console.log(`API Server running on port ${PORT}`);".to_string(),
        "});".to_string(),
    ])
}

fn react_files(name: &str, counter: bool) -> io::Result<Vec<TemplateFile>> {
    let mut app = TextLines::new();
    if counter {
        app.push("import React, { useState } from 'react';");
    } else {
        app.push("import React from 'react';");
    }
    app.push("import './App.css';").push("").push("function App() {");
    if counter {
        app.push("  const [count, setCount] = useState(0);").push("");
    }
    app.push("  return (")
        .push("    <div className=\"App\">")
        .push("      <header className=\"App-header\">")
        .push(format!("        <h1>{}</h1>", html_escape(name)));
    if counter {
        app.push(format!("        <p>React App on Port {WEB_PORT}</p>"))
            .push("        <div className=\"counter\">")
            .push("          <button onClick={() => setCount(count - 1)}>-</button>")
            .push("          <span>{count}</span>")
            .push("          <button onClick={() => setCount(count + 1)}>+</button>")
            .push("        </div>");
    }
    app.push("      </header>")
        .push("    </div>")
        .push("  );")
        .push("}")
        .push("")
        .push("export default App;");

    let css = TextLines::from_lines([
        ".App { text-align: center; }",
        "",
        ".App-header {",
        "  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);",
        "  min-height: 100vh;",
        "  display: flex;",
        "  flex-direction: column;",
        "  align-items: center;",
        "  justify-content: center;",
        "  color: white;",
        "}",
        "",
        ".counter { display: flex; gap: 20px; margin-top: 20px; }",
    ]);

    let index_js = TextLines::from_lines([
        "import React from 'react';",
        "import ReactDOM from 'react-dom/client';",
        "import App from './App';",
        "",
        "const root = ReactDOM.createRoot(document.getElementById('root'));",
        "root.render(<App />);",
    ]);

    let index_html = TextLines::from_lines([
        "<!DOCTYPE html>".to_string(),
        "<html lang=\"en\">".to_string(),
        "<head>".to_string(),
        "  <meta charset=\"utf-8\" />".to_string(),
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />".to_string(),
        format!("  <title>{}</title>", html_escape(name)),
        "</head>".to_string(),
        "<body>".to_string(),
        "  <div id=\"root\"></div>".to_string(),
        "</body>".to_string(),
        "</html>".to_string(),
    ]);

    Ok(vec![
        TemplateFile::text("src/App.js", &app)?,
        TemplateFile::text("src/App.css", &css)?,
        TemplateFile::text("src/index.js", &index_js)?,
        TemplateFile::text("public/index.html", &index_html)?,
        TemplateFile::json(
            "package.json",
            &json!({
                "name": name,
                "version": "1.0.0",
                "private": true,
                "dependencies": {
                    "react": "^18.2.0",
                    "react-dom": "^18.2.0",
                    "react-scripts": "5.0.1"
                },
                "scripts": { "start": "react-scripts start", "build": "react-scripts build" }
            }),
        )?,
    ])
}

fn node_package(name: &str, main: &str) -> io::Result<TemplateFile> {
    TemplateFile::json(
        "package.json",
        &json!({
            "name": name,
            "version": "1.0.0",
            "main": main,
            "scripts": { "start": format!("node {main}") }
        }),
    )
}

fn express_package(name: &str) -> io::Result<TemplateFile> {
    TemplateFile::json(
        "package.json",
        &json!({
            "name": name,
            "version": "1.0.0",
            "main": "server.js",
            "scripts": { "start": "node server.js", "dev": "nodemon server.js" },
            "dependencies": { "express": "^4.18.2" }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_map_to_templates() {
        assert_eq!(CodingTemplate::from_choice("1"), Some(CodingTemplate::Node));
        assert_eq!(CodingTemplate::from_choice(" 7 "), Some(CodingTemplate::Empty));
        assert_eq!(CodingTemplate::from_choice("0"), None);
        assert_eq!(CodingTemplate::from_choice("8"), None);
        assert_eq!(WebTemplate::from_choice("5"), Some(WebTemplate::Api));
        assert_eq!(WebTemplate::from_choice("x"), None);
    }

    #[test]
    fn every_web_template_has_a_server_on_port_3000() {
        for t in WebTemplate::ALL {
            let files = t.files("demo").unwrap();
            let all: String = files.iter().map(|f| f.body.as_str()).collect();
            assert!(files.iter().any(|f| f.path == "package.json"), "{t:?}");
            if t != WebTemplate::React {
                assert!(files.iter().any(|f| f.path == "server.js"), "{t:?}");
                assert!(all.contains("3000"), "{t:?}");
            }
        }
    }

    #[test]
    fn package_json_escapes_names() {
        let files = CodingTemplate::Node.files("we\"ird").unwrap();
        let pkg = files.iter().find(|f| f.path == "package.json").unwrap();
        let v: serde_json::Value = serde_json::from_str(&pkg.body).unwrap();
        assert_eq!(v["name"], "we\"ird");
    }

    #[test]
    fn create_project_writes_nested_files_and_refuses_duplicates() {
        let td = tempfile::tempdir().unwrap();
        let files = CodingTemplate::React.files("app").unwrap();
        let dir = create_project(td.path(), "app", &files).unwrap();
        assert!(dir.join("src/App.js").is_file());
        assert!(dir.join("public/index.html").is_file());
        let err = create_project(td.path(), "app", &files).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[cfg(unix)]
    #[test]
    fn bash_template_is_executable() {
        use std::os::unix::fs::PermissionsExt;
        let td = tempfile::tempdir().unwrap();
        let files = CodingTemplate::Bash.files("tool").unwrap();
        let dir = create_project(td.path(), "tool", &files).unwrap();
        let mode = fs::metadata(dir.join("run.sh")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn fallback_is_a_readme() {
        let files = fallback_readme("x").unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].body.starts_with("# x\n"));
    }
}
