use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Ensure a file exists by creating parent directories as needed.
pub fn ensure_file_exists(p: &Path) -> io::Result<()> {
    if !p.exists() {
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::File::create(p)?;
    }
    Ok(())
}

/// Total size in bytes of all regular files below `dir`; 0 when absent.
pub fn dir_size(dir: &Path) -> u64 {
    if !dir.exists() {
        return 0;
    }
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// Regular files below `dir`, sorted, as absolute paths.
pub fn files_under(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::other)?;
        if entry.file_type().is_file() {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

/// Names of the immediate sub-directories of `dir`, sorted. Missing dir yields empty.
pub fn subdirs(dir: &Path) -> Vec<String> {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = rd
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

/// Remove a directory tree and recreate it empty. Returns false when it did not exist.
pub fn reset_dir(dir: &Path) -> io::Result<bool> {
    let existed = dir.exists();
    if existed {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;
    Ok(existed)
}

/// Empty `dir` like `reset_dir`, but truncate the file named `keep` in place instead of
/// removing it. Writers holding it open in append mode keep logging into the same file.
pub fn reset_dir_keeping(dir: &Path, keep: &str) -> io::Result<bool> {
    let existed = dir.exists();
    std::fs::create_dir_all(dir)?;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let ft = entry.file_type()?;
        if ft.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else if ft.is_file() && entry.file_name() == keep {
            std::fs::OpenOptions::new().write(true).open(&path)?.set_len(0)?;
        } else {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(existed)
}

/// Path of `p` relative to `base` for display; falls back to `p` itself.
pub fn display_relative(p: &Path, base: &Path) -> String {
    p.strip_prefix(base).unwrap_or(p).display().to_string()
}

#[cfg(unix)]
pub fn make_executable(p: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(p, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
pub fn make_executable(_p: &Path) -> io::Result<()> {
    Ok(())
}
