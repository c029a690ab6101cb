//! Persisted remote-host records.
//!
//! The store is a pretty-printed JSON array at a fixed path. Every mutation reads the full set,
//! changes it in memory and writes the full set back; the session lock guarantees a single
//! writer.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::StoreError;

pub const STORE_FILE_NAME: &str = ".vps_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteHost {
    pub name: String,
    pub host: String,
    pub username: String,
    /// Stored in the clear.
    #[serde(rename = "password")]
    pub secret: String,
    #[serde(rename = "added")]
    pub added_at: String,
}

impl RemoteHost {
    /// Build a record, enforcing non-empty host and username.
    pub fn new(host: &str, username: &str, secret: &str) -> Result<Self, StoreError> {
        let host = host.trim();
        let username = username.trim();
        if host.is_empty() {
            return Err(StoreError::Invalid("host must not be empty".to_string()));
        }
        if username.is_empty() {
            return Err(StoreError::Invalid("username must not be empty".to_string()));
        }
        Ok(Self {
            name: display_name(username, host),
            host: host.to_string(),
            username: username.to_string(),
            secret: secret.to_string(),
            added_at: humantime::format_rfc3339_millis(SystemTime::now()).to_string(),
        })
    }

    /// `user@host` as used by ssh and scp.
    pub fn destination(&self) -> String {
        format!("{}@{}", self.username, self.host)
    }
}

pub fn display_name(username: &str, host: &str) -> String {
    format!("ssh {username}@{host}")
}

#[derive(Debug, Clone)]
pub struct HostStore {
    path: PathBuf,
}

impl HostStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the conventional location below a workspace root.
    pub fn in_root(root: &Path) -> Self {
        Self::new(root.join(STORE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in insertion order. An absent file is an empty store.
    pub fn load(&self) -> Result<Vec<RemoteHost>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, hosts: &[RemoteHost]) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(hosts).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, body).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(count = hosts.len(), path = %self.path.display(), "host store saved");
        Ok(())
    }

    pub fn add(&self, host: &str, username: &str, secret: &str) -> Result<RemoteHost, StoreError> {
        let record = RemoteHost::new(host, username, secret)?;
        let mut hosts = self.load()?;
        hosts.push(record.clone());
        self.save(&hosts)?;
        Ok(record)
    }

    /// Remove the record at `index` (0-based) and return it.
    pub fn remove(&self, index: usize) -> Result<RemoteHost, StoreError> {
        let mut hosts = self.load()?;
        if index >= hosts.len() {
            return Err(StoreError::Invalid(format!(
                "no host #{} (have {})",
                index + 1,
                hosts.len()
            )));
        }
        let removed = hosts.remove(index);
        self.save(&hosts)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_rejects_blank_host_and_username() {
        assert!(matches!(RemoteHost::new("  ", "root", "x"), Err(StoreError::Invalid(_))));
        assert!(matches!(RemoteHost::new("10.0.0.5", "", "x"), Err(StoreError::Invalid(_))));
    }

    #[test]
    fn record_trims_and_names() {
        let r = RemoteHost::new(" 10.0.0.5 ", " root ", "x").unwrap();
        assert_eq!(r.host, "10.0.0.5");
        assert_eq!(r.username, "root");
        assert_eq!(r.name, "ssh root@10.0.0.5");
        assert_eq!(r.destination(), "root@10.0.0.5");
        assert!(humantime::parse_rfc3339(&r.added_at).is_ok());
    }

    #[test]
    fn serialized_keys_match_the_config_file_format() {
        let r = RemoteHost::new("h", "u", "s").unwrap();
        let v = serde_json::to_value(&r).unwrap();
        for key in ["name", "host", "username", "password", "added"] {
            assert!(v.get(key).is_some(), "missing key {key}: {v}");
        }
    }

    #[test]
    fn whitespace_only_file_is_empty() {
        let td = tempfile::tempdir().unwrap();
        let store = HostStore::in_root(td.path());
        fs::write(store.path(), "  \n").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn remove_out_of_range_is_invalid_and_keeps_file() {
        let td = tempfile::tempdir().unwrap();
        let store = HostStore::in_root(td.path());
        store.add("10.0.0.5", "root", "x").unwrap();
        assert!(matches!(store.remove(3), Err(StoreError::Invalid(_))));
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
