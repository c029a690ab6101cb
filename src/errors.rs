//! Error mapping guide:
//! - Map io::ErrorKind::NotFound to exit code 127; all other startup failures to 1.
//! - `StoreError` covers the host configuration file; callers show it and fall back to an
//!   empty host list.
//! - `InputClosed` marks the end of operator input; the navigator ends the session on it.
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Map an io::Error to a process exit code:
/// - 127 for NotFound
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, source } => {
                write!(f, "cannot access {}: {source}", path.display())
            }
            StoreError::Parse { path, source } => {
                write!(f, "cannot parse {}: {source}", path.display())
            }
            StoreError::Invalid(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Parse { source, .. } => Some(source),
            StoreError::Invalid(_) => None,
        }
    }
}

/// Operator input reached end-of-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputClosed;

impl fmt::Display for InputClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operator input closed")
    }
}

impl std::error::Error for InputClosed {}

/// True when `err` (or anything in its chain) is `InputClosed`.
pub fn is_input_closed(err: &anyhow::Error) -> bool {
    err.chain().any(|e| e.downcast_ref::<InputClosed>().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_127() {
        let e = io::Error::new(io::ErrorKind::NotFound, "x");
        assert_eq!(exit_code_for_io_error(&e), 127);
        let e = io::Error::new(io::ErrorKind::PermissionDenied, "x");
        assert_eq!(exit_code_for_io_error(&e), 1);
    }

    #[test]
    fn input_closed_is_found_through_context() {
        let err = anyhow::Error::new(InputClosed).context("reading host index");
        assert!(is_input_closed(&err));
        assert!(!is_input_closed(&anyhow::anyhow!("other")));
    }

    #[test]
    fn store_error_display_names_the_file() {
        let e = StoreError::Io {
            path: PathBuf::from("/tmp/.vps_config.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/tmp/.vps_config.json"));
    }
}
