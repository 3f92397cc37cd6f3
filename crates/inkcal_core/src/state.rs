//! Display status file.
//!
//! # Responsibility
//! - Record when the panel was last drawn and with which view.
//!
//! # Invariants
//! - The file is pretty-printed JSON; parent directories are created on save.
//! - A missing file is not an error: `load_state` returns `Ok(None)`.

use crate::view::ViewKind;
use chrono::{DateTime, FixedOffset};
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// When the panel content was last refreshed.
    pub last_updated: DateTime<FixedOffset>,
    pub current_view: Option<ViewKind>,
    /// When this file was written.
    pub state_updated: DateTime<FixedOffset>,
}

#[derive(Debug)]
pub enum StateError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "state file `{}` I/O failed: {source}", path.display())
            }
            Self::Json(err) => write!(f, "invalid state file: {err}"),
        }
    }
}

impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for StateError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Writes the status file at `path`.
///
/// `last_updated` defaults to `now` when not given.
pub fn save_state(
    path: &Path,
    now: DateTime<FixedOffset>,
    last_updated: Option<DateTime<FixedOffset>>,
    current_view: Option<ViewKind>,
) -> Result<DisplayState, StateError> {
    let state = DisplayState {
        last_updated: last_updated.unwrap_or(now),
        current_view,
        state_updated: now,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StateError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let body = serde_json::to_string_pretty(&state)?;
    std::fs::write(path, body).map_err(|source| StateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "event=state_saved module=state status=ok path={} view={}",
        path.display(),
        current_view.map(ViewKind::as_str).unwrap_or("none")
    );
    Ok(state)
}

/// Reads the status file, or `Ok(None)` when it does not exist.
pub fn load_state(path: &Path) -> Result<Option<DisplayState>, StateError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(
                "event=state_load module=state status=absent path={}",
                path.display()
            );
            return Ok(None);
        }
        Err(source) => {
            return Err(StateError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok(Some(serde_json::from_str(&raw)?))
}
