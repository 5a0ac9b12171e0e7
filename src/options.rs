// ── Window options ────────────────────────────────────────────────────────────
//
// The caller-supplied description of the window to create.  Read once by
// `Host::create_window` and never mutated afterwards.
// No `unsafe` — pure safe Rust + serde_json.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::toolkit::Size;

// ── Defaults ──────────────────────────────────────────────────────────────────

const DEFAULT_TITLE: &str = "hearth";
const DEFAULT_WIDTH: i32 = 1200;
const DEFAULT_HEIGHT: i32 = 900;

// ── Types ─────────────────────────────────────────────────────────────────────

/// Initial state requested for the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Normal,
    Maximized,
    Fullscreen,
}

/// Everything the application layer decides about the host window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    pub title: String,
    /// Default size in device-independent units.
    pub size: Size,
    pub state: WindowState,
    /// Frameless windows are created as popups (no decorations).
    pub frameless: bool,
    /// Only honoured when `state` is `Normal`.
    pub start_centered: bool,
    /// Icon file, absolute or relative to the executable directory.
    pub icon: Option<PathBuf>,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_owned(),
            size: Size::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            state: WindowState::Normal,
            frameless: false,
            start_centered: true,
            icon: None,
        }
    }
}

impl WindowOptions {
    /// Parse options from JSON.  Missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse an options file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Whether the window should be centred on screen at creation.
    pub fn wants_centering(&self) -> bool {
        self.state == WindowState::Normal && self.start_centered
    }
}

// ── Icon resolution ───────────────────────────────────────────────────────────

/// Resolve an icon path to an existing file.
///
/// Relative paths are tried against the executable directory first, then the
/// working directory.  Returns `None` when nothing usable is found.
pub fn icon_full_path(path: &Path) -> Option<PathBuf> {
    if path.as_os_str().to_string_lossy().trim().is_empty() {
        return None;
    }

    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();

    exe_dir
        .into_iter()
        .chain(cwd)
        .map(|base| base.join(path))
        .find(|candidate| candidate.is_file())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
