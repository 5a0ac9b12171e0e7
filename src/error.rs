// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in Hearth return `error::Result<T>`.  Nothing here
// reaches the application layer: the `Host` facade logs every failure and
// degrades to a safe default (see `log_failure` and `or_default` in `host`).

use crate::toolkit::NativeWindowId;

/// Every error that Hearth can produce.
#[derive(Debug)]
pub enum HostError {
    /// A native toolkit, display or engine call reported a failure.
    Native {
        /// The name of the failing call, for display purposes.
        function: &'static str,
        /// Whatever the native layer told us about the failure.
        detail: String,
    },

    /// A native call returned a null handle or a zero identifier.
    NullHandle {
        /// The call that produced the null value.
        function: &'static str,
    },

    /// A standard I/O error (options file open, read, …).
    Io(std::io::Error),

    /// The window options file is not valid JSON for `WindowOptions`.
    Config(serde_json::Error),
}

impl HostError {
    /// Shorthand for a `Native` error.
    pub fn native(function: &'static str, detail: impl Into<String>) -> Self {
        Self::Native {
            function,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native { function, detail } => write!(f, "{function} failed: {detail}"),
            Self::NullHandle { function } => write!(f, "{function} returned a null handle"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Config(e) => write!(f, "invalid window options: {e}"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Native { .. } | Self::NullHandle { .. } => None,
        }
    }
}

impl From<std::io::Error> for HostError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for HostError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e)
    }
}

// glib reports failures either as a GError (icon loading, …) or as a plain
// boolean failure with a message (gtk_init, …).  Both collapse into `Native`.
#[cfg(feature = "gtk3")]
impl From<gtk::glib::Error> for HostError {
    fn from(e: gtk::glib::Error) -> Self {
        Self::native("glib", e.message())
    }
}

#[cfg(feature = "gtk3")]
impl From<gtk::glib::BoolError> for HostError {
    fn from(e: gtk::glib::BoolError) -> Self {
        Self::native("glib", e.message.to_string())
    }
}

/// Fail with `NullHandle` when `id` is the null sentinel.
pub fn ensure_not_null(function: &'static str, id: NativeWindowId) -> Result<NativeWindowId> {
    if id.is_null() {
        Err(HostError::NullHandle { function })
    } else {
        Ok(id)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HostError>;

// ── Tests ─────────────────────────────────────────────────────────────────────
