// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::gtk3` (GTK, GDK-X11
// and Xlib FFI).  Each unsafe block in that module MUST carry a `// SAFETY:`
// comment.
#![deny(unsafe_code)]

//! Hearth: a native top-level window for an embedded browser engine.
//!
//! [`Host`] creates the window, translates the toolkit's realize / resize /
//! configure / delete signals into four lifecycle events and hands the
//! engine the X11 window id it renders into.  Display-protocol errors that
//! would otherwise terminate the process are trapped and logged
//! ([`xerror`]).
//!
//! The native backend lives in `platform::gtk3` behind the `gtk3` feature;
//! everything else is portable and driven through the [`Toolkit`] and
//! [`BrowserEngine`] traits.

pub mod engine;
pub mod error;
pub mod events;
pub mod host;
pub mod options;
pub mod platform;
pub mod signals;
#[cfg(test)]
mod testlog;
pub mod toolkit;
pub mod xerror;

pub use engine::BrowserEngine;
pub use error::{HostError, Result};
pub use events::{CreatedEvent, HostEvents, LifecycleEvent};
pub use host::{Host, Lifecycle};
pub use options::{WindowOptions, WindowState};
pub use toolkit::{MessageType, NativeWindowId, Size, Toolkit};
