// ── GTK 3 / X11 platform implementation ───────────────────────────────────────
//
// This is the only module in the crate where `unsafe` code is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Everything here must run on the thread that called `gtk::init`.

#![allow(unsafe_code)]

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub mod dialogs; // modal message dialogs
pub mod main_loop; // engine stand-in that drives gtk_main directly
pub mod window; // `Toolkit` over GtkWindow + GDK-X11

pub(crate) mod xlib; // process-wide Xlib error handlers

pub use main_loop::GtkMainLoop;
pub use window::GtkToolkit;
