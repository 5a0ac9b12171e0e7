// ── Platform layer ────────────────────────────────────────────────────────────
//
// Native implementations of `Toolkit` and `BrowserEngine`.  No `unsafe` lives
// here; all GTK / Xlib FFI is confined to the `gtk3` sub-module and never
// leaks outward.

#[cfg(feature = "gtk3")]
pub mod gtk3;
