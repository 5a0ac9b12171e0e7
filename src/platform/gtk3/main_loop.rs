// ── gtk_main engine stand-in ──────────────────────────────────────────────────
//
// With a real browser engine the engine's loop pumps GTK.  Without one, this
// runs `gtk_main` directly so the host can be exercised on its own.

use std::cell::Cell;

use log::debug;

use super::window::{ensure_initialized, main_loop_running};
use crate::engine::BrowserEngine;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct GtkMainLoop {
    quit_requested: Cell<bool>,
}

impl GtkMainLoop {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BrowserEngine for GtkMainLoop {
    fn run_message_loop(&self) -> Result<()> {
        // gtk_main_quit is a no-op outside a running loop, so a quit that
        // arrived early is remembered here instead.
        if self.quit_requested.get() {
            return Ok(());
        }
        ensure_initialized("gtk_main")?;
        gtk::main();
        Ok(())
    }

    fn quit_message_loop(&self) -> Result<()> {
        self.quit_requested.set(true);
        if main_loop_running() {
            gtk::main_quit();
        }
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        debug!("gtk main loop finished; nothing to shut down");
        Ok(())
    }
}
