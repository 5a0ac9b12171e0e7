// ── Embedded browser engine ───────────────────────────────────────────────────
//
// The host consumes exactly three calls from the engine.  The engine's own
// message loop also pumps the toolkit's events, so `run_message_loop` is the
// one blocking call of the whole process.

use crate::error::Result;

/// Loop control surface of the embedded browser engine.
pub trait BrowserEngine {
    /// Run the shared message loop until `quit_message_loop` is called.
    fn run_message_loop(&self) -> Result<()>;

    /// Ask the message loop to return.  Does not wait for it.
    fn quit_message_loop(&self) -> Result<()>;

    /// Release engine resources after the loop has returned.
    fn shutdown(&self) -> Result<()>;
}
