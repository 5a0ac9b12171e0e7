// ── Display error trap ────────────────────────────────────────────────────────
//
// Xlib's default handlers print the error and call exit().  Many protocol
// errors are harmless races between the toolkit and the browser engine
// (a window destroyed while a request for it is in flight, …), so the host
// replaces both handlers for the whole process:
//   • protocol errors are logged (debugging only) and ignored;
//   • I/O errors (connection loss) are ignored outright.
//
// The decision logic lives here and is pure; the `extern "C"` shims that Xlib
// actually calls live in `platform::gtk3::xlib` and forward to the installed
// `ErrorTrap`.

use std::borrow::Cow;
use std::sync::OnceLock;

use log::{debug, warn};

use crate::error::Result;

/// Handler return value telling Xlib to carry on.
pub const CONTINUE: i32 = 0;

/// Buffer size handed to `XGetErrorText`.
pub const ERROR_TEXT_LEN: usize = 160;

/// The parts of an `XErrorEvent` the trap looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolError {
    /// Major opcode of the failed request.
    pub request_code: i32,
    /// X error code (`BadWindow`, `BadMatch`, …).
    pub error_code: i32,
}

/// Process-wide error policy.  Installed once, during `Host::create_window`.
#[derive(Debug)]
pub struct ErrorTrap {
    debugging: bool,
}

static TRAP: OnceLock<ErrorTrap> = OnceLock::new();

impl ErrorTrap {
    pub fn new(debugging: bool) -> Self {
        Self { debugging }
    }

    /// Install the process-wide trap.
    ///
    /// `hook` performs the native handler registration and only runs the
    /// first time; later calls return the trap that is already in place.
    pub fn install(debugging: bool, hook: impl FnOnce() -> Result<()>) -> Result<&'static Self> {
        if let Some(trap) = TRAP.get() {
            debug!("display error trap already installed; keeping existing handlers");
            return Ok(trap);
        }
        hook()?;
        Ok(TRAP.get_or_init(|| Self::new(debugging)))
    }

    /// The installed trap, if any.
    pub fn current() -> Option<&'static Self> {
        TRAP.get()
    }

    pub fn debugging(&self) -> bool {
        self.debugging
    }

    /// Build the warning for `err`, or `None` when nothing should be logged.
    ///
    /// `error_text` is only consulted when a warning is produced.
    pub fn report(
        &self,
        err: &ProtocolError,
        error_text: impl FnOnce(i32) -> String,
    ) -> Option<String> {
        if !self.debugging || err.request_code <= 0 || err.error_code <= 0 {
            return None;
        }
        let text = error_text(err.error_code);
        Some(format!(
            "Request Code: {}\tRequest Type: {}\tError Code: {}\tX11 Error: {}",
            err.request_code,
            request_type(err.request_code),
            err.error_code,
            text
        ))
    }

    /// Protocol error handler body.  Always tells Xlib to continue.
    pub fn on_protocol_error(
        &self,
        err: &ProtocolError,
        error_text: impl FnOnce(i32) -> String,
    ) -> i32 {
        if let Some(message) = self.report(err, error_text) {
            warn!(target: "hearth::xerror", "{message}");
        }
        CONTINUE
    }

    /// I/O error handler body.
    ///
    /// Xlib treats the connection as dead after this returns; nothing is
    /// attempted here.
    pub fn on_io_error(&self) -> i32 {
        CONTINUE
    }
}

// ── Request labels ────────────────────────────────────────────────────────────

/// Core protocol request names, indexed by major opcode.  120–126 are unused.
const CORE_REQUESTS: [&str; 120] = [
    "",
    "CreateWindow",
    "ChangeWindowAttributes",
    "GetWindowAttributes",
    "DestroyWindow",
    "DestroySubwindows",
    "ChangeSaveSet",
    "ReparentWindow",
    "MapWindow",
    "MapSubwindows",
    "UnmapWindow",
    "UnmapSubwindows",
    "ConfigureWindow",
    "CirculateWindow",
    "GetGeometry",
    "QueryTree",
    "InternAtom",
    "GetAtomName",
    "ChangeProperty",
    "DeleteProperty",
    "GetProperty",
    "ListProperties",
    "SetSelectionOwner",
    "GetSelectionOwner",
    "ConvertSelection",
    "SendEvent",
    "GrabPointer",
    "UngrabPointer",
    "GrabButton",
    "UngrabButton",
    "ChangeActivePointerGrab",
    "GrabKeyboard",
    "UngrabKeyboard",
    "GrabKey",
    "UngrabKey",
    "AllowEvents",
    "GrabServer",
    "UngrabServer",
    "QueryPointer",
    "GetMotionEvents",
    "TranslateCoordinates",
    "WarpPointer",
    "SetInputFocus",
    "GetInputFocus",
    "QueryKeymap",
    "OpenFont",
    "CloseFont",
    "QueryFont",
    "QueryTextExtents",
    "ListFonts",
    "ListFontsWithInfo",
    "SetFontPath",
    "GetFontPath",
    "CreatePixmap",
    "FreePixmap",
    "CreateGC",
    "ChangeGC",
    "CopyGC",
    "SetDashes",
    "SetClipRectangles",
    "FreeGC",
    "ClearArea",
    "CopyArea",
    "CopyPlane",
    "PolyPoint",
    "PolyLine",
    "PolySegment",
    "PolyRectangle",
    "PolyArc",
    "FillPoly",
    "PolyFillRectangle",
    "PolyFillArc",
    "PutImage",
    "GetImage",
    "PolyText8",
    "PolyText16",
    "ImageText8",
    "ImageText16",
    "CreateColormap",
    "FreeColormap",
    "CopyColormapAndFree",
    "InstallColormap",
    "UninstallColormap",
    "ListInstalledColormaps",
    "AllocColor",
    "AllocNamedColor",
    "AllocColorCells",
    "AllocColorPlanes",
    "FreeColors",
    "StoreColors",
    "StoreNamedColor",
    "QueryColors",
    "LookupColor",
    "CreateCursor",
    "CreateGlyphCursor",
    "FreeCursor",
    "RecolorCursor",
    "QueryBestSize",
    "QueryExtension",
    "ListExtensions",
    "ChangeKeyboardMapping",
    "GetKeyboardMapping",
    "ChangeKeyboardControl",
    "GetKeyboardControl",
    "Bell",
    "ChangePointerControl",
    "GetPointerControl",
    "SetScreenSaver",
    "GetScreenSaver",
    "ChangeHosts",
    "ListHosts",
    "SetAccessControl",
    "SetCloseDownMode",
    "KillClient",
    "RotateProperties",
    "ForceScreenSaver",
    "SetPointerMapping",
    "GetPointerMapping",
    "SetModifierMapping",
    "GetModifierMapping",
];

const NO_OPERATION: i32 = 127;

/// Human-readable label for a request major opcode.
///
/// Opcodes above 127 belong to extensions and are only reported by number.
pub fn request_type(request_code: i32) -> Cow<'static, str> {
    match usize::try_from(request_code) {
        Ok(i @ 1..=119) => Cow::Borrowed(CORE_REQUESTS[i]),
        _ if request_code == NO_OPERATION => Cow::Borrowed("NoOperation"),
        _ => Cow::Owned(format!("Unknown request {request_code}")),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use log::Level;

    use super::*;
    use crate::testlog;

    fn err(request_code: i32, error_code: i32) -> ProtocolError {
        ProtocolError {
            request_code,
            error_code,
        }
    }

    #[test]
    fn quiet_when_not_debugging() {
        let trap = ErrorTrap::new(false);
        let lookups = Cell::new(0);
        for e in [err(12, 3), err(1, 8), err(0, 0), err(-4, 2), err(255, 255)] {
            let report = trap.report(&e, |_| {
                lookups.set(lookups.get() + 1);
                "BadWindow".to_owned()
            });
            assert_eq!(report, None);
            assert_eq!(trap.on_protocol_error(&e, |_| String::new()), CONTINUE);
        }
        assert_eq!(lookups.get(), 0, "error text must not be resolved");
    }

    #[test]
    fn non_positive_codes_are_ignored_even_when_debugging() {
        let trap = ErrorTrap::new(true);
        assert_eq!(trap.report(&err(0, 3), |_| "x".into()), None);
        assert_eq!(trap.report(&err(12, 0), |_| "x".into()), None);
        assert_eq!(trap.report(&err(-1, -1), |_| "x".into()), None);
        assert_eq!(trap.on_protocol_error(&err(0, 0), |_| "x".into()), CONTINUE);
    }

    #[test]
    fn debugging_reports_both_codes_once() {
        let trap = ErrorTrap::new(true);
        let lookups = Cell::new(0);
        let report = trap
            .report(&err(12, 3), |code| {
                lookups.set(lookups.get() + 1);
                assert_eq!(code, 3);
                "BadWindow (invalid Window parameter)".to_owned()
            })
            .expect("a warning");
        assert_eq!(lookups.get(), 1);
        assert_eq!(
            report,
            "Request Code: 12\tRequest Type: ConfigureWindow\tError Code: 3\t\
             X11 Error: BadWindow (invalid Window parameter)"
        );
        assert!(report.contains("Request Code: 12"));
        assert!(report.contains("Error Code: 3"));
    }

    #[test]
    fn protocol_errors_are_silent_without_debugging() {
        let trap = ErrorTrap::new(false);
        let (results, records) = testlog::capture(|| {
            [err(12, 3), err(1, 8), err(0, 0), err(255, 255)]
                .iter()
                .map(|e| trap.on_protocol_error(e, |_| "BadWindow".to_owned()))
                .collect::<Vec<_>>()
        });
        assert!(results.iter().all(|&r| r == CONTINUE));
        assert!(records.is_empty(), "logged: {records:?}");
    }

    #[test]
    fn protocol_error_logs_one_warning_when_debugging() {
        let trap = ErrorTrap::new(true);
        let (result, records) = testlog::capture(|| {
            trap.on_protocol_error(&err(12, 3), |_| "BadWindow".to_owned())
        });
        assert_eq!(result, CONTINUE);
        assert_eq!(records.len(), 1);
        assert_eq!(testlog::count(&records, Level::Warn, "hearth::xerror"), 1);
        assert!(records[0].message.contains("Request Code: 12"));
        assert!(records[0].message.contains("Error Code: 3"));
    }

    #[test]
    fn handlers_always_continue() {
        let trap = ErrorTrap::new(true);
        assert_eq!(trap.on_protocol_error(&err(42, 8), |_| "BadMatch".into()), CONTINUE);
        assert_eq!(trap.on_io_error(), CONTINUE);
    }

    #[test]
    fn request_labels() {
        assert_eq!(request_type(1), "CreateWindow");
        assert_eq!(request_type(42), "SetInputFocus");
        assert_eq!(request_type(119), "GetModifierMapping");
        assert_eq!(request_type(127), "NoOperation");
        assert_eq!(request_type(123), "Unknown request 123");
        assert_eq!(request_type(140), "Unknown request 140");
        assert_eq!(request_type(0), "Unknown request 0");
    }

    #[test]
    fn install_runs_the_native_hook_once() {
        let hooks = Cell::new(0);
        let first = ErrorTrap::install(true, || {
            hooks.set(hooks.get() + 1);
            Ok(())
        })
        .expect("install");
        let second = ErrorTrap::install(false, || {
            hooks.set(hooks.get() + 1);
            Ok(())
        })
        .expect("second install");
        assert!(std::ptr::eq(first, second));
        assert_eq!(hooks.get(), 1);
        assert!(ErrorTrap::current().is_some());
        assert!(first.debugging(), "first installation wins");
    }
}
