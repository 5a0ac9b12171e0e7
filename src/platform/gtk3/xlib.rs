// ── Xlib error handlers ───────────────────────────────────────────────────────
//
// The two `extern "C"` shims Xlib calls on protocol and I/O errors.  They do
// no work of their own: the policy lives in `xerror::ErrorTrap`.
//
// Install after GTK is initialised so GDK's own handler setup does not
// overwrite ours.

#![allow(unsafe_code)]

use std::os::raw::{c_char, c_int};

use x11::xlib;

use crate::xerror::{ErrorTrap, ProtocolError, CONTINUE, ERROR_TEXT_LEN};

/// Replace Xlib's default (process-terminating) error handlers.
pub(crate) fn install_handlers() {
    // SAFETY: XSetErrorHandler / XSetIOErrorHandler only swap a process-global
    // function pointer; no display connection is required.  Both handlers are
    // `'static` functions with the exact signatures Xlib expects.  The
    // previous handlers are intentionally discarded.
    unsafe {
        let _ = xlib::XSetErrorHandler(Some(on_protocol_error));
        let _ = xlib::XSetIOErrorHandler(Some(on_io_error));
    }
}

// SAFETY: called by Xlib on the thread that issued the failing request.
// `display` and `event` are valid for the duration of the call.  Must not
// unwind: nothing below panics.
unsafe extern "C" fn on_protocol_error(
    display: *mut xlib::Display,
    event: *mut xlib::XErrorEvent,
) -> c_int {
    let Some(trap) = ErrorTrap::current() else {
        return CONTINUE;
    };
    if event.is_null() {
        return CONTINUE;
    }

    // SAFETY: `event` is non-null and points at the XErrorEvent Xlib is
    // reporting; we only read two byte fields.
    let (request_code, error_code) = unsafe { ((*event).request_code, (*event).error_code) };
    let err = ProtocolError {
        request_code: i32::from(request_code),
        error_code: i32::from(error_code),
    };

    trap.on_protocol_error(&err, |code| error_text(display, code))
}

// SAFETY: called by Xlib after the display connection is lost.  Xlib exits
// the process if this returns; we accept that rather than tear down here.
unsafe extern "C" fn on_io_error(_display: *mut xlib::Display) -> c_int {
    ErrorTrap::current().map_or(CONTINUE, ErrorTrap::on_io_error)
}

/// Ask Xlib for the text of error `code`.
fn error_text(display: *mut xlib::Display, code: i32) -> String {
    let mut buf = [0 as c_char; ERROR_TEXT_LEN];

    // SAFETY: `display` is the connection Xlib handed to the error handler;
    // `buf` is writable for `ERROR_TEXT_LEN` bytes and outlives the call.
    // XGetErrorText truncates to the given length.
    unsafe {
        xlib::XGetErrorText(display, code, buf.as_mut_ptr(), ERROR_TEXT_LEN as c_int);
    }

    // Read up to the first NUL ourselves so a missing terminator cannot
    // overrun the buffer.
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}
