// ── GTK toolkit ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Initialise GTK once, restricted to the X11 backend.
//   • Create and configure the GtkWindow.
//   • Connect host signal registrations with run-after semantics.
//   • Resolve the window's XID and move the engine's child surface via Xlib.

#![allow(unsafe_code)]

use std::os::raw::c_uint;
use std::path::Path;

use gtk::glib::{prelude::*, translate::ToGlibPtr};
use gtk::prelude::*;
use x11::xlib;

use super::{dialogs, xlib as xhandlers};
use crate::error::{ensure_not_null, HostError, Result};
use crate::signals::{FreeNotify, SignalHandler, SignalRegistration};
use crate::toolkit::{
    MessageType, NativeWindowId, Rect, Size, Toolkit, WindowKind, WindowPosition, WindowRef,
};
use crate::xerror::ErrorTrap;

// ── Connected closure payload ─────────────────────────────────────────────────

/// What a connected GTK closure owns.  GTK drops the closure when the
/// handler is disconnected or the window is finalised; `on_free` runs then.
struct ConnectedHandler {
    handler: SignalHandler,
    on_free: Option<FreeNotify>,
}

impl ConnectedHandler {
    fn invoke(&self) {
        (self.handler)();
    }
}

impl Drop for ConnectedHandler {
    fn drop(&mut self) {
        if let Some(notify) = self.on_free {
            notify();
        }
    }
}

// ── GtkToolkit ────────────────────────────────────────────────────────────────

/// `Toolkit` implementation over GTK 3 and GDK-X11.
#[derive(Debug, Default)]
pub struct GtkToolkit;

impl GtkToolkit {
    pub fn new() -> Self {
        Self
    }
}

/// gtk-rs panics on any widget call made before a successful `gtk::init`.
pub(crate) fn ensure_initialized(function: &'static str) -> Result<()> {
    if gtk::is_initialized_main_thread() {
        Ok(())
    } else {
        Err(HostError::native(function, "GTK is not initialized"))
    }
}

/// `gtk::main_level` asserts initialization too, so check that first.
pub(crate) fn main_loop_running() -> bool {
    gtk::is_initialized_main_thread() && gtk::main_level() > 0
}

fn gtk_window_type(kind: WindowKind) -> gtk::WindowType {
    match kind {
        WindowKind::Toplevel => gtk::WindowType::Toplevel,
        WindowKind::Popup => gtk::WindowType::Popup,
    }
}

impl Toolkit for GtkToolkit {
    type Window = gtk::Window;
    type Dialog = gtk::MessageDialog;

    fn init(&self) -> Result<()> {
        if gtk::is_initialized() {
            return Ok(());
        }
        // The engine renders into an X11 child window, so Wayland is out.
        gtk::gdk::set_allowed_backends("x11");
        gtk::init()?;
        Ok(())
    }

    fn install_error_trap(&self, debugging: bool) -> Result<()> {
        ErrorTrap::install(debugging, || {
            xhandlers::install_handlers();
            Ok(())
        })?;
        Ok(())
    }

    fn create_window(&self, kind: WindowKind) -> Result<gtk::Window> {
        ensure_initialized("gtk_window_new")?;
        Ok(gtk::Window::new(gtk_window_type(kind)))
    }

    fn window_ref(&self, window: &gtk::Window) -> WindowRef {
        WindowRef(window.as_ptr() as usize)
    }

    fn set_title(&self, window: &gtk::Window, title: &str) -> Result<()> {
        window.set_title(title);
        Ok(())
    }

    fn set_icon_from_file(&self, window: &gtk::Window, path: &Path) -> Result<()> {
        window.set_icon_from_file(path)?;
        Ok(())
    }

    fn set_default_size(&self, window: &gtk::Window, size: Size) -> Result<()> {
        window.set_default_size(size.width, size.height);
        Ok(())
    }

    fn set_position(&self, window: &gtk::Window, position: WindowPosition) -> Result<()> {
        let position = match position {
            WindowPosition::Center => gtk::WindowPosition::Center,
        };
        window.set_position(position);
        Ok(())
    }

    fn maximize(&self, window: &gtk::Window) -> Result<()> {
        window.maximize();
        Ok(())
    }

    fn fullscreen(&self, window: &gtk::Window) -> Result<()> {
        window.fullscreen();
        Ok(())
    }

    fn connect(&self, window: &gtk::Window, registration: &SignalRegistration) -> Result<()> {
        let kind = registration.kind;
        let connected = ConnectedHandler {
            handler: registration.handler.clone(),
            on_free: registration.on_free,
        };

        // `*-event` signals must return a gboolean; FALSE keeps propagation
        // going so GTK's default handlers (e.g. destroy on delete) still run.
        let id = window.connect_local(kind.name(), registration.flags.after, move |_args| {
            connected.invoke();
            kind.returns_propagation().then(|| false.to_value())
        });
        log::debug!("connected {} ({id:?})", kind.name());
        Ok(())
    }

    fn set_default_visual(&self, window: &gtk::Window) -> Result<()> {
        let screen = WidgetExt::screen(window).ok_or(HostError::NullHandle {
            function: "gtk_widget_get_screen",
        })?;
        let visual = screen.system_visual().ok_or(HostError::NullHandle {
            function: "gdk_screen_get_system_visual",
        })?;
        window.set_visual(Some(&visual));
        Ok(())
    }

    fn show_all(&self, window: &gtk::Window) -> Result<()> {
        window.show_all();
        Ok(())
    }

    fn native_window_id(&self, window: &gtk::Window) -> Result<NativeWindowId> {
        let gdk_window = window.window().ok_or(HostError::NullHandle {
            function: "gtk_widget_get_window",
        })?;
        let x11_window = gdk_window
            .downcast::<gdkx11::X11Window>()
            .map_err(|_| HostError::native("gdk_x11_window_get_xid", "not an X11 window"))?;
        ensure_not_null(
            "gdk_x11_window_get_xid",
            NativeWindowId(u64::from(x11_window.xid())),
        )
    }

    fn window_size(&self, window: &gtk::Window) -> Result<Size> {
        let (width, height) = window.size();
        Ok(Size::new(width, height))
    }

    fn move_resize_child(
        &self,
        window: &gtk::Window,
        child: NativeWindowId,
        rect: Rect,
    ) -> Result<()> {
        let display = WidgetExt::display(window)
            .downcast::<gdkx11::X11Display>()
            .map_err(|_| HostError::native("gdk_x11_display_get_xdisplay", "not an X11 display"))?;

        // SAFETY: `display` is a live GdkX11Display borrowed for this call;
        // the returned Xlib connection is owned by GDK and stays valid while
        // the display is open.
        let xdisplay = unsafe {
            gdkx11::ffi::gdk_x11_display_get_xdisplay(display.to_glib_none().0)
        } as *mut xlib::Display;
        if xdisplay.is_null() {
            return Err(HostError::NullHandle {
                function: "gdk_x11_display_get_xdisplay",
            });
        }

        // X rejects zero-sized windows with BadValue.
        let width = rect.width.max(1) as c_uint;
        let height = rect.height.max(1) as c_uint;

        // SAFETY: `xdisplay` is non-null and owned by GDK.  `child` is an XID
        // supplied by the engine; a stale id only yields an asynchronous
        // BadWindow, which the installed error trap absorbs.
        unsafe {
            xlib::XMoveResizeWindow(
                xdisplay,
                child.0 as xlib::Window,
                rect.x,
                rect.y,
                width,
                height,
            );
        }
        Ok(())
    }

    fn main_quit(&self) -> Result<()> {
        // gtk_main_quit outside gtk_main trips a GLib critical.
        if main_loop_running() {
            gtk::main_quit();
        }
        Ok(())
    }

    fn new_message_dialog(&self, message: &str, kind: MessageType) -> Result<gtk::MessageDialog> {
        ensure_initialized("gtk_message_dialog_new")?;
        Ok(dialogs::new_message_dialog(message, kind))
    }

    fn run_dialog(&self, dialog: &gtk::MessageDialog) -> Result<()> {
        dialogs::run(dialog);
        Ok(())
    }

    fn destroy_dialog(&self, dialog: gtk::MessageDialog) {
        dialogs::destroy(dialog);
    }
}

