// ── Native toolkit surface ────────────────────────────────────────────────────
//
// The complete set of native windowing calls the host depends on, expressed
// as one trait.  `platform::gtk3` implements it over GTK 3 / GDK-X11 / Xlib;
// tests implement it with a recording fake.  No `unsafe` here.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::signals::SignalRegistration;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// A width/height pair in toolkit units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

// ── Handles ───────────────────────────────────────────────────────────────────

/// Display-server window identifier (an X11 XID).
///
/// Zero is never a valid window and doubles as the "not available" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeWindowId(pub u64);

impl NativeWindowId {
    pub const NULL: Self = Self(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Opaque address of the toolkit's window object, for consumers that hand it
/// straight back to native code.  Never dereferenced by Hearth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WindowRef(pub usize);

// ── Window creation parameters ────────────────────────────────────────────────

/// Native window type.  Matches `GtkWindowType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Regular decorated window managed by the window manager.
    Toplevel,
    /// Undecorated window that bypasses the window manager.
    Popup,
}

impl WindowKind {
    pub fn for_frameless(frameless: bool) -> Self {
        if frameless {
            Self::Popup
        } else {
            Self::Toplevel
        }
    }
}

/// Placement policy applied before the window is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPosition {
    Center,
}

/// Message dialog flavour.  Matches `GtkMessageType`.
///
/// Raw values outside the known range are carried through in `Unknown`
/// rather than rejected; the toolkit decides what to draw for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Warning,
    Question,
    Error,
    Other,
    Unknown(i32),
}

impl MessageType {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Info,
            1 => Self::Warning,
            2 => Self::Question,
            3 => Self::Error,
            4 => Self::Other,
            n => Self::Unknown(n),
        }
    }
}

// ── Toolkit trait ─────────────────────────────────────────────────────────────

/// Native windowing calls used by `Host`.
///
/// All methods are called on the UI thread.  Handles returned by the toolkit
/// are non-owning: the toolkit keeps ownership of the native objects.
pub trait Toolkit {
    /// Handle to a native top-level window.
    type Window: Clone;
    /// Handle to a native modal dialog.
    type Dialog;

    /// Initialise the toolkit runtime.  Idempotent for the whole process.
    fn init(&self) -> Result<()>;

    /// Install the process-wide display error handlers.
    fn install_error_trap(&self, debugging: bool) -> Result<()>;

    fn create_window(&self, kind: WindowKind) -> Result<Self::Window>;

    fn window_ref(&self, window: &Self::Window) -> WindowRef;

    fn set_title(&self, window: &Self::Window, title: &str) -> Result<()>;

    fn set_icon_from_file(&self, window: &Self::Window, path: &Path) -> Result<()>;

    fn set_default_size(&self, window: &Self::Window, size: Size) -> Result<()>;

    fn set_position(&self, window: &Self::Window, position: WindowPosition) -> Result<()>;

    fn maximize(&self, window: &Self::Window) -> Result<()>;

    fn fullscreen(&self, window: &Self::Window) -> Result<()>;

    /// Attach `registration` to its signal on `window`.
    fn connect(&self, window: &Self::Window, registration: &SignalRegistration) -> Result<()>;

    /// Use the screen's default (non-composited) visual for the window.
    fn set_default_visual(&self, window: &Self::Window) -> Result<()>;

    fn show_all(&self, window: &Self::Window) -> Result<()>;

    /// Display-server identifier of the realized window.
    ///
    /// Fails while the window has no native surface yet.
    fn native_window_id(&self, window: &Self::Window) -> Result<NativeWindowId>;

    fn window_size(&self, window: &Self::Window) -> Result<Size>;

    /// Move/resize a foreign child surface on the window's display.
    fn move_resize_child(
        &self,
        window: &Self::Window,
        child: NativeWindowId,
        rect: Rect,
    ) -> Result<()>;

    /// Ask the toolkit main loop to return.
    fn main_quit(&self) -> Result<()>;

    fn new_message_dialog(&self, message: &str, kind: MessageType) -> Result<Self::Dialog>;

    /// Run a dialog modally.  Blocks until it is dismissed.
    fn run_dialog(&self, dialog: &Self::Dialog) -> Result<()>;

    fn destroy_dialog(&self, dialog: Self::Dialog);
}

// ── Recording fake ────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::path::PathBuf;

    use super::*;
    use crate::error::HostError;
    use crate::signals::{ConnectFlags, SignalHandler, SignalKind};

    /// Frame and title bar the fake takes out of every requested size.
    pub(crate) const DECORATIONS: Size = Size::new(2, 30);

    /// Every native call the fake observed, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        Init,
        InstallErrorTrap { debugging: bool },
        CreateWindow(WindowKind),
        SetTitle(String),
        SetIcon(PathBuf),
        SetDefaultSize(Size),
        SetPosition(WindowPosition),
        Maximize,
        Fullscreen,
        Connect(&'static str, ConnectFlags),
        SetDefaultVisual,
        ShowAll,
        MoveResizeChild(NativeWindowId, Rect),
        MainQuit,
        NewDialog(String, MessageType),
        RunDialog(u32),
        DestroyDialog(u32),
    }

    thread_local! {
        static CLOCK: Cell<u64> = const { Cell::new(0) };
    }

    /// Monotonic per-thread counter for ordering calls across fakes.
    pub(crate) fn stamp() -> u64 {
        CLOCK.with(|c| {
            c.set(c.get() + 1);
            c.get()
        })
    }

    /// In-memory toolkit.  Windows and dialogs are plain integers.
    pub(crate) struct FakeToolkit {
        pub(crate) calls: RefCell<Vec<Call>>,
        /// Names of calls that should fail, e.g. `"run_dialog"`.
        pub(crate) failing: RefCell<HashSet<&'static str>>,
        /// XID reported once the window is realized.
        pub(crate) xid: Cell<NativeWindowId>,
        pub(crate) realized: Cell<bool>,
        pub(crate) size: Cell<Size>,
        pub(crate) main_quit_stamp: Cell<Option<u64>>,
        handlers: RefCell<Vec<(SignalKind, SignalHandler)>>,
        next_dialog: Cell<u32>,
    }

    impl FakeToolkit {
        pub(crate) fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                failing: RefCell::new(HashSet::new()),
                xid: Cell::new(NativeWindowId(0x0380_0007)),
                realized: Cell::new(false),
                size: Cell::new(Size::default()),
                main_quit_stamp: Cell::new(None),
                handlers: RefCell::new(Vec::new()),
                next_dialog: Cell::new(1),
            }
        }

        pub(crate) fn fail(&self, call: &'static str) {
            self.failing.borrow_mut().insert(call);
        }

        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls.borrow().iter().filter(|c| pred(c)).count()
        }

        /// Deliver `kind` the way GTK would: realize marks the window as
        /// having a native surface before handlers run.
        pub(crate) fn fire(&self, kind: SignalKind) {
            if kind == SignalKind::Realize {
                self.realized.set(true);
            }
            let handlers: Vec<SignalHandler> = self
                .handlers
                .borrow()
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, h)| h.clone())
                .collect();
            for handler in handlers {
                handler();
            }
        }

        fn record(&self, name: &'static str, call: Call) -> Result<()> {
            self.calls.borrow_mut().push(call);
            if self.failing.borrow().contains(name) {
                Err(HostError::native(name, "injected failure"))
            } else {
                Ok(())
            }
        }
    }

    impl Toolkit for FakeToolkit {
        type Window = u32;
        type Dialog = u32;

        fn init(&self) -> Result<()> {
            self.record("init", Call::Init)
        }

        fn install_error_trap(&self, debugging: bool) -> Result<()> {
            self.record("install_error_trap", Call::InstallErrorTrap { debugging })
        }

        fn create_window(&self, kind: WindowKind) -> Result<u32> {
            self.record("create_window", Call::CreateWindow(kind))?;
            Ok(1)
        }

        fn window_ref(&self, window: &u32) -> WindowRef {
            WindowRef(*window as usize * 0x1000)
        }

        fn set_title(&self, _: &u32, title: &str) -> Result<()> {
            self.record("set_title", Call::SetTitle(title.to_owned()))
        }

        fn set_icon_from_file(&self, _: &u32, path: &Path) -> Result<()> {
            self.record("set_icon_from_file", Call::SetIcon(path.to_path_buf()))
        }

        fn set_default_size(&self, _: &u32, size: Size) -> Result<()> {
            self.record("set_default_size", Call::SetDefaultSize(size))?;
            self.size.set(Size::new(
                (size.width - DECORATIONS.width).max(0),
                (size.height - DECORATIONS.height).max(0),
            ));
            Ok(())
        }

        fn set_position(&self, _: &u32, position: WindowPosition) -> Result<()> {
            self.record("set_position", Call::SetPosition(position))
        }

        fn maximize(&self, _: &u32) -> Result<()> {
            self.record("maximize", Call::Maximize)
        }

        fn fullscreen(&self, _: &u32) -> Result<()> {
            self.record("fullscreen", Call::Fullscreen)
        }

        fn connect(&self, _: &u32, registration: &SignalRegistration) -> Result<()> {
            self.record(
                "connect",
                Call::Connect(registration.kind.name(), registration.flags),
            )?;
            self.handlers
                .borrow_mut()
                .push((registration.kind, registration.handler.clone()));
            Ok(())
        }

        fn set_default_visual(&self, _: &u32) -> Result<()> {
            self.record("set_default_visual", Call::SetDefaultVisual)
        }

        fn show_all(&self, _: &u32) -> Result<()> {
            self.record("show_all", Call::ShowAll)
        }

        fn native_window_id(&self, _: &u32) -> Result<NativeWindowId> {
            if self.failing.borrow().contains("native_window_id") {
                return Err(HostError::native("native_window_id", "injected failure"));
            }
            if !self.realized.get() {
                return Err(HostError::NullHandle {
                    function: "gtk_widget_get_window",
                });
            }
            crate::error::ensure_not_null("gdk_x11_window_get_xid", self.xid.get())
        }

        fn window_size(&self, _: &u32) -> Result<Size> {
            if self.failing.borrow().contains("window_size") {
                return Err(HostError::native("window_size", "injected failure"));
            }
            Ok(self.size.get())
        }

        fn move_resize_child(&self, _: &u32, child: NativeWindowId, rect: Rect) -> Result<()> {
            self.record("move_resize_child", Call::MoveResizeChild(child, rect))
        }

        fn main_quit(&self) -> Result<()> {
            self.main_quit_stamp.set(Some(stamp()));
            self.record("main_quit", Call::MainQuit)
        }

        fn new_message_dialog(&self, message: &str, kind: MessageType) -> Result<u32> {
            self.record("new_message_dialog", Call::NewDialog(message.to_owned(), kind))?;
            let id = self.next_dialog.get();
            self.next_dialog.set(id + 1);
            Ok(id)
        }

        fn run_dialog(&self, dialog: &u32) -> Result<()> {
            self.record("run_dialog", Call::RunDialog(*dialog))
        }

        fn destroy_dialog(&self, dialog: u32) {
            self.calls.borrow_mut().push(Call::DestroyDialog(dialog));
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
