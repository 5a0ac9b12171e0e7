// ── Window host ───────────────────────────────────────────────────────────────
//
// Owns the single top-level window, turns the toolkit's raw signals into
// lifecycle events and exposes the operations the application layer and the
// embedded engine rely on.
//
// Failure policy: nothing leaves this module as an error.  Each public
// operation runs its body as a `Result`, logs any failure together with the
// operation name and returns a safe default (null id, 0×0 size, no-op).
//
// Lifecycle:
//
//   Uninitialized ──realize──▶ Created ──size/configure──▶ Running
//         │                       │                          │
//         └─────────delete────────┴──────────delete──────────┴──▶ Closed
//
// Size and configure signals that arrive before `Created` are dropped.
// `Closed` is terminal.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use log::{debug, error, info, warn};

use crate::engine::BrowserEngine;
use crate::error::{HostError, Result};
use crate::events::{CreatedEvent, HostEvents, LifecycleEvent};
use crate::options::{icon_full_path, WindowOptions, WindowState};
use crate::signals::{self, SignalHandler, SignalKind, SignalTable};
use crate::toolkit::{
    MessageType, NativeWindowId, Rect, Size, Toolkit, WindowKind, WindowPosition,
};

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// No native surface yet.
    Uninitialized,
    /// Realized; `Created` has been emitted.
    Created,
    /// At least one size or configure event was delivered after `Created`.
    Running,
    /// The window was closed.  Terminal.
    Closed,
}

impl Lifecycle {
    /// Whether size/configure/close notifications may be emitted.
    pub fn is_initialized(self) -> bool {
        matches!(self, Self::Created | Self::Running)
    }
}

// ── Shared state ──────────────────────────────────────────────────────────────

/// State reachable from both the facade and the signal handlers.
struct Shared<T: Toolkit, E> {
    toolkit: T,
    engine: E,
    events: HostEvents,
    window: RefCell<Option<T::Window>>,
    xid: Cell<NativeWindowId>,
    state: Cell<Lifecycle>,
    debugging: Cell<bool>,
    exit_requested: Cell<bool>,
    shut_down: Cell<bool>,
    /// Keeps every connected callback alive for the life of the host.
    signals: RefCell<SignalTable>,
}

// ── Host ──────────────────────────────────────────────────────────────────────

/// Native window host.
///
/// Single-threaded: create, run and drive it from the UI thread only.
pub struct Host<T: Toolkit + 'static, E: BrowserEngine + 'static> {
    shared: Rc<Shared<T, E>>,
}

impl<T: Toolkit + 'static, E: BrowserEngine + 'static> Host<T, E> {
    pub fn new(toolkit: T, engine: E) -> Self {
        Self {
            shared: Rc::new(Shared {
                toolkit,
                engine,
                events: HostEvents::new(),
                window: RefCell::new(None),
                xid: Cell::new(NativeWindowId::NULL),
                state: Cell::new(Lifecycle::Uninitialized),
                debugging: Cell::new(false),
                exit_requested: Cell::new(false),
                shut_down: Cell::new(false),
                signals: RefCell::new(SignalTable::new()),
            }),
        }
    }

    /// Lifecycle channels.  Subscribe before `create_window`.
    pub fn events(&self) -> &HostEvents {
        &self.shared.events
    }

    pub fn toolkit(&self) -> &T {
        &self.shared.toolkit
    }

    pub fn engine(&self) -> &E {
        &self.shared.engine
    }

    pub fn state(&self) -> Lifecycle {
        self.shared.state.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.state.get().is_initialized()
    }

    pub fn debugging(&self) -> bool {
        self.shared.debugging.get()
    }

    /// The id captured when the window was realized, or `NULL` before that.
    pub fn native_id(&self) -> NativeWindowId {
        self.shared.xid.get()
    }

    // ── CreateWindow ──────────────────────────────────────────────────────────

    /// Create, configure and show the host window.
    ///
    /// Call once per host.  A second call creates a second native window and
    /// the first one is no longer tracked.
    pub fn create_window(&self, options: &WindowOptions, debugging: bool) {
        let shared = &self.shared;
        shared.debugging.set(debugging);

        if shared.window.borrow().is_some() {
            warn!("create_window called twice; the previous window is no longer tracked");
        }

        // Runtime and display error handlers are per process; both calls are
        // no-ops after the first window.  Without a runtime there is no
        // display to create a window on.
        if let Err(e) = shared.toolkit.init() {
            error!("Init failed: {e}");
            return;
        }
        log_failure(
            "InstallX11ErrorHandlers",
            shared.toolkit.install_error_trap(debugging),
        );

        let kind = WindowKind::for_frameless(options.frameless);
        let window = match shared.toolkit.create_window(kind) {
            Ok(window) => window,
            Err(e) => {
                error!("CreateNewWindow failed: {e}");
                return;
            }
        };
        *shared.window.borrow_mut() = Some(window.clone());
        debug!("created {kind:?} window");

        log_failure("SetWindowTitle", shared.toolkit.set_title(&window, &options.title));
        self.set_icon(&window, options);
        log_failure(
            "SetWindowDefaultSize",
            shared.toolkit.set_default_size(&window, options.size),
        );

        if options.wants_centering() {
            log_failure(
                "SetWindowPosition",
                shared.toolkit.set_position(&window, WindowPosition::Center),
            );
        }

        match options.state {
            WindowState::Normal => {}
            WindowState::Maximized => self.set_window_maximize(),
            WindowState::Fullscreen => self.set_fullscreen(),
        }

        for kind in SignalKind::ALL {
            log_failure("RegisterHandler", self.connect(&window, kind));
        }

        log_failure(
            "SetDefaultWindowVisual",
            shared.toolkit.set_default_visual(&window),
        );
        log_failure("ShowWindow", shared.toolkit.show_all(&window));
    }

    /// Best effort: a missing or unreadable icon never stops window creation.
    fn set_icon(&self, window: &T::Window, options: &WindowOptions) {
        let Some(requested) = options.icon.as_deref() else {
            return;
        };
        match icon_full_path(requested) {
            Some(path) => {
                if let Err(e) = self.shared.toolkit.set_icon_from_file(window, &path) {
                    error!("SetAppIcon failed for {}: {e}", path.display());
                }
            }
            None => warn!("icon {} not found; keeping default icon", requested.display()),
        }
    }

    fn connect(&self, window: &T::Window, kind: SignalKind) -> Result<()> {
        let weak: Weak<Shared<T, E>> = Rc::downgrade(&self.shared);
        let handler: SignalHandler = Rc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.on_signal(kind);
            }
        });

        let mut table = self.shared.signals.borrow_mut();
        let registration = table.register(kind, handler, Some(signals::free_noop))?;
        self.shared.toolkit.connect(window, registration)
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// Display-server id of the window, or `NULL` (logged) before realize.
    pub fn native_handle(&self) -> NativeWindowId {
        or_default("GetNativeHandle", self.shared.native_handle())
    }

    /// Current window size as reported by the toolkit; 0×0 if unknown.
    pub fn window_client_size(&self) -> Size {
        or_default("GetWindowClientSize", self.shared.window_size())
    }

    // ── Run / Exit ────────────────────────────────────────────────────────────

    /// Run the shared message loop, then shut the engine down.
    ///
    /// Returns immediately (after shutdown) if `exit` was already requested.
    pub fn run(&self) {
        let shared = &self.shared;

        if shared.exit_requested.get() {
            debug!("exit requested before run; skipping message loop");
        } else {
            info!("entering message loop");
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                shared.engine.run_message_loop()
            }));
            match outcome {
                Ok(Ok(())) => debug!("message loop returned"),
                Ok(Err(e)) => {
                    error!("Run failed: {e}");
                    return;
                }
                Err(payload) => {
                    error!("Run failed: message loop panicked: {}", panic_message(&*payload));
                    return;
                }
            }
        }

        if !shared.shut_down.replace(true) {
            log_failure("Shutdown", shared.engine.shutdown());
        }
    }

    /// Ask the engine loop and then the toolkit loop to stop.
    ///
    /// Both requests are asynchronous; queued events may still be delivered.
    pub fn exit(&self) {
        let shared = &self.shared;
        shared.exit_requested.set(true);
        // Engine first so it can finish queued shutdown work while the
        // window still exists.
        log_failure("QuitMessageLoop", shared.engine.quit_message_loop());
        log_failure("Quit", shared.toolkit.main_quit());
    }

    // ── Window state ──────────────────────────────────────────────────────────

    pub fn set_window_maximize(&self) {
        log_failure(
            "SetWindowMaximize",
            self.shared
                .with_window("SetWindowMaximize", |tk, w| tk.maximize(w)),
        );
    }

    pub fn set_fullscreen(&self) {
        log_failure(
            "SetFullscreen",
            self.shared
                .with_window("SetFullscreen", |tk, w| tk.fullscreen(w)),
        );
    }

    /// Keep the engine's render surface covering the whole window.
    pub fn resize_browser(&self, surface: NativeWindowId, width: i32, height: i32) {
        let rect = Rect {
            x: 0,
            y: 0,
            width,
            height,
        };
        log_failure(
            "ResizeBrowser",
            self.shared.with_window("ResizeBrowser", |tk, w| {
                let surface = crate::error::ensure_not_null("ResizeBrowser", surface)?;
                tk.move_resize_child(w, surface, rect)
            }),
        );
    }

    // ── Dialogs ───────────────────────────────────────────────────────────────

    /// Show a modal message dialog and block until it is dismissed.
    ///
    /// `kind` is a raw `GtkMessageType` value; out-of-range values are
    /// passed through unchanged.  The dialog is always destroyed.
    pub fn message_box(&self, message: &str, kind: i32) {
        let toolkit = &self.shared.toolkit;
        let dialog = match toolkit.new_message_dialog(message, MessageType::from_raw(kind)) {
            Ok(dialog) => dialog,
            Err(e) => {
                error!("MessageBox failed: {e}");
                return;
            }
        };
        log_failure("MessageBox", toolkit.run_dialog(&dialog));
        toolkit.destroy_dialog(dialog);
    }
}

// ── Signal handling ───────────────────────────────────────────────────────────

impl<T: Toolkit, E: BrowserEngine> Shared<T, E> {
    fn current_window(&self) -> Option<T::Window> {
        self.window.borrow().clone()
    }

    fn with_window<R>(
        &self,
        function: &'static str,
        f: impl FnOnce(&T, &T::Window) -> Result<R>,
    ) -> Result<R> {
        let window = self
            .current_window()
            .ok_or(HostError::NullHandle { function })?;
        f(&self.toolkit, &window)
    }

    fn native_handle(&self) -> Result<NativeWindowId> {
        self.with_window("GetNativeHandle", |tk, w| {
            crate::error::ensure_not_null("GetNativeHandle", tk.native_window_id(w)?)
        })
    }

    fn window_size(&self) -> Result<Size> {
        self.with_window("GetWindowSize", |tk, w| tk.window_size(w))
    }

    fn on_signal(&self, kind: SignalKind) {
        match kind {
            SignalKind::Realize => self.on_realized(),
            SignalKind::SizeAllocate => self.on_size_allocate(),
            SignalKind::Configure => self.on_configure(),
            SignalKind::Delete => self.on_delete(),
        }
    }

    fn on_realized(&self) {
        if self.state.get() != Lifecycle::Uninitialized {
            debug!("realize in state {:?} ignored", self.state.get());
            return;
        }
        let Some(window) = self.current_window() else {
            return;
        };

        match self.native_handle() {
            Ok(xid) => {
                self.xid.set(xid);
                self.state.set(Lifecycle::Created);
                info!("window realized (xid {:#x})", xid.0);
                self.events.emit(&LifecycleEvent::Created(CreatedEvent {
                    handle: 0,
                    window: self.toolkit.window_ref(&window),
                    native_id: xid,
                }));
            }
            Err(e) => error!("OnRealized failed: window XID is invalid: {e}"),
        }
    }

    fn on_size_allocate(&self) {
        if !self.state.get().is_initialized() {
            return;
        }
        self.state.set(Lifecycle::Running);
        let size = or_default("GetWindowSize", self.window_size());
        self.events.emit(&LifecycleEvent::SizeChanged(size));
    }

    fn on_configure(&self) {
        if !self.state.get().is_initialized() {
            return;
        }
        self.state.set(Lifecycle::Running);
        self.events.emit(&LifecycleEvent::Moving);
    }

    fn on_delete(&self) {
        log_failure("QuitMessageLoop", self.engine.quit_message_loop());
        let previous = self.state.replace(Lifecycle::Closed);
        if previous.is_initialized() {
            info!("window closed");
            self.events.emit(&LifecycleEvent::Close);
        }
    }
}

// ── Boundary helpers ──────────────────────────────────────────────────────────

fn log_failure(op: &str, result: Result<()>) {
    if let Err(e) = result {
        error!("{op} failed: {e}");
    }
}

fn or_default<R: Default>(op: &str, result: Result<R>) -> R {
    result.unwrap_or_else(|e| {
        error!("{op} failed: {e}");
        R::default()
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
