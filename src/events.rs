// ── Lifecycle events ──────────────────────────────────────────────────────────
//
// The portable notifications the host derives from raw toolkit signals.
// Observers subscribe to one of four named channels and never see toolkit
// signal names.  Everything runs on the UI thread, so channels are plain
// `RefCell`s.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::toolkit::{NativeWindowId, Size, WindowRef};

/// Payload of `Created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedEvent {
    /// Reserved for the engine's browser handle; the host always sends zero.
    pub handle: usize,
    /// The toolkit window object.
    pub window: WindowRef,
    /// Display-server id the engine attaches its render surface to.
    pub native_id: NativeWindowId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Created(CreatedEvent),
    Moving,
    SizeChanged(Size),
    Close,
}

// ── Channel ───────────────────────────────────────────────────────────────────

struct Channel<T> {
    subscribers: RefCell<Vec<Box<dyn FnMut(&T)>>>,
    /// Payloads emitted from inside a subscriber, delivered after it returns.
    pending: RefCell<VecDeque<T>>,
    dispatching: Cell<bool>,
}

impl<T: Clone> Channel<T> {
    fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    fn subscribe(&self, f: impl FnMut(&T) + 'static) {
        self.subscribers.borrow_mut().push(Box::new(f));
    }

    fn emit(&self, payload: &T) {
        // A subscriber can emit again (a modal dialog spins a nested loop
        // that delivers more toolkit signals).  Those payloads are queued and
        // every subscriber sees them once the current round is done.
        if self.dispatching.replace(true) {
            self.pending.borrow_mut().push_back(payload.clone());
            return;
        }
        self.dispatch(payload);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(queued) => self.dispatch(&queued),
                None => break,
            }
        }
        self.dispatching.set(false);
    }

    fn dispatch(&self, payload: &T) {
        // Subscribers may subscribe again from inside their callback; take
        // the list out so no borrow is held while they run.
        let mut current = self.subscribers.take();
        for subscriber in current.iter_mut() {
            subscriber(payload);
        }
        let mut slot = self.subscribers.borrow_mut();
        current.append(&mut slot);
        *slot = current;
    }

    fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

// ── HostEvents ────────────────────────────────────────────────────────────────

/// The four lifecycle channels exposed by `Host`.
pub struct HostEvents {
    created: Channel<CreatedEvent>,
    moving: Channel<()>,
    size_changed: Channel<Size>,
    close: Channel<()>,
}

impl Default for HostEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl HostEvents {
    pub fn new() -> Self {
        Self {
            created: Channel::new(),
            moving: Channel::new(),
            size_changed: Channel::new(),
            close: Channel::new(),
        }
    }

    /// The window was realized and has a native id.  Fires at most once.
    pub fn on_created(&self, f: impl FnMut(&CreatedEvent) + 'static) {
        self.created.subscribe(f);
    }

    /// The window was moved or reconfigured.
    pub fn on_moving(&self, mut f: impl FnMut() + 'static) {
        self.moving.subscribe(move |_| f());
    }

    /// The window got a new size.
    pub fn on_size_changed(&self, f: impl FnMut(&Size) + 'static) {
        self.size_changed.subscribe(f);
    }

    /// The user closed the window.  Fires at most once.
    pub fn on_close(&self, mut f: impl FnMut() + 'static) {
        self.close.subscribe(move |_| f());
    }

    pub(crate) fn emit(&self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::Created(created) => self.created.emit(created),
            LifecycleEvent::Moving => self.moving.emit(&()),
            LifecycleEvent::SizeChanged(size) => self.size_changed.emit(size),
            LifecycleEvent::Close => self.close.emit(&()),
        }
    }

    /// Total number of subscribers across all channels.
    pub fn subscriber_count(&self) -> usize {
        self.created.len() + self.moving.len() + self.size_changed.len() + self.close.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
