// ── Native signal bridge ──────────────────────────────────────────────────────
//
// The toolkit calls back into the host asynchronously from its own event
// loop, so every callback it holds must stay alive for as long as the window
// does.  `SignalTable` owns one registration per signal kind for the whole
// life of the host; a slot is filled once and never reassigned.

use std::rc::Rc;

use crate::error::{HostError, Result};

/// Host-side callback invoked when a signal fires.
pub type SignalHandler = Rc<dyn Fn()>;

/// Called by the toolkit when it discards a connected closure.
pub type FreeNotify = fn();

/// The four window signals the host listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// The window acquired a native surface.
    Realize,
    /// The window was given a new size.  Surfaces as `SizeChanged`.
    SizeAllocate,
    /// The window was moved or reconfigured.  Surfaces as `Moving`.
    Configure,
    /// The user asked to close the window.  Surfaces as `Close`.
    Delete,
}

impl SignalKind {
    pub const ALL: [Self; 4] = [
        Self::Realize,
        Self::SizeAllocate,
        Self::Configure,
        Self::Delete,
    ];

    /// GTK signal name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Realize => "realize",
            Self::SizeAllocate => "size-allocate",
            Self::Configure => "configure-event",
            Self::Delete => "delete-event",
        }
    }

    /// `*-event` signals return a gboolean; `FALSE` lets other handlers and
    /// the default handler run.
    pub fn returns_propagation(self) -> bool {
        matches!(self, Self::Configure | Self::Delete)
    }

    fn slot(self) -> usize {
        match self {
            Self::Realize => 0,
            Self::SizeAllocate => 1,
            Self::Configure => 2,
            Self::Delete => 3,
        }
    }
}

/// The subset of `GConnectFlags` the host uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectFlags {
    /// Run after the default handler.
    pub after: bool,
}

impl ConnectFlags {
    pub const AFTER: Self = Self { after: true };
}

/// One connected signal.
pub struct SignalRegistration {
    pub kind: SignalKind,
    pub handler: SignalHandler,
    pub on_free: Option<FreeNotify>,
    pub flags: ConnectFlags,
}

impl std::fmt::Debug for SignalRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRegistration")
            .field("kind", &self.kind)
            .field("signal", &self.kind.name())
            .field("has_on_free", &self.on_free.is_some())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Free notifier used for every host registration.  Closure storage is left
/// to process lifetime, so there is nothing to release.
pub fn free_noop() {}

/// Arena of signal registrations, one slot per `SignalKind`.
#[derive(Default)]
pub struct SignalTable {
    slots: [Option<SignalRegistration>; 4],
}

impl SignalTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the handler for `kind` with run-after semantics.
    ///
    /// Fails if `kind` already has a registration.
    pub fn register(
        &mut self,
        kind: SignalKind,
        handler: SignalHandler,
        on_free: Option<FreeNotify>,
    ) -> Result<&SignalRegistration> {
        let slot = &mut self.slots[kind.slot()];
        if slot.is_some() {
            return Err(HostError::native(
                "g_signal_connect_data",
                format!("{} is already connected", kind.name()),
            ));
        }
        Ok(slot.insert(SignalRegistration {
            kind,
            handler,
            on_free,
            flags: ConnectFlags::AFTER,
        }))
    }

    pub fn get(&self, kind: SignalKind) -> Option<&SignalRegistration> {
        self.slots[kind.slot()].as_ref()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn signal_names_match_gtk() {
        let names: Vec<_> = SignalKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            ["realize", "size-allocate", "configure-event", "delete-event"]
        );
    }

    #[test]
    fn only_event_signals_return_a_value() {
        assert!(!SignalKind::Realize.returns_propagation());
        assert!(!SignalKind::SizeAllocate.returns_propagation());
        assert!(SignalKind::Configure.returns_propagation());
        assert!(SignalKind::Delete.returns_propagation());
    }

    #[test]
    fn registrations_run_after_default_handlers() {
        let mut table = SignalTable::new();
        let reg = table
            .register(SignalKind::Realize, Rc::new(|| {}), Some(free_noop))
            .expect("register");
        assert_eq!(reg.flags, ConnectFlags::AFTER);
        assert!(reg.on_free.is_some());
    }

    #[test]
    fn a_slot_is_never_reassigned() {
        let mut table = SignalTable::new();
        let hits = Rc::new(Cell::new(0));
        let first = {
            let hits = hits.clone();
            Rc::new(move || hits.set(hits.get() + 1))
        };
        table
            .register(SignalKind::Delete, first, None)
            .expect("first registration");
        assert!(table
            .register(SignalKind::Delete, Rc::new(|| {}), None)
            .is_err());

        // The original handler is still the one stored.
        let reg = table.get(SignalKind::Delete).expect("slot filled");
        (reg.handler)();
        assert_eq!(hits.get(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_holds_the_handler_alive() {
        let mut table = SignalTable::new();
        let handler: SignalHandler = Rc::new(|| {});
        table
            .register(SignalKind::Configure, handler.clone(), None)
            .expect("register");
        assert_eq!(Rc::strong_count(&handler), 2);
        drop(handler);
        assert!(table.get(SignalKind::Configure).is_some());
        assert!(table.get(SignalKind::SizeAllocate).is_none());
    }
}
