// ── Message dialogs ───────────────────────────────────────────────────────────
//
// Thin wrappers around GtkMessageDialog.  The host owns the create / run /
// destroy sequence so a failed run still destroys the widget.

#![allow(unsafe_code)]

use gtk::prelude::*;

use crate::toolkit::MessageType;

/// Map a host message type onto GTK's, passing unknown values straight
/// through.
pub(crate) fn gtk_message_type(kind: MessageType) -> gtk::MessageType {
    match kind {
        MessageType::Info => gtk::MessageType::Info,
        MessageType::Warning => gtk::MessageType::Warning,
        MessageType::Question => gtk::MessageType::Question,
        MessageType::Error => gtk::MessageType::Error,
        MessageType::Other => gtk::MessageType::Other,
        MessageType::Unknown(n) => gtk::MessageType::__Unknown(n),
    }
}

/// Build a parentless modal dialog with a single OK button.
pub(crate) fn new_message_dialog(message: &str, kind: MessageType) -> gtk::MessageDialog {
    gtk::MessageDialog::new(
        None::<&gtk::Window>,
        gtk::DialogFlags::MODAL,
        gtk_message_type(kind),
        gtk::ButtonsType::Ok,
        message,
    )
}

/// Block the current thread in a nested loop until the dialog is dismissed.
pub(crate) fn run(dialog: &gtk::MessageDialog) {
    let response = dialog.run();
    log::debug!("message dialog dismissed with {response:?}");
}

pub(crate) fn destroy(dialog: gtk::MessageDialog) {
    // SAFETY: the dialog is a parentless toplevel created by
    // `new_message_dialog`; no other reference to it is used after this call.
    unsafe {
        dialog.destroy();
    }
}
