//! Focus manager: dialog-local current item selection and the stock close,
//! change-focus and item key handlers.
//!
//! A dialog runs the loop of its current item nested inside its own
//! change-focus handler. When the item's loop ends (it closed, or it asked
//! its dialog to move focus) control returns to the dialog's loop, which
//! picks up the bubbled message from its queue.

use crossterm::event::KeyCode;

use crate::message::Message;
use crate::toolkit::Toolkit;
use crate::window::{WindowFlags, WindowId, WindowTree};

/// Stock close handler: an item of a dialog forwards the close to the
/// dialog so closing an item closes its container.
pub fn handle_close(toolkit: &Toolkit, window: WindowId, _message: Message) {
    if toolkit.is_dialog_item(window)
        && let Some(parent) = toolkit.parent(window)
    {
        toolkit.send_message(parent, Message::close());
    }
}

/// Stock change-focus handler.
///
/// On a dialog it selects the requested item (or the next focusable one)
/// and runs that item's loop on the current stack. On a dialog item it
/// forwards the request to the dialog; the item's own loop then ends.
pub fn handle_change_focus(toolkit: &Toolkit, window: WindowId, message: Message) {
    if toolkit.flags(window).contains(WindowFlags::DIALOG) {
        if let Some(item) = toolkit.select_item(window, message.target()) {
            tracing::debug!(dialog = ?window, ?item, "running dialog item");
            let exit = toolkit.run_loop(item);
            tracing::trace!(dialog = ?window, ?item, ?exit, "dialog item returned");
        }
    } else if toolkit.is_dialog_item(window)
        && let Some(parent) = toolkit.parent(window)
    {
        toolkit.send_message(parent, Message::change_focus(message.target()));
    }
}

/// Key handler for dialog items: Tab and BackTab move focus, Esc closes the
/// dialog, Enter closes it unless the item claims Enter for itself.
pub fn handle_item_key(toolkit: &Toolkit, window: WindowId, message: Message) {
    let Some(key) = message.key_event() else {
        return;
    };
    let flags = toolkit.flags(window);
    match key.code {
        KeyCode::Tab if !flags.contains(WindowFlags::WANTS_TAB) => {
            toolkit.send_message(window, Message::change_focus(None));
        }
        KeyCode::BackTab if !flags.contains(WindowFlags::WANTS_TAB) => {
            let previous = toolkit.previous_item(window);
            toolkit.send_message(window, Message::change_focus(previous));
        }
        KeyCode::Enter if !flags.contains(WindowFlags::WANTS_ENTER) => {
            toolkit.send_message(window, Message::close());
        }
        KeyCode::Esc => toolkit.send_message(window, Message::close()),
        _ => {}
    }
}

fn focusable(tree: &WindowTree, window: WindowId) -> bool {
    tree.contains(window) && !tree.flags(window).contains(WindowFlags::NO_FOCUS)
}

/// Pick the dialog's new current item.
///
/// A focusable direct child given as `requested` is taken as is. Otherwise
/// the children after the current item are searched in list order, wrapping
/// around; if the search comes back to the current item it is kept. A
/// selection carrying `NO_FOCUS` leaves the dialog with no current item.
pub(crate) fn select_item(
    tree: &mut WindowTree,
    dialog: WindowId,
    requested: Option<WindowId>,
) -> Option<WindowId> {
    let start = tree.get(dialog)?.current_item;
    let requested = requested.filter(|&target| {
        tree.get(target).is_some_and(|node| node.parent == Some(dialog)) && focusable(tree, target)
    });
    let mut current = start;
    match requested {
        Some(target) => current = Some(target),
        None => {
            // Bounded so a dialog whose children are all unfocusable cannot
            // spin forever.
            let rounds = tree.children(dialog).len() + 1;
            for _ in 0..rounds {
                current = tree.next_child(dialog, current);
                if current == start {
                    break;
                }
                if current.is_some_and(|c| focusable(tree, c)) {
                    break;
                }
            }
        }
    }
    let selected = current.filter(|&c| focusable(tree, c));
    if let Some(node) = tree.get_mut(dialog) {
        node.current_item = selected;
    }
    selected
}

/// Closest focusable sibling before `item`, wrapping around.
pub(crate) fn previous_focusable(tree: &WindowTree, item: WindowId) -> Option<WindowId> {
    let parent = tree.get(item)?.parent?;
    let siblings = tree.children(parent);
    let pos = siblings.iter().position(|&s| s == item)?;
    let n = siblings.len();
    (1..n)
        .map(|step| siblings[(pos + n - step) % n])
        .find(|&s| focusable(tree, s))
}
