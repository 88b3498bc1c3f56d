use std::thread;
use std::time::Duration;

use crate::message::{Message, MessageKind};
use crate::toolkit::Toolkit;
use crate::window::{WindowFlags, WindowId};

/// Why a dispatch loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The window handled a close message.
    Closed,
    /// A dialog item handed focus back to its dialog.
    FocusReleased,
    /// The window was destroyed while its loop was running, or never existed.
    Destroyed,
}

enum ControlFlow {
    Continue,
    Done(LoopExit),
}

/// Per-window message pump.
///
/// The loop owns the calling thread until its window closes. It is the only
/// place that drains a window's queue, and it redraws the whole tree once
/// per drained batch rather than once per message, so bursts of input do
/// not trigger a composite each.
///
/// Loops nest: a dialog's change-focus handler runs its item's loop on the
/// same stack, and the dialog's loop resumes when the item's returns.
pub struct DispatchLoop<'a> {
    toolkit: &'a Toolkit,
    window: WindowId,
    poll_interval: Duration,
}

impl<'a> DispatchLoop<'a> {
    pub fn new(toolkit: &'a Toolkit, window: WindowId) -> Self {
        Self {
            toolkit,
            window,
            poll_interval: toolkit.config().poll_interval,
        }
    }

    pub fn run(self) -> LoopExit {
        let toolkit = self.toolkit;
        let window = self.window;
        if !toolkit.is_live(window) {
            return LoopExit::Destroyed;
        }
        if toolkit.flags(window).contains(WindowFlags::DIALOG)
            && !toolkit.children(window).is_empty()
        {
            toolkit.send_message(window, Message::change_focus(None));
        }
        tracing::trace!(?window, "dispatch loop entered");

        let mut need_redraw = true;
        let exit = loop {
            if !toolkit.is_live(window) {
                break LoopExit::Destroyed;
            }
            toolkit.set_focus(Some(window));
            if need_redraw {
                toolkit.display(toolkit.root());
                need_redraw = false;
            }

            if let Some(first) = toolkit.receive(window) {
                // Drain everything queued so far, then redraw once.
                let mut next = Some(first);
                let mut flow = ControlFlow::Continue;
                while let Some(message) = next {
                    flow = self.dispatch(message);
                    if matches!(flow, ControlFlow::Done(_)) {
                        break;
                    }
                    next = toolkit.receive(window);
                }
                need_redraw = true;
                if let ControlFlow::Done(exit) = flow {
                    break exit;
                }
            }

            thread::sleep(self.poll_interval);
        };

        toolkit.set_focus(None);
        tracing::trace!(?window, ?exit, "dispatch loop left");
        exit
    }

    fn dispatch(&self, message: Message) -> ControlFlow {
        let kind = message.kind;
        if kind != MessageKind::Display {
            self.toolkit.invoke(self.window, message);
        }
        match kind {
            MessageKind::Close => ControlFlow::Done(LoopExit::Closed),
            MessageKind::ChangeFocus if self.toolkit.is_dialog_item(self.window) => {
                ControlFlow::Done(LoopExit::FocusReleased)
            }
            _ => ControlFlow::Continue,
        }
    }
}
