use std::io;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::message::MessageKind;

/// Non-blocking pointer source polled by the pointer poller.
pub trait MouseDriver: Send {
    fn enable(&mut self) -> io::Result<()>;
    fn disable(&mut self) -> io::Result<()>;
    /// Next pending pointer event, or `None` when nothing is waiting.
    fn poll_mouse(&mut self) -> io::Result<Option<MouseEvent>>;
}

impl<T: MouseDriver + ?Sized> MouseDriver for Arc<Mutex<T>> {
    fn enable(&mut self) -> io::Result<()> {
        self.lock().unwrap_or_else(|err| err.into_inner()).enable()
    }

    fn disable(&mut self) -> io::Result<()> {
        self.lock().unwrap_or_else(|err| err.into_inner()).disable()
    }

    fn poll_mouse(&mut self) -> io::Result<Option<MouseEvent>> {
        self.lock()
            .unwrap_or_else(|err| err.into_inner())
            .poll_mouse()
    }
}

/// Maps raw pointer events to the three button messages windows receive.
///
/// The terminal only reports presses, so a left press on the same cell as
/// the previous one and within `double_click` of it is a double click.
pub struct PointerTranslator {
    double_click: Duration,
    last_left: Option<(Instant, u16, u16)>,
}

impl PointerTranslator {
    pub fn new(double_click: Duration) -> Self {
        Self {
            double_click,
            last_left: None,
        }
    }

    pub fn translate(&mut self, event: &MouseEvent, now: Instant) -> Option<MessageKind> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let cell = (event.column, event.row);
                let double = self.last_left.is_some_and(|(at, column, row)| {
                    (column, row) == cell && now.saturating_duration_since(at) <= self.double_click
                });
                if double {
                    // A third press starts a new click sequence.
                    self.last_left = None;
                    Some(MessageKind::MouseLeftDouble)
                } else {
                    self.last_left = Some((now, event.column, event.row));
                    Some(MessageKind::MouseLeftClick)
                }
            }
            MouseEventKind::Down(MouseButton::Middle) => Some(MessageKind::MouseMiddleClick),
            _ => None,
        }
    }
}
