//! Messages exchanged between input sources, handlers and window queues.

use std::any::Any;
use std::fmt;

use crossterm::event::KeyEvent;

use crate::window::WindowId;

/// Closed set of message kinds a window can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKind {
    KeyDown,
    MouseLeftClick,
    MouseLeftDouble,
    MouseMiddleClick,
    /// A pointer press landed outside the focused window.
    MouseOutsideFocus,
    Close,
    ChangeFocus,
    Display,
    /// Carries a value that must be released once it is safely off the queue.
    DeferredFree,
    Notify,
}

impl MessageKind {
    pub const ALL: [MessageKind; 10] = [
        MessageKind::KeyDown,
        MessageKind::MouseLeftClick,
        MessageKind::MouseLeftDouble,
        MessageKind::MouseMiddleClick,
        MessageKind::MouseOutsideFocus,
        MessageKind::Close,
        MessageKind::ChangeFocus,
        MessageKind::Display,
        MessageKind::DeferredFree,
        MessageKind::Notify,
    ];

    /// Immediate kinds run synchronously in the sender's thread instead of
    /// being queued.
    pub fn is_immediate(self) -> bool {
        matches!(
            self,
            MessageKind::Display
                | MessageKind::Notify
                | MessageKind::MouseLeftClick
                | MessageKind::MouseLeftDouble
                | MessageKind::MouseMiddleClick
        )
    }

    pub fn is_pointer_button(self) -> bool {
        matches!(
            self,
            MessageKind::MouseLeftClick | MessageKind::MouseLeftDouble | MessageKind::MouseMiddleClick
        )
    }
}

pub enum Payload {
    None,
    Key(KeyEvent),
    /// Pointer position relative to the receiving window's origin.
    Point { x: i32, y: i32 },
    /// Requested focus target; `None` asks for the next focusable item.
    Target(Option<WindowId>),
    Value(u64),
    Owned(Box<dyn Any + Send>),
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::None => f.write_str("None"),
            Payload::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Payload::Point { x, y } => f.debug_struct("Point").field("x", x).field("y", y).finish(),
            Payload::Target(target) => f.debug_tuple("Target").field(target).finish(),
            Payload::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Payload::Owned(_) => f.write_str("Owned(..)"),
        }
    }
}

#[derive(Debug)]
pub struct Message {
    pub kind: MessageKind,
    pub payload: Payload,
}

impl Message {
    pub fn new(kind: MessageKind, payload: Payload) -> Self {
        Self { kind, payload }
    }

    pub fn key(key: KeyEvent) -> Self {
        Self::new(MessageKind::KeyDown, Payload::Key(key))
    }

    pub fn close() -> Self {
        Self::new(MessageKind::Close, Payload::None)
    }

    pub fn change_focus(target: Option<WindowId>) -> Self {
        Self::new(MessageKind::ChangeFocus, Payload::Target(target))
    }

    pub fn display() -> Self {
        Self::new(MessageKind::Display, Payload::None)
    }

    pub fn notify(value: u64) -> Self {
        Self::new(MessageKind::Notify, Payload::Value(value))
    }

    pub fn pointer(kind: MessageKind, x: i32, y: i32) -> Self {
        Self::new(kind, Payload::Point { x, y })
    }

    pub fn outside_focus() -> Self {
        Self::new(MessageKind::MouseOutsideFocus, Payload::None)
    }

    pub fn deferred_free<T: Any + Send>(value: T) -> Self {
        Self::new(MessageKind::DeferredFree, Payload::Owned(Box::new(value)))
    }

    pub fn target(&self) -> Option<WindowId> {
        match self.payload {
            Payload::Target(target) => target,
            _ => None,
        }
    }

    pub fn key_event(&self) -> Option<KeyEvent> {
        match self.payload {
            Payload::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn point(&self) -> Option<(i32, i32)> {
        match self.payload {
            Payload::Point { x, y } => Some((x, y)),
            _ => None,
        }
    }
}
