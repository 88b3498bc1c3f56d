use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use crate::message::{Message, MessageKind};

/// Per-window FIFO of pending messages.
///
/// Any thread may push; the queue's own lock serializes access. Pops never
/// block on an empty queue.
#[derive(Debug, Default)]
pub struct MessageQueue {
    inner: Mutex<VecDeque<Message>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Message>> {
        self.inner.lock().unwrap_or_else(|err| err.into_inner())
    }

    pub fn push(&self, message: Message) {
        self.lock().push_back(message);
    }

    pub fn pop(&self) -> Option<Message> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn head_kind(&self) -> Option<MessageKind> {
        self.lock().front().map(|m| m.kind)
    }

    pub fn tail_kind(&self) -> Option<MessageKind> {
        self.lock().back().map(|m| m.kind)
    }

    /// Remove every pending message, oldest first.
    pub fn drain(&self) -> Vec<Message> {
        self.lock().drain(..).collect()
    }
}
