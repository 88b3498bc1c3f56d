//! Keyboard and pointer pollers.
//!
//! Each poller owns one driver on its own thread and polls it every
//! `poll_interval` until its stop flag is raised by the root's teardown.
//! Keys go to the focused window's queue; pointer presses are resolved to
//! the window under the pointer and delivered immediately on the poller's
//! thread.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossterm::event::KeyEvent;

use crate::drivers::{KeyboardDriver, MouseDriver, PointerTranslator};
use crate::error::WindowError;
use crate::message::{Message, MessageKind};
use crate::toolkit::{Toolkit, WeakToolkit};
use crate::window::WindowId;

/// The two event sources a root window reads from.
pub struct InputSources {
    keyboard: Box<dyn KeyboardDriver>,
    mouse: Box<dyn MouseDriver>,
}

impl InputSources {
    pub fn new(keyboard: Box<dyn KeyboardDriver>, mouse: Box<dyn MouseDriver>) -> Self {
        Self { keyboard, mouse }
    }
}

pub(crate) struct InputPollers {
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl InputPollers {
    pub(crate) fn spawn(toolkit: &Toolkit, sources: InputSources) -> Result<Self, WindowError> {
        let mut pollers = Self {
            stop: Arc::new(AtomicBool::new(false)),
            handles: Vec::with_capacity(2),
        };
        let InputSources { keyboard, mouse } = sources;

        let weak = toolkit.downgrade();
        let stop = Arc::clone(&pollers.stop);
        let handle = thread::Builder::new()
            .name("term-wnd-keyboard".into())
            .spawn(move || keyboard_loop(weak, keyboard, stop))
            .map_err(|source| WindowError::PollerSpawn {
                name: "keyboard",
                source,
            })?;
        pollers.handles.push(handle);

        let weak = toolkit.downgrade();
        let stop = Arc::clone(&pollers.stop);
        match thread::Builder::new()
            .name("term-wnd-pointer".into())
            .spawn(move || pointer_loop(weak, mouse, stop))
        {
            Ok(handle) => pollers.handles.push(handle),
            Err(source) => {
                pollers.stop();
                return Err(WindowError::PollerSpawn {
                    name: "pointer",
                    source,
                });
            }
        }
        tracing::debug!("input pollers started");
        Ok(pollers)
    }

    /// Raise the stop flag and wait for both threads.
    pub(crate) fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        for handle in std::mem::take(&mut self.handles) {
            if handle.join().is_err() {
                tracing::warn!("input poller panicked");
            }
        }
        tracing::debug!("input pollers stopped");
    }
}

impl Drop for InputPollers {
    // Dropping may happen on a poller thread when it held the last toolkit
    // handle, so only signal here; joining is left to `stop`.
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Logs the first failure of a streak and stays quiet until a poll succeeds.
#[derive(Default)]
struct FailureStreak {
    failing: bool,
}

impl FailureStreak {
    fn record<T>(&mut self, source: &'static str, result: io::Result<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.failing = false;
                Some(value)
            }
            Err(err) => {
                if !self.failing {
                    tracing::warn!(source, %err, "input driver failed");
                }
                self.failing = true;
                None
            }
        }
    }
}

fn keyboard_loop(weak: WeakToolkit, mut keyboard: Box<dyn KeyboardDriver>, stop: Arc<AtomicBool>) {
    let mut streak = FailureStreak::default();
    while !stop.load(Ordering::SeqCst) {
        let Some(toolkit) = weak.upgrade() else {
            break;
        };
        let interval = toolkit.config().poll_interval;
        if let Some(Some(key)) = streak.record("keyboard", keyboard.poll_key()) {
            deliver_key(&toolkit, key);
        }
        drop(toolkit);
        thread::sleep(interval);
    }
    tracing::trace!("keyboard poller exiting");
}

fn pointer_loop(weak: WeakToolkit, mut mouse: Box<dyn MouseDriver>, stop: Arc<AtomicBool>) {
    let Some(double_click) = weak.upgrade().map(|tk| tk.config().double_click_interval) else {
        return;
    };
    let mut translator = PointerTranslator::new(double_click);
    let mut streak = FailureStreak::default();
    let mut captured = false;
    while !stop.load(Ordering::SeqCst) {
        let Some(toolkit) = weak.upgrade() else {
            break;
        };
        let interval = toolkit.config().poll_interval;

        let wanted = match toolkit.take_mouse_capture_change() {
            Some(enabled) => enabled,
            None => toolkit.mouse_capture_enabled(),
        };
        if wanted != captured {
            let result = if wanted { mouse.enable() } else { mouse.disable() };
            if streak.record("pointer capture", result).is_some() {
                tracing::debug!(enabled = wanted, "pointer capture changed");
                captured = wanted;
            }
        }

        if captured
            && let Some(Some(event)) = streak.record("pointer", mouse.poll_mouse())
            && let Some(kind) = translator.translate(&event, Instant::now())
        {
            dispatch_pointer(&toolkit, kind, i32::from(event.column), i32::from(event.row));
        }
        drop(toolkit);
        thread::sleep(interval);
    }
    if captured && let Err(err) = mouse.disable() {
        tracing::warn!(%err, "failed to release pointer capture");
    }
    tracing::trace!("pointer poller exiting");
}

/// Deliver one key press the way the keyboard poller does: the redraw key
/// first repaints the whole screen, then every key is queued on the focused
/// window.
pub fn deliver_key(toolkit: &Toolkit, key: KeyEvent) {
    if toolkit.config().is_redraw_key(&key) {
        toolkit.redisplay_full(toolkit.root());
    }
    if let Some(focus) = toolkit.focus() {
        toolkit.send_message(focus, Message::key(key));
    }
}

/// Deliver a pointer press at the absolute screen cell `(x, y)` the way the
/// pointer poller does.
///
/// The deepest window under the point gets `kind` with window-local
/// coordinates; when that is not the focused window, the focused window is
/// also told the press landed outside it. Returns the resolved window, or
/// `None` when nothing is under the point or `kind` is not a button kind.
pub fn dispatch_pointer(toolkit: &Toolkit, kind: MessageKind, x: i32, y: i32) -> Option<WindowId> {
    if !kind.is_pointer_button() {
        tracing::warn!(?kind, "not a pointer button kind");
        return None;
    }
    let target = toolkit.window_at(x, y)?;
    let geometry = toolkit.geometry(target)?;
    let focus = toolkit.focus();
    tracing::trace!(?kind, x, y, window = ?target, "pointer press");
    toolkit.send_message(
        target,
        Message::pointer(kind, x - geometry.abs_x, y - geometry.abs_y),
    );
    if let Some(focus) = focus
        && focus != target
    {
        toolkit.send_message(focus, Message::outside_focus());
    }
    Some(target)
}
