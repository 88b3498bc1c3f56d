//! In-memory drivers for running a toolkit without a terminal.
//!
//! The output driver records what would have been shown; the scripted input
//! drivers replay events pushed through cloned handles.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect, Size};

use super::keyboard::KeyboardDriver;
use super::mouse::MouseDriver;
use super::OutputDriver;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}

#[derive(Debug)]
struct Recorded {
    size: Size,
    screen: Buffer,
    cursor: Option<Position>,
    commits: usize,
    invalidations: usize,
    entered: bool,
}

/// Read side of a [`HeadlessOutputDriver`], usable after the driver has been
/// moved into a toolkit.
#[derive(Debug, Clone)]
pub struct HeadlessScreen {
    inner: Arc<Mutex<Recorded>>,
}

impl HeadlessScreen {
    pub fn commits(&self) -> usize {
        lock(&self.inner).commits
    }

    pub fn invalidations(&self) -> usize {
        lock(&self.inner).invalidations
    }

    pub fn cursor(&self) -> Option<Position> {
        lock(&self.inner).cursor
    }

    pub fn entered(&self) -> bool {
        lock(&self.inner).entered
    }

    /// Last committed screen.
    pub fn snapshot(&self) -> Buffer {
        lock(&self.inner).screen.clone()
    }

    /// Symbols of row `y` of the last committed screen, concatenated.
    pub fn row(&self, y: u16) -> String {
        let recorded = lock(&self.inner);
        let area = recorded.screen.area;
        (area.x..area.x + area.width)
            .filter_map(|x| recorded.screen.cell((x, y)))
            .map(|cell| cell.symbol())
            .collect()
    }
}

pub struct HeadlessOutputDriver {
    inner: Arc<Mutex<Recorded>>,
}

impl HeadlessOutputDriver {
    pub fn new(width: u16, height: u16) -> Self {
        let area = Rect::new(0, 0, width, height);
        Self {
            inner: Arc::new(Mutex::new(Recorded {
                size: Size::new(width, height),
                screen: Buffer::empty(area),
                cursor: None,
                commits: 0,
                invalidations: 0,
                entered: false,
            })),
        }
    }

    pub fn screen(&self) -> HeadlessScreen {
        HeadlessScreen {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl OutputDriver for HeadlessOutputDriver {
    fn enter(&mut self) -> io::Result<()> {
        lock(&self.inner).entered = true;
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        lock(&self.inner).entered = false;
        Ok(())
    }

    fn size(&mut self) -> io::Result<Size> {
        Ok(lock(&self.inner).size)
    }

    fn commit(&mut self, screen: &Buffer, cursor: Option<Position>) -> io::Result<()> {
        let mut recorded = lock(&self.inner);
        recorded.screen = screen.clone();
        recorded.cursor = cursor;
        recorded.commits += 1;
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        lock(&self.inner).invalidations += 1;
        Ok(())
    }
}

/// Key source fed from a shared queue; clones push into the same queue.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeyboard {
    keys: Arc<Mutex<VecDeque<KeyEvent>>>,
}

impl ScriptedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, key: KeyEvent) {
        lock(&self.keys).push_back(key);
    }

    pub fn pending(&self) -> usize {
        lock(&self.keys).len()
    }
}

impl KeyboardDriver for ScriptedKeyboard {
    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>> {
        Ok(lock(&self.keys).pop_front())
    }
}

#[derive(Debug, Default)]
struct MouseScript {
    events: VecDeque<MouseEvent>,
    enabled: bool,
    enables: usize,
    disables: usize,
}

/// Pointer source fed from a shared queue. Events are only delivered while
/// capture is enabled.
#[derive(Debug, Clone, Default)]
pub struct ScriptedMouse {
    script: Arc<Mutex<MouseScript>>,
}

impl ScriptedMouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: MouseEvent) {
        lock(&self.script).events.push_back(event);
    }

    pub fn pending(&self) -> usize {
        lock(&self.script).events.len()
    }

    pub fn enabled(&self) -> bool {
        lock(&self.script).enabled
    }

    /// `(enable calls, disable calls)` so far.
    pub fn toggles(&self) -> (usize, usize) {
        let script = lock(&self.script);
        (script.enables, script.disables)
    }
}

impl MouseDriver for ScriptedMouse {
    fn enable(&mut self) -> io::Result<()> {
        let mut script = lock(&self.script);
        script.enabled = true;
        script.enables += 1;
        Ok(())
    }

    fn disable(&mut self) -> io::Result<()> {
        let mut script = lock(&self.script);
        script.enabled = false;
        script.disables += 1;
        Ok(())
    }

    fn poll_mouse(&mut self) -> io::Result<Option<MouseEvent>> {
        let mut script = lock(&self.script);
        if !script.enabled {
            return Ok(None);
        }
        Ok(script.events.pop_front())
    }
}
