mod queue;
mod tree;

use bitflags::bitflags;
use ratatui::layout::Rect;

pub use queue::MessageQueue;
pub(crate) use tree::{Node, WindowTree};

/// Stable handle to a window in the tree.
///
/// The generation makes handles of destroyed windows stale instead of
/// aliasing whatever window later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId {
    index: u32,
    generation: u32,
}

impl WindowId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WindowFlags: u32 {
        /// Set once construction completed; display skips windows without it.
        const INITIALIZED = 1 << 0;
        /// Owns a current item among its children and runs nested loops on it.
        const DIALOG = 1 << 1;
        /// Focusable child of a dialog; close and change-focus bubble up.
        const ITEM = 1 << 2;
        /// Skipped by dialog focus traversal.
        const NO_FOCUS = 1 << 3;
        /// Item that consumes Tab/BackTab itself instead of moving focus.
        const WANTS_TAB = 1 << 4;
        /// Item that consumes Enter itself instead of closing the dialog.
        const WANTS_ENTER = 1 << 5;
    }
}

/// Window placement. `x`/`y` are relative to the parent; `abs_x`/`abs_y`
/// are the parent's absolute offset plus the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub abs_x: i32,
    pub abs_y: i32,
    pub width: u16,
    pub height: u16,
}

impl Geometry {
    /// True iff the absolute point lies in `[abs_x, abs_x + width) x
    /// [abs_y, abs_y + height)`.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.abs_x
            && x < self.abs_x + self.width as i32
            && y >= self.abs_y
            && y < self.abs_y + self.height as i32
    }

    /// Absolute rectangle, or `None` when any part lies at a negative offset.
    pub fn screen_rect(&self) -> Option<Rect> {
        let x = u16::try_from(self.abs_x).ok()?;
        let y = u16::try_from(self.abs_y).ok()?;
        Some(Rect::new(x, y, self.width, self.height))
    }
}
