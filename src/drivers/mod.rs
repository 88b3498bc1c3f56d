//! Terminal drivers: where composited screens go and where keys and pointer
//! events come from.

pub mod console;
pub mod headless;
pub mod keyboard;
pub mod mouse;

use std::io;

use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Size};

pub use keyboard::{KeyboardDriver, KeyboardNormalizer};
pub use mouse::{MouseDriver, PointerTranslator};

/// Sink for composited screens.
pub trait OutputDriver: Send {
    /// Take over the terminal. Idempotent.
    fn enter(&mut self) -> io::Result<()>;
    /// Hand the terminal back. Idempotent.
    fn exit(&mut self) -> io::Result<()>;
    fn size(&mut self) -> io::Result<Size>;
    /// Make `screen` visible, placing the terminal cursor at `cursor` or
    /// hiding it.
    fn commit(&mut self, screen: &Buffer, cursor: Option<Position>) -> io::Result<()>;
    /// Forget what is on the terminal so the next commit repaints every cell.
    fn invalidate(&mut self) -> io::Result<()>;
}
