//! Errors surfaced by window construction.
//!
//! Only resource allocation can fail. Queue, focus and display operations on
//! a handle that is dead or not yet initialized are no-ops and return neutral
//! values instead of errors.

use std::io;

use thiserror::Error;

use crate::window::WindowId;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("terminal initialization failed: {0}")]
    TerminalInit(#[from] io::Error),
    #[error("cannot allocate a {width}x{height} surface at ({x}, {y})")]
    InvalidGeometry {
        x: i32,
        y: i32,
        width: u16,
        height: u16,
    },
    #[error("parent window {0:?} does not exist")]
    MissingParent(WindowId),
    #[error("failed to spawn {name} poller: {source}")]
    PollerSpawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}
