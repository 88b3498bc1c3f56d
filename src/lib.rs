//! A hierarchical terminal windowing toolkit.
//!
//! Windows form a tree under one root that covers the terminal. Each window
//! owns an off-screen surface and a message queue drained by its own
//! dispatch loop; dialogs run their items' loops nested on the same stack.
//! Two background pollers turn keyboard and pointer input into messages.

pub mod colors;
pub mod config;
pub mod constants;
mod display;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod focus;
pub mod input;
pub mod message;
pub mod state;
pub mod surface;
pub mod toolkit;
pub mod tracing_sub;
pub mod ui;
pub mod window;

pub use config::ToolkitConfig;
pub use error::WindowError;
pub use event_loop::LoopExit;
pub use input::{InputSources, deliver_key, dispatch_pointer};
pub use message::{Message, MessageKind, Payload};
pub use toolkit::{Handler, Teardown, Toolkit};
pub use window::{Geometry, WindowFlags, WindowId};
