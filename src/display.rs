//! Display engine: composites the window tree into the screen buffer and
//! commits it to the terminal.
//!
//! Children are drawn in list order except the branch holding the focused
//! window, which is drawn last. Its surfaces end up on top and its cursor is
//! the one left on screen.

use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ratatui::buffer::Buffer;
use ratatui::layout::Position;

use crate::drivers::OutputDriver;
use crate::message::Message;
use crate::toolkit::Toolkit;
use crate::ui::UiFrame;
use crate::window::{WindowFlags, WindowId};

/// Pending screen contents plus the terminal they are committed to.
pub(crate) struct DisplayState {
    screen: Buffer,
    cursor: Option<Position>,
    pub(crate) output: Box<dyn OutputDriver>,
}

impl DisplayState {
    fn commit(&mut self) {
        if let Err(err) = self.output.commit(&self.screen, self.cursor) {
            tracing::warn!(%err, "failed to commit screen");
        }
    }
}

/// The display lock and the screen state it serializes.
///
/// `pass` is held for a whole pass over the root, and by suspend and
/// restore. `state` is only held while a surface is flushed or the screen
/// is committed, never while a display handler runs, so a handler may
/// display one of its descendants.
pub(crate) struct Display {
    pass: Mutex<()>,
    state: Mutex<DisplayState>,
}

impl Display {
    pub(crate) fn new(screen: Buffer, output: Box<dyn OutputDriver>) -> Self {
        Self {
            pass: Mutex::new(()),
            state: Mutex::new(DisplayState {
                screen,
                cursor: None,
                output,
            }),
        }
    }

    fn lock_pass(&self) -> MutexGuard<'_, ()> {
        self.pass.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, DisplayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Display `window` and its subtree. A pass over the root takes the display
/// lock, resets the cursor and commits, unless the terminal is suspended.
///
/// Display handlers may display their own descendants. Displaying the root
/// from inside a display handler deadlocks.
pub(crate) fn display(toolkit: &Toolkit, window: WindowId) {
    let display = toolkit.shared_display();
    if window != toolkit.root() {
        display_node(toolkit, window);
        return;
    }
    let _pass = display.lock_pass();
    display.state().cursor = None;
    display_node(toolkit, window);
    if !toolkit.is_suspended() {
        display.state().commit();
    }
}

fn display_node(toolkit: &Toolkit, window: WindowId) {
    if !toolkit.flags(window).contains(WindowFlags::INITIALIZED) {
        return;
    }
    if let Some(handler) = toolkit.display_handler(window) {
        handler(toolkit, window, Message::display());
        flush_surface(toolkit, window);
    }
    let focus_child = toolkit.find_focus_branch(window);
    for child in toolkit.children(window) {
        if Some(child) != focus_child {
            display_node(toolkit, child);
        }
    }
    if let Some(child) = focus_child {
        display_node(toolkit, child);
    }
}

/// Copy the window's surface into the pending screen at its absolute
/// offset.
fn flush_surface(toolkit: &Toolkit, window: WindowId) {
    let (Some(geometry), Some(surface)) = (toolkit.geometry(window), toolkit.surface_handle(window))
    else {
        return;
    };
    let surface = surface.lock().unwrap_or_else(PoisonError::into_inner);
    let mut state = toolkit.shared_display().state();
    let state = &mut *state;
    let area = state.screen.area;
    UiFrame::from_parts(area, &mut state.screen).blit_at(
        surface.buffer(),
        geometry.abs_x,
        geometry.abs_y,
    );
    if surface.cursor_visible() {
        let cursor = surface.cursor();
        let x = geometry.abs_x + cursor.x as i32;
        let y = geometry.abs_y + cursor.y as i32;
        state.cursor = match (u16::try_from(x), u16::try_from(y)) {
            (Ok(x), Ok(y)) if area.contains(Position { x, y }) => Some(Position { x, y }),
            _ => None,
        };
    }
}

/// Blank the window's region, force the terminal to repaint every cell and
/// redraw the subtree.
pub(crate) fn redisplay_full(toolkit: &Toolkit, window: WindowId) {
    let Some(geometry) = toolkit.geometry(window) else {
        return;
    };
    let display = toolkit.shared_display();
    let is_root = window == toolkit.root();
    let _pass = is_root.then(|| display.lock_pass());
    {
        let mut state = display.state();
        let state = &mut *state;
        if let Some(rect) = geometry.screen_rect() {
            let area = state.screen.area;
            UiFrame::from_parts(area, &mut state.screen).clear_rect(rect);
        }
        if is_root {
            state.cursor = None;
        }
        if toolkit.is_suspended() {
            return;
        }
        if let Err(err) = state.output.invalidate() {
            tracing::warn!(%err, "failed to invalidate terminal");
        }
    }
    display_node(toolkit, window);
    display.state().commit();
}

/// Blank the terminal and leave it for an external process.
pub(crate) fn suspend(toolkit: &Toolkit) -> io::Result<()> {
    let display = toolkit.shared_display();
    let _pass = display.lock_pass();
    if toolkit.is_suspended() {
        return Ok(());
    }
    toolkit.terminal_state().set_suspended(true);
    let mut state = display.state();
    let blank = Buffer::empty(state.screen.area);
    state.output.commit(&blank, None)?;
    tracing::debug!("terminal suspended");
    state.output.exit()
}

/// Take the terminal back and repaint everything.
pub(crate) fn restore(toolkit: &Toolkit) -> io::Result<()> {
    {
        let display = toolkit.shared_display();
        let _pass = display.lock_pass();
        if !toolkit.is_suspended() {
            return Ok(());
        }
        display.state().output.enter()?;
        toolkit.terminal_state().set_suspended(false);
    }
    tracing::debug!("terminal restored");
    redisplay_full(toolkit, toolkit.root());
    Ok(())
}
