//! The toolkit handle: owns the window tree and the process-wide state tied
//! to the root window's lifetime.
//!
//! Every window operation goes through a cloneable [`Toolkit`]. Clones share
//! one tree, one focus pointer, one color pair table and one terminal; the
//! two input pollers hold weak references to the same state.
//!
//! Lock discipline: the tree lock is never held while a handler, teardown
//! hook or nested loop runs. Handlers are cloned out of the tree first.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};

use crate::colors::ColorPairs;
use crate::config::ToolkitConfig;
use crate::display::{self, Display};
use crate::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use crate::drivers::OutputDriver;
use crate::error::WindowError;
use crate::event_loop::{DispatchLoop, LoopExit};
use crate::focus;
use crate::input::{InputPollers, InputSources};
use crate::message::{Message, MessageKind};
use crate::state::TerminalState;
use crate::surface::Surface;
use crate::window::{Geometry, Node, WindowFlags, WindowId, WindowTree};

/// Message handler. Runs on whichever thread delivered the message: the
/// dispatch loop for queued kinds, the sender for immediate kinds.
pub type Handler = Arc<dyn Fn(&Toolkit, WindowId, Message) + Send + Sync>;

/// Per-kind teardown, run once when the window is destroyed after all of
/// its children are gone.
pub type Teardown = Box<dyn FnOnce(&Toolkit, WindowId) + Send + Sync>;

pub(crate) struct Shared {
    config: ToolkitConfig,
    root: WindowId,
    tree: RwLock<WindowTree>,
    focus: Mutex<Option<WindowId>>,
    display: Display,
    terminal: Mutex<TerminalState>,
    colors: Mutex<ColorPairs>,
    pollers: Mutex<Option<InputPollers>>,
}

#[derive(Clone)]
pub struct Toolkit {
    shared: Arc<Shared>,
}

/// Non-owning toolkit handle held by the input pollers.
#[derive(Clone)]
pub(crate) struct WeakToolkit(Weak<Shared>);

impl WeakToolkit {
    pub(crate) fn upgrade(&self) -> Option<Toolkit> {
        self.0.upgrade().map(|shared| Toolkit { shared })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|err| err.into_inner())
}

pub(crate) fn default_handlers() -> HashMap<MessageKind, Handler> {
    let mut handlers: HashMap<MessageKind, Handler> = HashMap::new();
    handlers.insert(MessageKind::Close, Arc::new(focus::handle_close));
    handlers.insert(MessageKind::ChangeFocus, Arc::new(focus::handle_change_focus));
    handlers.insert(MessageKind::DeferredFree, Arc::new(handle_deferred_free));
    handlers
}

/// Stock deferred-free handler: the payload is dropped here, after it left
/// the queue.
pub fn handle_deferred_free(_toolkit: &Toolkit, window: WindowId, message: Message) {
    tracing::trace!(?window, payload = ?message.payload, "releasing deferred payload");
    drop(message);
}

impl Toolkit {
    /// Create the root window on an interactive console: raw mode, the
    /// alternate screen and both input pollers reading crossterm events.
    pub fn console(config: ToolkitConfig) -> Result<Self, WindowError> {
        let output = ConsoleOutputDriver::new()?;
        let input = Arc::new(Mutex::new(ConsoleInputDriver::new()));
        let sources = InputSources::new(Box::new(Arc::clone(&input)), Box::new(input));
        Self::new_root(config, Box::new(output), Some(sources))
    }

    /// Create the root window on `output`, sized to the terminal.
    ///
    /// When `input` is given, the keyboard and pointer pollers are spawned
    /// and run until the root is destroyed.
    pub fn new_root(
        config: ToolkitConfig,
        mut output: Box<dyn OutputDriver>,
        input: Option<InputSources>,
    ) -> Result<Self, WindowError> {
        output.enter()?;
        let size = match output.size() {
            Ok(size) => size,
            Err(err) => {
                let _ = output.exit();
                return Err(WindowError::TerminalInit(err));
            }
        };
        if size.width == 0 || size.height == 0 {
            let _ = output.exit();
            return Err(WindowError::InvalidGeometry {
                x: 0,
                y: 0,
                width: size.width,
                height: size.height,
            });
        }
        let geometry = Geometry {
            width: size.width,
            height: size.height,
            ..Geometry::default()
        };
        let mut tree = WindowTree::new();
        let root = tree.insert(None, Node::new(geometry, default_handlers()));
        let screen = Buffer::empty(Rect::new(0, 0, size.width, size.height));
        let shared = Arc::new(Shared {
            root,
            tree: RwLock::new(tree),
            focus: Mutex::new(None),
            display: Display::new(screen, output),
            terminal: Mutex::new(TerminalState::new(config.mouse_capture)),
            colors: Mutex::new(ColorPairs::new(config.max_color_pairs)),
            pollers: Mutex::new(None),
            config,
        });
        let toolkit = Toolkit { shared };
        if let Some(sources) = input {
            match InputPollers::spawn(&toolkit, sources) {
                Ok(pollers) => *lock(&toolkit.shared.pollers) = Some(pollers),
                Err(err) => {
                    let _ = toolkit.shared.display.state().output.exit();
                    return Err(err);
                }
            }
        }
        toolkit.insert_flags(root, WindowFlags::INITIALIZED);
        tracing::debug!(width = size.width, height = size.height, "root window created");
        Ok(toolkit)
    }

    pub(crate) fn downgrade(&self) -> WeakToolkit {
        WeakToolkit(Arc::downgrade(&self.shared))
    }

    pub(crate) fn tree(&self) -> RwLockReadGuard<'_, WindowTree> {
        self.shared.tree.read().unwrap_or_else(|err| err.into_inner())
    }

    fn tree_mut(&self) -> RwLockWriteGuard<'_, WindowTree> {
        self.shared.tree.write().unwrap_or_else(|err| err.into_inner())
    }

    pub(crate) fn shared_display(&self) -> &Display {
        &self.shared.display
    }

    pub(crate) fn terminal_state(&self) -> MutexGuard<'_, TerminalState> {
        lock(&self.shared.terminal)
    }

    pub fn config(&self) -> &ToolkitConfig {
        &self.shared.config
    }

    pub fn root(&self) -> WindowId {
        self.shared.root
    }

    /// Create a window at `(x, y)` relative to `parent`, appended to the end
    /// of the parent's child list.
    ///
    /// Fails when the parent is gone or the surface would be empty or fall
    /// outside the root.
    pub fn create_child(
        &self,
        parent: WindowId,
        x: i32,
        y: i32,
        width: u16,
        height: u16,
    ) -> Result<WindowId, WindowError> {
        let mut tree = self.tree_mut();
        let parent_geometry = tree
            .get(parent)
            .map(|node| node.geometry)
            .ok_or(WindowError::MissingParent(parent))?;
        let screen = tree
            .get(self.shared.root)
            .map(|node| node.geometry)
            .unwrap_or_default();
        let invalid = |abs_x: i32, abs_y: i32| WindowError::InvalidGeometry {
            x: abs_x,
            y: abs_y,
            width,
            height,
        };
        let (Some(abs_x), Some(abs_y)) = (
            parent_geometry.abs_x.checked_add(x),
            parent_geometry.abs_y.checked_add(y),
        ) else {
            return Err(invalid(x, y));
        };
        let right = abs_x.checked_add(i32::from(width));
        let bottom = abs_y.checked_add(i32::from(height));
        let fits = width > 0
            && height > 0
            && abs_x >= 0
            && abs_y >= 0
            && right.is_some_and(|right| right <= i32::from(screen.width))
            && bottom.is_some_and(|bottom| bottom <= i32::from(screen.height));
        if !fits {
            return Err(invalid(abs_x, abs_y));
        }
        let geometry = Geometry {
            x,
            y,
            abs_x,
            abs_y,
            width,
            height,
        };
        let mut node = Node::new(geometry, default_handlers());
        node.flags = WindowFlags::INITIALIZED;
        let id = tree.insert(Some(parent), node);
        tracing::debug!(window = ?id, ?parent, x, y, width, height, "window created");
        Ok(id)
    }

    /// Destroy `window` and its whole subtree.
    ///
    /// Children go first, depth-first in list order; each window is unlinked
    /// from its parent before its teardown runs and its slot is released.
    /// Destroying the root also stops the input pollers and restores the
    /// terminal. Must not be called from a poller thread.
    pub fn destroy(&self, window: WindowId) {
        if !self.is_live(window) {
            return;
        }
        self.tree_mut().unlink(window);
        let children = self.tree().children(window);
        for child in children {
            self.destroy(child);
        }
        let (teardown, queue) = {
            let mut tree = self.tree_mut();
            let Some(node) = tree.get_mut(window) else {
                return;
            };
            (node.teardown.take(), Arc::clone(&node.queue))
        };
        if let Some(teardown) = teardown {
            teardown(self, window);
        }
        let dropped = queue.drain().len();
        if window == self.shared.root {
            self.shutdown_terminal();
        }
        {
            let mut focus = lock(&self.shared.focus);
            if *focus == Some(window) {
                *focus = None;
            }
        }
        self.tree_mut().remove(window);
        tracing::debug!(?window, dropped, "window destroyed");
    }

    fn shutdown_terminal(&self) {
        let pollers = lock(&self.shared.pollers).take();
        if let Some(pollers) = pollers {
            pollers.stop();
        }
        if let Err(err) = self.shared.display.state().output.exit() {
            tracing::warn!(%err, "failed to restore terminal");
        }
    }

    pub fn is_live(&self, window: WindowId) -> bool {
        self.tree().contains(window)
    }

    pub fn window_count(&self) -> usize {
        self.tree().len()
    }

    /// Install `handler` for `kind`, replacing any previous one.
    pub fn register_handler<F>(&self, window: WindowId, kind: MessageKind, handler: F)
    where
        F: Fn(&Toolkit, WindowId, Message) + Send + Sync + 'static,
    {
        if let Some(node) = self.tree_mut().get_mut(window) {
            node.handlers.insert(kind, Arc::new(handler));
        }
    }

    pub fn remove_handler(&self, window: WindowId, kind: MessageKind) {
        if let Some(node) = self.tree_mut().get_mut(window) {
            node.handlers.remove(&kind);
        }
    }

    /// Stock handler for `kind`, for overrides that want to chain to it.
    pub fn default_handler(kind: MessageKind) -> Option<Handler> {
        default_handlers().remove(&kind)
    }

    pub fn set_teardown<F>(&self, window: WindowId, teardown: F)
    where
        F: FnOnce(&Toolkit, WindowId) + Send + Sync + 'static,
    {
        if let Some(node) = self.tree_mut().get_mut(window) {
            node.teardown = Some(Box::new(teardown));
        }
    }

    /// Deliver `message` to `window`.
    ///
    /// Display requests redraw the whole tree right away; notify and pointer
    /// button messages run their handler synchronously on the calling
    /// thread. Everything else is appended to the window's queue.
    pub fn send_message(&self, window: WindowId, message: Message) {
        if !self.is_live(window) {
            return;
        }
        match message.kind {
            MessageKind::Display => self.display(self.shared.root),
            kind if kind.is_immediate() => self.invoke(window, message),
            _ => {
                let queue = self.tree().get(window).map(|node| Arc::clone(&node.queue));
                if let Some(queue) = queue {
                    queue.push(message);
                }
            }
        }
    }

    /// Pop the oldest queued message without waiting.
    pub fn receive(&self, window: WindowId) -> Option<Message> {
        let queue = self.tree().get(window).map(|node| Arc::clone(&node.queue))?;
        queue.pop()
    }

    pub fn pending_messages(&self, window: WindowId) -> usize {
        self.tree()
            .get(window)
            .map(|node| node.queue.len())
            .unwrap_or(0)
    }

    /// Run the handler registered for the message kind; unregistered kinds
    /// are ignored.
    pub(crate) fn invoke(&self, window: WindowId, message: Message) {
        let handler = self
            .tree()
            .get(window)
            .and_then(|node| node.handlers.get(&message.kind).cloned());
        if let Some(handler) = handler {
            handler(self, window, message);
        }
    }

    pub(crate) fn display_handler(&self, window: WindowId) -> Option<Handler> {
        self.tree()
            .get(window)
            .and_then(|node| node.handlers.get(&MessageKind::Display).cloned())
    }

    /// Run the dispatch loop of `window` on the current thread until it
    /// closes or hands focus back to its dialog.
    pub fn run_loop(&self, window: WindowId) -> LoopExit {
        DispatchLoop::new(self, window).run()
    }

    /// Composite `window` and its subtree; commits to the terminal when
    /// `window` is the root.
    pub fn display(&self, window: WindowId) {
        display::display(self, window);
    }

    /// Clear the window's screen region and repaint it from scratch,
    /// bypassing the terminal diff.
    pub fn redisplay_full(&self, window: WindowId) {
        display::redisplay_full(self, window);
    }

    /// Hand the terminal to an external process: blank the screen, leave
    /// raw mode and the alternate screen. Commits are skipped until
    /// [`Toolkit::restore`].
    pub fn suspend(&self) -> io::Result<()> {
        display::suspend(self)
    }

    pub fn restore(&self) -> io::Result<()> {
        display::restore(self)
    }

    pub fn is_suspended(&self) -> bool {
        self.terminal_state().suspended()
    }

    pub fn focus(&self) -> Option<WindowId> {
        *lock(&self.shared.focus)
    }

    pub fn is_focused(&self, window: WindowId) -> bool {
        self.focus() == Some(window)
    }

    pub(crate) fn set_focus(&self, window: Option<WindowId>) {
        let mut focus = lock(&self.shared.focus);
        if *focus != window {
            tracing::trace!(from = ?*focus, to = ?window, "focus changed");
            *focus = window;
        }
    }

    /// Direct child of `window` whose subtree holds the focused window.
    pub fn find_focus_branch(&self, window: WindowId) -> Option<WindowId> {
        let focus = self.focus();
        self.tree().find_focus_branch(window, focus)
    }

    /// Deepest window under the absolute screen point.
    pub fn window_at(&self, x: i32, y: i32) -> Option<WindowId> {
        let focus = self.focus();
        self.tree().window_at(self.shared.root, focus, x, y)
    }

    /// Select the dialog's current item and run its loop; see
    /// [`focus::handle_change_focus`].
    pub fn change_focus(&self, dialog: WindowId, requested: Option<WindowId>) -> Option<LoopExit> {
        let item = self.select_item(dialog, requested)?;
        Some(self.run_loop(item))
    }

    /// Update the dialog's current item without running it.
    pub fn select_item(&self, dialog: WindowId, requested: Option<WindowId>) -> Option<WindowId> {
        focus::select_item(&mut self.tree_mut(), dialog, requested)
    }

    pub fn current_item(&self, dialog: WindowId) -> Option<WindowId> {
        self.tree().get(dialog).and_then(|node| node.current_item)
    }

    /// Closest focusable sibling before `item`, wrapping around.
    pub fn previous_item(&self, item: WindowId) -> Option<WindowId> {
        focus::previous_focusable(&self.tree(), item)
    }

    pub fn flags(&self, window: WindowId) -> WindowFlags {
        self.tree().flags(window)
    }

    pub fn set_flags(&self, window: WindowId, flags: WindowFlags) {
        if let Some(node) = self.tree_mut().get_mut(window) {
            node.flags = flags;
        }
    }

    pub fn insert_flags(&self, window: WindowId, flags: WindowFlags) {
        if let Some(node) = self.tree_mut().get_mut(window) {
            node.flags.insert(flags);
        }
    }

    pub fn remove_flags(&self, window: WindowId, flags: WindowFlags) {
        if let Some(node) = self.tree_mut().get_mut(window) {
            node.flags.remove(flags);
        }
    }

    pub fn is_dialog_item(&self, window: WindowId) -> bool {
        self.tree().is_dialog_item(window)
    }

    pub fn parent(&self, window: WindowId) -> Option<WindowId> {
        self.tree().get(window).and_then(|node| node.parent)
    }

    pub fn children(&self, window: WindowId) -> Vec<WindowId> {
        self.tree().children(window)
    }

    pub fn child_id(&self, window: WindowId) -> Option<i16> {
        self.tree().get(window).map(|node| node.child_id)
    }

    pub fn set_child_id(&self, window: WindowId, child_id: i16) {
        if let Some(node) = self.tree_mut().get_mut(window) {
            node.child_id = child_id;
        }
    }

    pub fn find_child_by_id(&self, parent: WindowId, child_id: i16) -> Option<WindowId> {
        self.tree().find_child_by_id(parent, child_id)
    }

    pub fn geometry(&self, window: WindowId) -> Option<Geometry> {
        self.tree().get(window).map(|node| node.geometry)
    }

    /// True iff the absolute point lies inside the window's rectangle.
    pub fn point_belongs(&self, window: WindowId, x: i32, y: i32) -> bool {
        self.tree().point_belongs(window, x, y)
    }

    /// Cursor position inside the window's surface; origin for dead handles.
    pub fn cursor(&self, window: WindowId) -> Position {
        self.with_surface(window, |surface| surface.cursor())
            .unwrap_or(Position::ORIGIN)
    }

    /// Run `f` on the window's surface. Returns `None` for dead handles.
    pub fn with_surface<R>(&self, window: WindowId, f: impl FnOnce(&mut Surface) -> R) -> Option<R> {
        let surface = self.tree().get(window).map(|node| Arc::clone(&node.surface))?;
        let mut guard = lock(&surface);
        Some(f(&mut guard))
    }

    pub(crate) fn surface_handle(&self, window: WindowId) -> Option<Arc<Mutex<Surface>>> {
        self.tree().get(window).map(|node| Arc::clone(&node.surface))
    }

    /// Id of the `(fg, bg)` color pair; `0` once the table is full.
    pub fn init_pair(&self, fg: Color, bg: Color) -> u16 {
        lock(&self.shared.colors).allocate(fg, bg)
    }

    pub fn pair_style(&self, pair: u16) -> Style {
        lock(&self.shared.colors).style(pair)
    }

    pub fn pair_content(&self, pair: u16) -> Option<(Color, Color)> {
        lock(&self.shared.colors).pair_content(pair)
    }

    /// Request a pointer capture change; the pointer poller re-initializes
    /// its source on its next iteration.
    pub fn set_mouse_capture(&self, enabled: bool) {
        self.terminal_state().set_mouse_capture_enabled(enabled);
    }

    pub fn mouse_capture_enabled(&self) -> bool {
        self.terminal_state().mouse_capture_enabled()
    }

    pub(crate) fn take_mouse_capture_change(&self) -> Option<bool> {
        self.terminal_state().take_mouse_capture_change()
    }
}
