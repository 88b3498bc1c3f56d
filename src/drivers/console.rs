use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, MouseEvent};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Size};

use super::keyboard::{KeyboardDriver, KeyboardNormalizer};
use super::mouse::MouseDriver;
use super::OutputDriver;
use crate::ui::UiFrame;

/// Reads the process-wide crossterm event stream for both pollers.
///
/// Wrap it in `Arc<Mutex<_>>` and hand one clone to each poller: whichever
/// poller reads an event meant for the other parks it in the side queue.
/// Pointer events are only parked while pointer capture is on.
pub struct ConsoleInputDriver {
    normalizer: KeyboardNormalizer,
    event_queue: VecDeque<Event>,
    pointer_enabled: bool,
}

impl Default for ConsoleInputDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleInputDriver {
    pub fn new() -> Self {
        Self {
            normalizer: KeyboardNormalizer::new(),
            event_queue: VecDeque::new(),
            pointer_enabled: false,
        }
    }

    fn park(&mut self, evt: Event) {
        match evt {
            Event::Key(_) => self.event_queue.push_back(evt),
            Event::Mouse(_) if self.pointer_enabled => self.event_queue.push_back(evt),
            _ => {}
        }
    }

    fn set_pointer_enabled(&mut self, enabled: bool) {
        self.pointer_enabled = enabled;
        if !enabled {
            self.event_queue.retain(|evt| !matches!(evt, Event::Mouse(_)));
        }
    }

    fn take_queued<T>(&mut self, pick: impl Fn(&Event) -> Option<T>) -> Option<T> {
        let index = self.event_queue.iter().position(|e| pick(e).is_some())?;
        self.event_queue.remove(index).and_then(|e| pick(&e))
    }

    /// Read everything crossterm has ready, returning the first event `pick`
    /// accepts and parking other key and pointer events.
    fn read_ready<T>(&mut self, pick: impl Fn(&Event) -> Option<T>) -> io::Result<Option<T>> {
        if let Some(found) = self.take_queued(&pick) {
            return Ok(Some(found));
        }
        while crossterm::event::poll(Duration::ZERO)? {
            let evt = crossterm::event::read()?;
            let Some(evt) = self.normalizer.normalize(evt) else {
                continue;
            };
            if let Some(found) = pick(&evt) {
                return Ok(Some(found));
            }
            self.park(evt);
        }
        Ok(None)
    }
}

fn pick_key(evt: &Event) -> Option<KeyEvent> {
    match evt {
        Event::Key(key) => Some(*key),
        _ => None,
    }
}

fn pick_mouse(evt: &Event) -> Option<MouseEvent> {
    match evt {
        Event::Mouse(mouse) => Some(*mouse),
        _ => None,
    }
}

impl KeyboardDriver for ConsoleInputDriver {
    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>> {
        self.read_ready(pick_key)
    }
}

impl MouseDriver for ConsoleInputDriver {
    fn enable(&mut self) -> io::Result<()> {
        execute!(io::stdout(), EnableMouseCapture)?;
        self.set_pointer_enabled(true);
        Ok(())
    }

    fn disable(&mut self) -> io::Result<()> {
        self.set_pointer_enabled(false);
        execute!(io::stdout(), DisableMouseCapture)
    }

    fn poll_mouse(&mut self) -> io::Result<Option<MouseEvent>> {
        self.read_ready(pick_mouse)
    }
}

/// Owns the real terminal: raw mode, the alternate screen and a ratatui
/// `Terminal` whose diffing decides which cells are written.
pub struct ConsoleOutputDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    entered: bool,
}

impl ConsoleOutputDriver {
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            entered: false,
        })
    }
}

impl OutputDriver for ConsoleOutputDriver {
    fn enter(&mut self) -> io::Result<()> {
        if self.entered {
            return Ok(());
        }
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        self.entered = true;
        Ok(())
    }

    fn exit(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        self.entered = false;
        Ok(())
    }

    fn size(&mut self) -> io::Result<Size> {
        self.terminal.size()
    }

    fn commit(&mut self, screen: &Buffer, cursor: Option<Position>) -> io::Result<()> {
        self.terminal
            .draw(|frame| {
                UiFrame::new(frame).blit_from(screen, screen.area);
                if let Some(position) = cursor {
                    frame.set_cursor_position(position);
                }
            })
            .map(|_| ())
            .map_err(|err| io::Error::other(err.to_string()))
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.terminal.clear()
    }
}

impl Drop for ConsoleOutputDriver {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}
