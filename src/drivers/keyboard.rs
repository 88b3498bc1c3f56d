use std::io;
use std::sync::{Arc, Mutex};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Non-blocking key source polled by the keyboard poller.
pub trait KeyboardDriver: Send {
    /// Next pending key press, or `None` when nothing is waiting.
    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>>;
}

impl<T: KeyboardDriver + ?Sized> KeyboardDriver for Arc<Mutex<T>> {
    fn poll_key(&mut self) -> io::Result<Option<KeyEvent>> {
        self.lock()
            .unwrap_or_else(|err| err.into_inner())
            .poll_key()
    }
}

/// Cleans up raw key events before they become messages: Shift+Tab turns
/// into BackTab, releases and repeats are dropped, and Windows' doubled Esc
/// presses are folded into one.
#[derive(Default)]
pub struct KeyboardNormalizer {
    esc_down: bool,
}

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize(&mut self, evt: Event) -> Option<Event> {
        let Event::Key(key) = evt else {
            return Some(evt);
        };
        self.normalize_key(key).map(Event::Key)
    }

    pub fn normalize_key(&mut self, mut key: KeyEvent) -> Option<KeyEvent> {
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            key.code = KeyCode::BackTab;
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        match key.kind {
            KeyEventKind::Release => {
                if key.code == KeyCode::Esc {
                    self.esc_down = false;
                }
                return None;
            }
            KeyEventKind::Repeat => return None,
            KeyEventKind::Press => {}
        }
        if cfg!(windows) {
            if key.code == KeyCode::Esc {
                if self.esc_down {
                    return None;
                }
                self.esc_down = true;
            } else {
                self.esc_down = false;
            }
        }
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        let mut key = KeyEvent::new(code, modifiers);
        key.kind = kind;
        key
    }

    #[test]
    fn shift_tab_becomes_backtab() {
        let mut norm = KeyboardNormalizer::new();
        let out = norm
            .normalize_key(key(KeyCode::Tab, KeyModifiers::SHIFT, KeyEventKind::Press))
            .expect("press is kept");
        assert_eq!(out.code, KeyCode::BackTab);
        assert!(!out.modifiers.contains(KeyModifiers::SHIFT));
    }

    #[test]
    fn release_and_repeat_are_dropped() {
        let mut norm = KeyboardNormalizer::new();
        let a = KeyCode::Char('a');
        assert!(
            norm.normalize_key(key(a, KeyModifiers::NONE, KeyEventKind::Release))
                .is_none()
        );
        assert!(
            norm.normalize_key(key(a, KeyModifiers::NONE, KeyEventKind::Repeat))
                .is_none()
        );
    }

    #[test]
    fn non_key_events_pass_through() {
        let mut norm = KeyboardNormalizer::new();
        assert!(matches!(
            norm.normalize(Event::Resize(10, 20)),
            Some(Event::Resize(10, 20))
        ));
    }

    struct Fixed(Option<KeyEvent>);

    impl KeyboardDriver for Fixed {
        fn poll_key(&mut self) -> io::Result<Option<KeyEvent>> {
            Ok(self.0.take())
        }
    }

    #[test]
    fn shared_driver_delegates() {
        let inner = Fixed(Some(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)));
        let mut shared = Arc::new(Mutex::new(inner));
        let got = shared.poll_key().unwrap().expect("queued key");
        assert_eq!(got.code, KeyCode::Char('x'));
        assert!(shared.poll_key().unwrap().is_none());
    }
}
