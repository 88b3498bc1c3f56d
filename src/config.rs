use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::constants::{
    DEFAULT_DOUBLE_CLICK_INTERVAL, DEFAULT_MAX_COLOR_PAIRS, DEFAULT_POLL_INTERVAL,
};

/// Runtime knobs for a toolkit instance.
///
/// The values are fixed for the lifetime of the root window; they are copied
/// into the shared state when the root is created.
#[derive(Debug, Clone)]
pub struct ToolkitConfig {
    /// Sleep between empty polls, used by dispatch loops and input pollers.
    pub poll_interval: Duration,
    /// Key that forces a full redisplay of the root before being forwarded.
    pub redraw_key: KeyEvent,
    /// Color pair count advertised by the terminal, including pair `0`.
    pub max_color_pairs: u16,
    /// Whether pointer capture is enabled when the root is created.
    pub mouse_capture: bool,
    pub double_click_interval: Duration,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            redraw_key: KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL),
            max_color_pairs: DEFAULT_MAX_COLOR_PAIRS,
            mouse_capture: true,
            double_click_interval: DEFAULT_DOUBLE_CLICK_INTERVAL,
        }
    }
}

impl ToolkitConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        // A zero sleep turns every idle loop into a hot spin.
        self.poll_interval = interval.max(Duration::from_micros(10));
        self
    }

    pub fn with_max_color_pairs(mut self, max: u16) -> Self {
        self.max_color_pairs = max;
        self
    }

    pub fn with_mouse_capture(mut self, enabled: bool) -> Self {
        self.mouse_capture = enabled;
        self
    }

    pub fn with_redraw_key(mut self, key: KeyEvent) -> Self {
        self.redraw_key = key;
        self
    }

    /// True when `key` is the configured redraw key, ignoring event kind and
    /// keyboard-enhancement state bits.
    pub fn is_redraw_key(&self, key: &KeyEvent) -> bool {
        key.code == self.redraw_key.code && key.modifiers == self.redraw_key.modifiers
    }
}
