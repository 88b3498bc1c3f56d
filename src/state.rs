/// Process-wide terminal flags shared by the display engine and the pointer
/// poller.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalState {
    suspended: bool,
    mouse_capture_enabled: bool,
    mouse_capture_dirty: bool,
}

impl TerminalState {
    pub fn new(mouse_capture: bool) -> Self {
        Self {
            suspended: false,
            mouse_capture_enabled: mouse_capture,
            mouse_capture_dirty: false,
        }
    }

    /// True while the terminal is handed to an external process; commits to
    /// the physical screen are skipped.
    pub fn suspended(&self) -> bool {
        self.suspended
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn mouse_capture_enabled(&self) -> bool {
        self.mouse_capture_enabled
    }

    pub fn set_mouse_capture_enabled(&mut self, enabled: bool) {
        if self.mouse_capture_enabled == enabled {
            return;
        }
        self.mouse_capture_enabled = enabled;
        self.mouse_capture_dirty = true;
    }

    /// Pending capture change, consumed by the pointer poller.
    pub fn take_mouse_capture_change(&mut self) -> Option<bool> {
        if self.mouse_capture_dirty {
            self.mouse_capture_dirty = false;
            Some(self.mouse_capture_enabled)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_capture_toggle_and_take_change() {
        let mut s = TerminalState::new(true);
        assert!(s.mouse_capture_enabled());
        s.set_mouse_capture_enabled(true);
        // no change -> None
        assert!(s.take_mouse_capture_change().is_none());
        s.set_mouse_capture_enabled(false);
        assert_eq!(s.take_mouse_capture_change(), Some(false));
        // consumed
        assert!(s.take_mouse_capture_change().is_none());
    }

    #[test]
    fn suspension_flag() {
        let mut s = TerminalState::new(false);
        assert!(!s.suspended());
        s.set_suspended(true);
        assert!(s.suspended());
    }
}
