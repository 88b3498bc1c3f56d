//! Color pair allocation.
//!
//! Widgets ask for a `(foreground, background)` combination and get back a
//! small integer id, the way curses-style code addresses colors. Ids start at
//! `1`; `0` means "no pair available, use the default attributes".

use ratatui::style::{Color, Style};

use crate::constants::NO_COLOR_PAIR;

/// Append-only table of allocated pairs. Lives as long as the root window.
#[derive(Debug, Clone)]
pub struct ColorPairs {
    pairs: Vec<(Color, Color)>,
    max_pairs: u16,
}

impl ColorPairs {
    /// `max_pairs` is the pair count advertised by the terminal, including
    /// the reserved pair `0`.
    pub fn new(max_pairs: u16) -> Self {
        Self {
            pairs: Vec::new(),
            max_pairs,
        }
    }

    /// Return the id of the `(fg, bg)` pair, registering it on first use.
    ///
    /// Returns [`NO_COLOR_PAIR`] once the table is full; the existing
    /// entries are left untouched.
    pub fn allocate(&mut self, fg: Color, bg: Color) -> u16 {
        if let Some(idx) = self.pairs.iter().position(|&pair| pair == (fg, bg)) {
            return idx as u16 + 1;
        }
        if (self.pairs.len() as u32) < u32::from(self.max_pairs).saturating_sub(1) {
            self.pairs.push((fg, bg));
            return self.pairs.len() as u16;
        }
        tracing::debug!(?fg, ?bg, max = self.max_pairs, "color pair table exhausted");
        NO_COLOR_PAIR
    }

    pub fn pair_content(&self, id: u16) -> Option<(Color, Color)> {
        if id == NO_COLOR_PAIR {
            return None;
        }
        self.pairs.get(usize::from(id) - 1).copied()
    }

    /// Style for a pair id. Unknown ids and the sentinel map to the default
    /// style.
    pub fn style(&self, id: u16) -> Style {
        match self.pair_content(id) {
            Some((fg, bg)) => Style::default().fg(fg).bg(bg),
            None => Style::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
