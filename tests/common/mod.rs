#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use term_wnd::drivers::headless::{HeadlessOutputDriver, HeadlessScreen};
use term_wnd::{InputSources, Toolkit, ToolkitConfig};

pub fn headless(width: u16, height: u16) -> (Toolkit, HeadlessScreen) {
    headless_with(ToolkitConfig::default(), width, height, None)
}

pub fn headless_with(
    config: ToolkitConfig,
    width: u16,
    height: u16,
    input: Option<InputSources>,
) -> (Toolkit, HeadlessScreen) {
    let driver = HeadlessOutputDriver::new(width, height);
    let screen = driver.screen();
    let toolkit = Toolkit::new_root(config, Box::new(driver), input).unwrap();
    (toolkit, screen)
}

/// Shared event log written from handlers.
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
