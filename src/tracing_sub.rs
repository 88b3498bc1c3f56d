//! Subscriber setup. The composited screen owns stdout and stderr shares the
//! same terminal, so applications point logs at a file while a root window
//! is live.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;

static LOG_FILE: OnceLock<Arc<Mutex<File>>> = OnceLock::new();

fn global_log_file() -> Option<Arc<Mutex<File>>> {
    LOG_FILE.get().cloned()
}

/// Route subsequent log lines to `path`, appending. Only the first call
/// takes effect.
pub fn set_log_file(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = LOG_FILE.set(Arc::new(Mutex::new(file)));
    Ok(())
}

pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(Arc<Mutex<File>>),
    Stderr(io::Stderr),
}

impl DelegatingWriter {
    fn new() -> Self {
        let inner = match global_log_file() {
            Some(file) => DelegatingInner::File(file),
            None => DelegatingInner::Stderr(io::stderr()),
        };
        DelegatingWriter { inner }
    }
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(f) => f.lock().unwrap_or_else(|e| e.into_inner()).write(buf),
            DelegatingInner::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(f) => f.lock().unwrap_or_else(|e| e.into_inner()).flush(),
            DelegatingInner::Stderr(s) => s.flush(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SubscriberMakeWriter;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DelegatingWriter::new()
    }
}

/// Initialize the global subscriber, writing to the log file when one is
/// set and to stderr otherwise. Later calls are no-ops.
pub fn init_default() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(SubscriberMakeWriter)
        .with_target(false)
        .with_thread_names(true)
        .with_ansi(false)
        .try_init();
}

/// [`set_log_file`] followed by [`init_default`].
pub fn init_with_file(path: &Path) -> io::Result<()> {
    set_log_file(path)?;
    init_default();
    Ok(())
}
