//! Shared crate-wide constants.

use std::time::Duration;

/// Sleep between two empty polls of a window queue or an input source.
///
/// Bounds the worst-case latency between an input event and its delivery to
/// the focused window. Keep it well below a frame (16 ms) so bursts of keys
/// do not visibly lag.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Two left presses on the same cell within this window count as a double
/// click.
pub const DEFAULT_DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(400);

/// Number of color pairs a typical 256-color terminal advertises.
///
/// Pair `0` is reserved for the default attributes, so at most
/// `DEFAULT_MAX_COLOR_PAIRS - 1` pairs are ever handed out.
pub const DEFAULT_MAX_COLOR_PAIRS: u16 = 256;

/// Returned by the color pair allocator when the table is full.
pub const NO_COLOR_PAIR: u16 = 0;

/// Child id assigned to windows that were never given one.
pub const UNASSIGNED_CHILD_ID: i16 = -1;
