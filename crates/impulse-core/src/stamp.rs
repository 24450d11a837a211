//! Wall-clock stamps passed into the state machine.
//!
//! The machine never reads the clock itself; the driver captures a
//! [`Stamp`] per event and passes it in, which keeps the machine pure
//! and lets tests pin time.

use chrono::Local;

/// One captured instant: epoch seconds for the wire, a local `HH:mm`
/// string for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// Seconds since the Unix epoch.
    pub unix: u64,
    /// Local wall-clock time, formatted `HH:mm`.
    pub clock: String,
}

impl Stamp {
    /// Capture the current local time.
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            unix: u64::try_from(now.timestamp()).unwrap_or(0),
            clock: now.format("%H:%M").to_string(),
        }
    }

    /// A pinned stamp for deterministic tests.
    pub fn fixed(unix: u64, clock: &str) -> Self {
        Self { unix, clock: clock.to_string() }
    }
}
