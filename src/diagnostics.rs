//! Scoped suppression of library diagnostics.
//!
//! Character-map extraction runs under a [`QuietLogs`] guard that mutes the
//! global `log` facade. The previous level comes back when the guard drops,
//! whether the scope returned normally, bailed with an error or unwound from
//! a panic.
//!
//! `ttf-parser` 0.20 itself does not emit through `log`, so today the guard
//! only silences `log` records raised by our own code or by other crates
//! during that window. Output written straight to stderr is not affected.

use log::LevelFilter;

/// Lowers the global `log` ceiling to `Off` until dropped.
#[must_use = "logs are restored as soon as the guard is dropped"]
pub struct QuietLogs {
    previous: LevelFilter,
}

impl QuietLogs {
    pub fn new() -> Self {
        let previous = log::max_level();
        log::set_max_level(LevelFilter::Off);
        Self { previous }
    }
}

impl Default for QuietLogs {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for QuietLogs {
    fn drop(&mut self) {
        log::set_max_level(self.previous);
    }
}

/// Run `f` with diagnostics muted.
pub fn with_quiet_logs<T>(f: impl FnOnce() -> T) -> T {
    let _quiet = QuietLogs::new();
    f()
}

/// Serializes unit tests that touch the process-global level.
#[cfg(test)]
pub(crate) fn level_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
