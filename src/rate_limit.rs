use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Debug)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Process-wide fixed-window limiter: at most `max` hits per `window`.
///
/// The first hit after a window expires opens a fresh window. There is no per-caller
/// bookkeeping, every request shares the same counter.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max: u32,
    window: Duration,
    state: Mutex<Option<Window>>,
}

impl FixedWindowLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            state: Mutex::new(None),
        }
    }

    /// Records a hit and returns whether it is allowed.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let expired = state
            .as_ref()
            .map_or(true, |w| now.saturating_duration_since(w.started) >= self.window);
        if expired {
            *state = Some(Window { started: now, hits: 0 });
        }
        let Some(window) = state.as_mut() else {
            return false;
        };

        if window.hits >= self.max {
            return false;
        }
        window.hits += 1;
        true
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}
