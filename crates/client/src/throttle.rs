//! Global request spacing.
//!
//! A [`Throttle`] hands out dispatch slots at least `spacing` apart. The slot
//! is reserved under a short lock and the wait happens after the lock is
//! released, so concurrent callers queue behind each other instead of all
//! sleeping from the same stale timestamp.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Throttle {
    spacing: Duration,
    last_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last_slot: Mutex::new(None),
        }
    }

    /// Reserve the next dispatch slot without waiting for it.
    pub fn reserve(&self) -> Instant {
        let mut last = self.last_slot.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let slot = match *last {
            Some(prev) => (prev + self.spacing).max(now),
            None => now,
        };
        *last = Some(slot);
        slot
    }

    /// Wait until this caller may dispatch. Returns the slot it was given.
    pub async fn acquire(&self) -> Instant {
        let slot = self.reserve();
        tokio::time::sleep_until(slot).await;
        slot
    }
}
