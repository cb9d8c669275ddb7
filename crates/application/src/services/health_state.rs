use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A change of verdict produced by one probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTransition {
    Down { consecutive_failures: u32 },
    Up { consecutive_successes: u32 },
}

#[derive(Debug, Default)]
struct Streak {
    successes: u32,
    failures: u32,
}

/// Up/down verdict for one upstream, moved by unbroken streaks of probe
/// outcomes. Starts up.
///
/// `is_up` is a single atomic load so dispatch never waits on the monitor;
/// the streak counters are only touched by the monitor itself.
#[derive(Debug)]
pub struct HealthState {
    up: AtomicBool,
    streak: Mutex<Streak>,
    success_threshold: u32,
    failure_threshold: u32,
}

impl HealthState {
    pub fn new(success_threshold: u32, failure_threshold: u32) -> Self {
        Self {
            up: AtomicBool::new(true),
            streak: Mutex::new(Streak::default()),
            success_threshold: success_threshold.max(1),
            failure_threshold: failure_threshold.max(1),
        }
    }

    #[inline]
    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::Acquire)
    }

    pub fn record_success(&self) -> Option<HealthTransition> {
        let mut streak = self.streak.lock().unwrap_or_else(|e| e.into_inner());
        streak.successes = streak.successes.saturating_add(1);
        streak.failures = 0;

        if !self.is_up() && streak.successes >= self.success_threshold {
            self.up.store(true, Ordering::Release);
            return Some(HealthTransition::Up {
                consecutive_successes: streak.successes,
            });
        }
        None
    }

    pub fn record_failure(&self) -> Option<HealthTransition> {
        let mut streak = self.streak.lock().unwrap_or_else(|e| e.into_inner());
        streak.failures = streak.failures.saturating_add(1);
        streak.successes = 0;

        if self.is_up() && streak.failures >= self.failure_threshold {
            self.up.store(false, Ordering::Release);
            return Some(HealthTransition::Down {
                consecutive_failures: streak.failures,
            });
        }
        None
    }

    pub fn consecutive_successes(&self) -> u32 {
        self.streak
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .successes
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.streak
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failures
    }
}
