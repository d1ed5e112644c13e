//! Bounded, spaced retries for the two sync kinds.
//!
//! ```text
//! Idle --cycle failure--> PendingRetry --success--> Idle
//!                         PendingRetry --failure--> PendingRetry (count + 1)
//!                         PendingRetry --count == max--> Exhausted
//! any --next periodic cycle--> Idle
//! ```
//!
//! Each kind owns its own gate timestamp, so one kind backing off never delays the other.

use crate::config::{Config, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_INTERVAL_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncKind {
    TimeSync,
    Weather,
}

impl SyncKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncKind::TimeSync => "time sync",
            SyncKind::Weather => "weather",
        }
    }
}

impl std::fmt::Display for SyncKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval_ms: u64,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl From<&Config> for RetryPolicy {
    fn from(config: &Config) -> Self {
        Self {
            interval_ms: config.retry_interval_ms,
            max_retries: config.max_retries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPhase {
    #[default]
    Idle,
    PendingRetry,
    /// Out of attempts until the next periodic cycle.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryState {
    phase: RetryPhase,
    attempt_count: u32,
    last_attempt_ms: u64,
}

impl RetryState {
    pub fn phase(&self) -> RetryPhase {
        self.phase
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn last_attempt_ms(&self) -> u64 {
        self.last_attempt_ms
    }

    pub fn is_needed(&self) -> bool {
        self.phase == RetryPhase::PendingRetry
    }

    /// Whether a retry may fire at `now_ms`.
    pub fn is_due(&self, now_ms: u64, policy: &RetryPolicy) -> bool {
        self.phase == RetryPhase::PendingRetry
            && self.attempt_count < policy.max_retries
            && now_ms >= self.last_attempt_ms.saturating_add(policy.interval_ms)
    }

    /// The periodic attempt failed: start counting retries from zero.
    pub fn seed(&mut self, now_ms: u64, policy: &RetryPolicy) {
        self.attempt_count = 0;
        self.last_attempt_ms = now_ms;
        self.phase = if policy.max_retries == 0 {
            RetryPhase::Exhausted
        } else {
            RetryPhase::PendingRetry
        };
    }

    /// A retry failed. Returns `true` when this failure exhausted the kind.
    pub fn record_failure(&mut self, now_ms: u64, policy: &RetryPolicy) -> bool {
        self.attempt_count = (self.attempt_count + 1).min(policy.max_retries);
        self.last_attempt_ms = now_ms;
        if self.attempt_count >= policy.max_retries {
            self.phase = RetryPhase::Exhausted;
            true
        } else {
            false
        }
    }

    pub fn record_success(&mut self) {
        self.phase = RetryPhase::Idle;
        self.attempt_count = 0;
    }

    /// Start of a new periodic cycle.
    pub fn reset(&mut self) {
        self.phase = RetryPhase::Idle;
        self.attempt_count = 0;
    }
}
