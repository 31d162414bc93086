use std::time::Duration;
use typed_builder::TypedBuilder;

/// How many times, and how patiently, to repeat a fallible remote check.
///
/// Each attempt is bounded by `per_attempt_timeout`; a timed-out attempt
/// counts as a failed one. Attempts are separated by a fixed
/// `inter_attempt_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct RetryPolicy {
    #[builder(default = 4)]
    pub max_attempts: u32,
    #[builder(default = Duration::from_millis(2_500))]
    pub per_attempt_timeout: Duration,
    #[builder(default = Duration::from_millis(700))]
    pub inter_attempt_delay: Duration,
}

impl RetryPolicy {
    /// The shorter policy used when many queries are collected at once.
    pub fn batch() -> Self {
        Self::builder().max_attempts(3).build()
    }

    /// Total attempts, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}
