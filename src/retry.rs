//! Retry timing for LLM calls.
//!
//! Pure functions only; the executor in [`crate::agent`] does the sleeping.

use crate::agent::LlmError;
use std::time::Duration;

/// Delay schedule consulted after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Base unit for rate-limit backoff (`2^attempt` units)
    pub backoff_unit: Duration,
    /// Upper bound on a single rate-limit backoff
    pub backoff_cap: Duration,
    /// Wait before retrying transport, HTTP and malformed-response failures
    pub flat_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_unit: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(10),
            flat_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff for the given 1-based attempt, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff_unit
            .checked_mul(factor)
            .unwrap_or(self.backoff_cap)
            .min(self.backoff_cap)
    }

    /// How long to wait after `attempt` failed with `error`.
    ///
    /// `None` means the error is terminal and must not be retried.
    pub fn delay_after(&self, attempt: u32, error: &LlmError) -> Option<Duration> {
        match error {
            LlmError::RateLimited { .. } => Some(self.backoff(attempt)),
            LlmError::Http { .. } | LlmError::MalformedResponse(_) | LlmError::Transport(_) => {
                Some(self.flat_delay)
            }
            LlmError::Unauthorized { .. } | LlmError::MissingApiKey(_) | LlmError::EmptyContext => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limited() -> LlmError {
        LlmError::RateLimited {
            body: String::new(),
        }
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
        assert_eq!(policy.backoff(4), Duration::from_secs(10));
        assert_eq!(policy.backoff(40), Duration::from_secs(10));
    }

    #[test]
    fn rate_limit_uses_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delay_after(2, &rate_limited()),
            Some(Duration::from_secs(4))
        );
    }

    #[test]
    fn other_retryable_failures_use_flat_delay() {
        let policy = RetryPolicy::default();
        let errors = [
            LlmError::Http {
                status: 500,
                body: "oops".into(),
            },
            LlmError::MalformedResponse("no choices".into()),
            LlmError::Transport("connection reset".into()),
        ];
        for error in &errors {
            assert_eq!(policy.delay_after(5, error), Some(Duration::from_secs(2)));
        }
    }

    #[test]
    fn auth_and_precondition_failures_are_terminal() {
        let policy = RetryPolicy::default();
        let unauthorized = LlmError::Unauthorized {
            status: 401,
            body: String::new(),
        };
        assert_eq!(policy.delay_after(1, &unauthorized), None);
        assert_eq!(
            policy.delay_after(1, &LlmError::MissingApiKey("GROQ_API_KEY".into())),
            None
        );
        assert_eq!(policy.delay_after(1, &LlmError::EmptyContext), None);
    }
}
