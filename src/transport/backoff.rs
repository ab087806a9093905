//! Exponential backoff with full jitter.
//!
//! See https://aws.amazon.com/blogs/architecture/exponential-backoff-and-jitter/

use rand::Rng;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Source of pauses between dispatch attempts.
///
/// One instance belongs to one dispatch; it is mutated on every call and never shared.
pub trait Backoff: Send {
    fn next_pause(&mut self) -> Duration;
}

/// Validated bounds for [`ExponentialJitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    initial: Duration,
    max: Duration,
}

impl BackoffConfig {
    pub fn new(initial: Duration, max: Duration) -> Result<Self, ConfigError> {
        if initial.is_zero() || max.is_zero() {
            return Err(ConfigError::ZeroBackoff);
        }
        if initial > max {
            return Err(ConfigError::BackoffOrder { initial, max });
        }
        Ok(Self { initial, max })
    }

    /// Default initial pause with an explicit cap.
    pub fn with_max(max: Duration) -> Result<Self, ConfigError> {
        Self::new(DEFAULT_INITIAL_BACKOFF, max)
    }

    pub fn initial(&self) -> Duration {
        self.initial
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Fresh generator for one dispatch.
    pub fn build(&self) -> ExponentialJitter {
        ExponentialJitter {
            max: self.max,
            current: self.initial,
        }
    }
}

/// Draws each pause uniformly from `[1ns, current]`, then doubles `current` up to `max`.
#[derive(Debug, Clone)]
pub struct ExponentialJitter {
    max: Duration,
    current: Duration,
}

impl ExponentialJitter {
    /// Upper bound of the next draw.
    pub fn current(&self) -> Duration {
        self.current
    }
}

impl Backoff for ExponentialJitter {
    fn next_pause(&mut self) -> Duration {
        let upper = u64::try_from(self.current.as_nanos())
            .unwrap_or(u64::MAX)
            .max(1);
        let pause = Duration::from_nanos(rand::rng().random_range(1..=upper));

        self.current = self.current.saturating_mul(2).min(self.max);
        pause
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pauses_stay_within_current_bound() {
        let cfg = BackoffConfig::new(Duration::from_millis(10), Duration::from_millis(700))
            .expect("valid backoff");
        let mut backoff = cfg.build();
        let mut previous_bound = Duration::ZERO;

        for _ in 0..64 {
            let bound = backoff.current();
            assert!(bound >= previous_bound, "bound must never shrink");
            assert!(bound <= cfg.max());

            let pause = backoff.next_pause();
            assert!(pause >= Duration::from_nanos(1));
            assert!(pause <= bound, "{pause:?} exceeds {bound:?}");
            previous_bound = bound;
        }
        assert_eq!(backoff.current(), cfg.max());
    }

    #[test]
    fn current_doubles_then_clamps() {
        let cfg = BackoffConfig::new(Duration::from_millis(100), Duration::from_millis(300))
            .expect("valid backoff");
        let mut backoff = cfg.build();

        assert_eq!(backoff.current(), Duration::from_millis(100));
        backoff.next_pause();
        assert_eq!(backoff.current(), Duration::from_millis(200));
        backoff.next_pause();
        assert_eq!(backoff.current(), Duration::from_millis(300));
        backoff.next_pause();
        assert_eq!(backoff.current(), Duration::from_millis(300));
    }

    #[test]
    fn nanosecond_bound_always_yields_one() {
        let cfg = BackoffConfig::new(Duration::from_nanos(1), Duration::from_nanos(1))
            .expect("valid backoff");
        let mut backoff = cfg.build();
        assert_eq!(backoff.next_pause(), Duration::from_nanos(1));
        assert_eq!(backoff.next_pause(), Duration::from_nanos(1));
    }

    #[test]
    fn zero_bounds_are_rejected() {
        assert!(matches!(
            BackoffConfig::new(Duration::ZERO, Duration::from_secs(1)),
            Err(ConfigError::ZeroBackoff)
        ));
        assert!(matches!(
            BackoffConfig::with_max(Duration::ZERO),
            Err(ConfigError::ZeroBackoff)
        ));
    }

    #[test]
    fn initial_above_max_is_rejected() {
        assert!(matches!(
            BackoffConfig::new(Duration::from_secs(2), Duration::from_secs(1)),
            Err(ConfigError::BackoffOrder { .. })
        ));
    }

    #[test]
    fn with_max_uses_default_initial() {
        let cfg = BackoffConfig::with_max(Duration::from_secs(5)).expect("valid backoff");
        assert_eq!(cfg.initial(), DEFAULT_INITIAL_BACKOFF);
        assert_eq!(cfg.build().current(), DEFAULT_INITIAL_BACKOFF);
    }
}
