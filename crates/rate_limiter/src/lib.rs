//! # Rate Limiter
//!
//! 出站吞吐限流模块。
//!
//! 负责：
//! - 按当前速率发放许可 (`acquire`)，一条记录消耗一个许可
//! - 根据提交反馈调整速率 (`update`)：拥塞乘性退避，空闲加性爬升
//! - 按配置标签在构造期选择策略变体
//!
//! 一个限流器实例可被多个并发 dispatch 调用共享；速率状态是
//! 单一原子字段，`acquire`/`update` 是仅有的两个读写入口。

mod adaptive;
mod fixed;
mod pacer;
mod rate;

pub use adaptive::AdaptiveLimiter;
pub use fixed::FixedLimiter;
pub use rate::MIN_RATE;

use std::time::Duration;

use contracts::{LimiterConfig, ProducerError};
use tracing::debug;

/// Permit-issuing limiter, dispatched over a closed set of strategies.
///
/// The variant is selected once at construction time from a
/// [`LimiterConfig`]; callers only see `acquire` and `update`.
#[derive(Debug)]
pub enum Limiter {
    /// Constant rate; feedback is ignored
    Fixed(FixedLimiter),
    /// Rate tuned by submission feedback
    Adaptive(AdaptiveLimiter),
    /// Never blocks, never changes
    Unlimited,
}

impl Limiter {
    /// Block until `permits` permits have been issued at the current rate.
    ///
    /// Returns the wait actually incurred (zero for [`Limiter::Unlimited`]
    /// and for an idle limiter with no backlog).
    pub async fn acquire(&self, permits: usize) -> Duration {
        match self {
            Self::Fixed(limiter) => limiter.acquire(permits).await,
            Self::Adaptive(limiter) => limiter.acquire(permits).await,
            Self::Unlimited => Duration::ZERO,
        }
    }

    /// Feed back the outcome of one submission attempt.
    ///
    /// `issued` is the number of records in the attempt, `throttled` how
    /// many of them were rejected for throughput. Only the adaptive
    /// variant reacts.
    pub fn update(&self, issued: usize, throttled: usize) {
        match self {
            Self::Adaptive(limiter) => limiter.update(issued, throttled),
            Self::Fixed(_) | Self::Unlimited => {}
        }
    }

    /// Current permit rate, if the variant has one
    pub fn current_rate(&self) -> Option<f64> {
        match self {
            Self::Fixed(limiter) => Some(limiter.rate()),
            Self::Adaptive(limiter) => Some(limiter.rate()),
            Self::Unlimited => None,
        }
    }
}

/// Construct a limiter from configuration, validating its parameters.
pub fn build_limiter(config: &LimiterConfig) -> Result<Limiter, ProducerError> {
    let limiter = match *config {
        LimiterConfig::Fixed { rate } => {
            if rate <= 0.0 || !rate.is_finite() {
                return Err(ProducerError::config_validation(
                    "limiter.rate",
                    format!("rate must be > 0, got {rate}"),
                ));
            }
            Limiter::Fixed(FixedLimiter::new(rate))
        }
        LimiterConfig::Adaptive {
            initial_rate,
            backoff_divisor,
            creep_increment,
        } => {
            if initial_rate <= 0.0 || !initial_rate.is_finite() {
                return Err(ProducerError::config_validation(
                    "limiter.initial_rate",
                    format!("initial_rate must be > 0, got {initial_rate}"),
                ));
            }
            if backoff_divisor <= 1.0 || !backoff_divisor.is_finite() {
                return Err(ProducerError::config_validation(
                    "limiter.backoff_divisor",
                    format!("backoff_divisor must be > 1, got {backoff_divisor}"),
                ));
            }
            if creep_increment < 0.0 || !creep_increment.is_finite() {
                return Err(ProducerError::config_validation(
                    "limiter.creep_increment",
                    format!("creep_increment must be >= 0, got {creep_increment}"),
                ));
            }
            Limiter::Adaptive(AdaptiveLimiter::new(
                initial_rate,
                backoff_divisor,
                creep_increment,
            ))
        }
        LimiterConfig::Unlimited => Limiter::Unlimited,
    };

    debug!(strategy = config.strategy_name(), "limiter built");
    Ok(limiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_each_variant() {
        let fixed = build_limiter(&LimiterConfig::Fixed { rate: 100.0 }).unwrap();
        assert!(matches!(fixed, Limiter::Fixed(_)));
        assert_eq!(fixed.current_rate(), Some(100.0));

        let adaptive = build_limiter(&LimiterConfig::default()).unwrap();
        assert!(matches!(adaptive, Limiter::Adaptive(_)));

        let unlimited = build_limiter(&LimiterConfig::Unlimited).unwrap();
        assert!(matches!(unlimited, Limiter::Unlimited));
        assert_eq!(unlimited.current_rate(), None);
    }

    #[test]
    fn test_factory_rejects_bad_params() {
        assert!(build_limiter(&LimiterConfig::Fixed { rate: 0.0 }).is_err());
        assert!(build_limiter(&LimiterConfig::Fixed { rate: -5.0 }).is_err());
        assert!(build_limiter(&LimiterConfig::Adaptive {
            initial_rate: 100.0,
            backoff_divisor: 1.0,
            creep_increment: 0.1,
        })
        .is_err());
        assert!(build_limiter(&LimiterConfig::Adaptive {
            initial_rate: 100.0,
            backoff_divisor: 2.0,
            creep_increment: -0.1,
        })
        .is_err());
        assert!(build_limiter(&LimiterConfig::Adaptive {
            initial_rate: f64::NAN,
            backoff_divisor: 2.0,
            creep_increment: 0.1,
        })
        .is_err());
    }

    #[tokio::test]
    async fn test_unlimited_never_waits() {
        let limiter = build_limiter(&LimiterConfig::Unlimited).unwrap();
        for _ in 0..100 {
            assert_eq!(limiter.acquire(10_000).await, Duration::ZERO);
        }
        limiter.update(10_000, 10_000);
        assert_eq!(limiter.current_rate(), None);
    }

    #[tokio::test]
    async fn test_update_ignored_by_fixed() {
        let limiter = build_limiter(&LimiterConfig::Fixed { rate: 50.0 }).unwrap();
        limiter.update(100, 100);
        limiter.update(100, 0);
        assert_eq!(limiter.current_rate(), Some(50.0));
    }
}
