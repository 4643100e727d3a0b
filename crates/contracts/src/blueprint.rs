//! ProducerBlueprint - Config Loader 输出
//!
//! 描述完整的生产者配置：目标流、客户端、限流策略、批次切分、并发。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的生产者配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 目标流设置
    pub stream: StreamConfig,

    /// 限流策略配置
    #[serde(default)]
    pub limiter: LimiterConfig,

    /// 批次切分配置
    #[serde(default)]
    pub batching: BatchingConfig,

    /// 并发 worker 数量
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    1
}

/// 目标流配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// 流名称
    pub name: String,

    /// 客户端配置
    #[serde(default)]
    pub client: ClientConfig,
}

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// 客户端类型
    #[serde(default)]
    pub client_type: ClientType,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_type: ClientType::Mock,
            params: HashMap::new(),
        }
    }
}

/// 客户端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    /// 脚本化 mock 客户端 (离线/测试)
    #[default]
    Mock,
    /// 远端流服务 (TCP, newline-delimited JSON)
    Remote,
}

/// 限流策略配置
///
/// 按 `strategy` 标签在构造期选择限流器变体。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum LimiterConfig {
    /// 恒定速率
    Fixed {
        /// 许可发放速率 (permits/sec)，必须 > 0
        rate: f64,
    },

    /// 自适应速率 (拥塞乘性退避 / 空闲加性爬升)
    Adaptive {
        /// 初始速率 (permits/sec)，必须 > 0
        initial_rate: f64,

        /// 退避除数，必须 > 1
        #[serde(default = "default_backoff_divisor")]
        backoff_divisor: f64,

        /// 爬升增量 (permits/sec)，必须 >= 0
        #[serde(default = "default_creep_increment")]
        creep_increment: f64,
    },

    /// 不限流
    Unlimited,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self::Adaptive {
            initial_rate: default_initial_rate(),
            backoff_divisor: default_backoff_divisor(),
            creep_increment: default_creep_increment(),
        }
    }
}

impl LimiterConfig {
    /// 策略名称 (用于日志/info 输出)
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::Adaptive { .. } => "adaptive",
            Self::Unlimited => "unlimited",
        }
    }
}

fn default_initial_rate() -> f64 {
    1000.0
}

fn default_backoff_divisor() -> f64 {
    2.0
}

fn default_creep_increment() -> f64 {
    1.0 / 60.0
}

/// 批次切分配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchingConfig {
    /// 单批最大记录数
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
        }
    }
}

fn default_max_records() -> usize {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiter_config_tagged_json() {
        let config: LimiterConfig = serde_json::from_str(
            r#"{"strategy": "adaptive", "initial_rate": 250.0}"#,
        )
        .unwrap();

        match config {
            LimiterConfig::Adaptive {
                initial_rate,
                backoff_divisor,
                creep_increment,
            } => {
                assert_eq!(initial_rate, 250.0);
                assert_eq!(backoff_divisor, 2.0);
                assert!((creep_increment - 1.0 / 60.0).abs() < 1e-12);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_limiter_config_unlimited() {
        let config: LimiterConfig =
            serde_json::from_str(r#"{"strategy": "unlimited"}"#).unwrap();
        assert_eq!(config, LimiterConfig::Unlimited);
        assert_eq!(config.strategy_name(), "unlimited");
    }

    #[test]
    fn test_blueprint_defaults() {
        let blueprint: ProducerBlueprint = serde_json::from_str(
            r#"{"stream": {"name": "orders"}}"#,
        )
        .unwrap();

        assert_eq!(blueprint.version, ConfigVersion::V1);
        assert_eq!(blueprint.stream.name, "orders");
        assert_eq!(blueprint.stream.client.client_type, ClientType::Mock);
        assert_eq!(blueprint.batching.max_records, 500);
        assert_eq!(blueprint.workers, 1);
        assert_eq!(blueprint.limiter.strategy_name(), "adaptive");
    }
}
