//! 配置校验模块
//!
//! 校验规则：
//! - stream.name 非空
//! - 限流参数合法 (rate > 0, backoff_divisor > 1, creep_increment >= 0)
//! - batching.max_records > 0
//! - workers > 0
//! - remote 客户端的 addr 参数可解析

use std::net::SocketAddr;

use contracts::{ClientType, LimiterConfig, ProducerBlueprint, ProducerError};

/// 校验 ProducerBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &ProducerBlueprint) -> Result<(), ProducerError> {
    validate_stream(blueprint)?;
    validate_client(blueprint)?;
    validate_limiter(&blueprint.limiter)?;
    validate_batching(blueprint)?;
    validate_workers(blueprint)?;
    Ok(())
}

/// 校验目标流配置
fn validate_stream(blueprint: &ProducerBlueprint) -> Result<(), ProducerError> {
    if blueprint.stream.name.is_empty() {
        return Err(ProducerError::config_validation(
            "stream.name",
            "stream name cannot be empty",
        ));
    }
    Ok(())
}

/// 校验客户端配置
fn validate_client(blueprint: &ProducerBlueprint) -> Result<(), ProducerError> {
    let client = &blueprint.stream.client;
    if client.client_type == ClientType::Remote {
        let addr = client.params.get("addr").ok_or_else(|| {
            ProducerError::config_validation(
                "stream.client.params.addr",
                "remote client requires an 'addr' parameter",
            )
        })?;
        addr.parse::<SocketAddr>().map_err(|e| {
            ProducerError::config_validation(
                "stream.client.params.addr",
                format!("invalid address '{addr}': {e}"),
            )
        })?;
    }
    Ok(())
}

/// 校验限流参数
fn validate_limiter(limiter: &LimiterConfig) -> Result<(), ProducerError> {
    match *limiter {
        LimiterConfig::Fixed { rate } => {
            if rate <= 0.0 || !rate.is_finite() {
                return Err(ProducerError::config_validation(
                    "limiter.rate",
                    format!("rate must be > 0, got {rate}"),
                ));
            }
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
        }
        LimiterConfig::Unlimited => {}
    }
    Ok(())
}

/// 校验批次切分配置
fn validate_batching(blueprint: &ProducerBlueprint) -> Result<(), ProducerError> {
    if blueprint.batching.max_records == 0 {
        return Err(ProducerError::config_validation(
            "batching.max_records",
            "max_records must be > 0",
        ));
    }
    Ok(())
}

/// 校验并发配置
fn validate_workers(blueprint: &ProducerBlueprint) -> Result<(), ProducerError> {
    if blueprint.workers == 0 {
        return Err(ProducerError::config_validation(
            "workers",
            "workers must be > 0",
        ));
    }
    Ok(())
}
