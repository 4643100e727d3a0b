//! Dispatch 指标收集模块
//!
//! 围绕批次提交循环收集速率、重试与延迟指标。

use metrics::{counter, gauge, histogram};

/// 记录一次提交尝试
pub fn record_batch_attempt(stream: &str) {
    counter!(
        "stream_producer_attempts_total",
        "stream" => stream.to_string()
    )
    .increment(1);
}

/// 记录被接受的记录数
pub fn record_records_accepted(stream: &str, count: usize) {
    if count > 0 {
        counter!(
            "stream_producer_records_accepted_total",
            "stream" => stream.to_string()
        )
        .increment(count as u64);
    }
}

/// 记录永久失败的记录数
pub fn record_records_failed(stream: &str, count: usize) {
    if count > 0 {
        counter!(
            "stream_producer_records_failed_total",
            "stream" => stream.to_string()
        )
        .increment(count as u64);
    }
}

/// 记录吞吐超限重试的记录数
pub fn record_records_throttled(stream: &str, count: usize) {
    if count > 0 {
        counter!(
            "stream_producer_records_throttled_total",
            "stream" => stream.to_string()
        )
        .increment(count as u64);
    }
}

/// 记录当前限流速率 (permits/sec)
pub fn record_limiter_rate(stream: &str, rate: f64) {
    gauge!(
        "stream_producer_limiter_rate",
        "stream" => stream.to_string()
    )
    .set(rate);
}

/// 记录限流等待时长 (毫秒)
pub fn record_limiter_wait_ms(wait_ms: f64) {
    histogram!("stream_producer_limiter_wait_ms").record(wait_ms);
}

/// 记录一次 send 调用的总时长 (毫秒，含全部重试)
pub fn record_send_latency_ms(latency_ms: f64) {
    histogram!("stream_producer_send_latency_ms").record(latency_ms);
}

/// Dispatch 指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DispatchAggregator {
    /// 完成的批次数
    pub total_batches: u64,

    /// 被接受的记录总数
    pub total_accepted: u64,

    /// 永久失败的记录总数
    pub total_failed: u64,

    /// 单批记录数统计
    pub batch_size_stats: RunningStats,

    /// 单批 send 时长统计 (毫秒)
    pub latency_stats: RunningStats,
}

impl DispatchAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个完成批次的统计
    pub fn record_batch(&mut self, accepted: u64, failed: u64, latency_ms: f64) {
        self.total_batches += 1;
        self.total_accepted += accepted;
        self.total_failed += failed;
        self.batch_size_stats.push((accepted + failed) as f64);
        self.latency_stats.push(latency_ms);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> DispatchSummary {
        let total_records = self.total_accepted + self.total_failed;
        DispatchSummary {
            total_batches: self.total_batches,
            total_accepted: self.total_accepted,
            total_failed: self.total_failed,
            failure_rate: if total_records > 0 {
                self.total_failed as f64 / total_records as f64 * 100.0
            } else {
                0.0
            },
            batch_size: StatsSummary::from(&self.batch_size_stats),
            latency_ms: StatsSummary::from(&self.latency_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total_batches: u64,
    pub total_accepted: u64,
    pub total_failed: u64,
    pub failure_rate: f64,
    pub batch_size: StatsSummary,
    pub latency_ms: StatsSummary,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Batches: {}", self.total_batches)?;
        writeln!(f, "Records accepted: {}", self.total_accepted)?;
        writeln!(
            f,
            "Records failed: {} ({:.2}%)",
            self.total_failed, self.failure_rate
        )?;
        writeln!(f, "Batch size: {}", self.batch_size)?;
        writeln!(f, "Send latency (ms): {}", self.latency_ms)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
