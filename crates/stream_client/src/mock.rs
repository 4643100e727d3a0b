//! Mock 流客户端
//!
//! 用于单元测试与离线运行的 mock 实现，支持注入限流/失败场景。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use contracts::{
    Batch, BatchResult, ProducerError, RecordResult, StreamClient,
};
use tracing::instrument;

/// 单次提交的脚本化行为
#[derive(Debug, Default, Clone)]
pub struct MockAttempt {
    /// 本次提交按位置注入吞吐超限的记录
    pub throttle_positions: Vec<usize>,
    /// 本次提交按位置注入永久失败 (位置, 失败码)
    pub fail_codes: Vec<(usize, String)>,
    /// 整批吞吐超限 (优先于按位置注入)
    pub batch_throttled: bool,
    /// 致命错误消息 (优先级最高)
    pub fatal: Option<String>,
}

/// Mock 客户端配置
///
/// `attempts` 按提交次序消费；脚本耗尽后全部接受。
#[derive(Debug, Default, Clone)]
pub struct MockConfig {
    pub attempts: Vec<MockAttempt>,
}

/// Mock 流客户端
pub struct MockStreamClient {
    /// 剩余脚本
    script: Mutex<VecDeque<MockAttempt>>,
    /// 每次提交的分区键序列 (用于断言)
    submissions: Mutex<Vec<Vec<String>>>,
    /// 序列号计数器
    next_sequence: AtomicU64,
    /// 连接状态
    connected: Mutex<bool>,
}

impl MockStreamClient {
    /// 创建默认 mock 客户端 (全部接受)
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// 使用脚本创建 mock 客户端
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            script: Mutex::new(config.attempts.into()),
            submissions: Mutex::new(Vec::new()),
            next_sequence: AtomicU64::new(1000), // 从 1000 开始，便于识别
            connected: Mutex::new(false),
        }
    }

    /// 已提交次数
    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    /// 每次提交的分区键序列
    pub fn submissions(&self) -> Vec<Vec<String>> {
        self.submissions.lock().unwrap().clone()
    }

    fn allocate_sequence(&self) -> String {
        format!("seq-{}", self.next_sequence.fetch_add(1, Ordering::SeqCst))
    }

    fn ensure_connected(&self) -> Result<(), ProducerError> {
        if *self.connected.lock().unwrap() {
            Ok(())
        } else {
            Err(ProducerError::connection("client not open"))
        }
    }

    fn respond(&self, attempt: MockAttempt, batch: &Batch) -> Result<BatchResult, ProducerError> {
        if let Some(message) = attempt.fatal {
            return Err(ProducerError::AccessDenied { message });
        }
        if attempt.batch_throttled {
            return Err(ProducerError::throughput_exceeded(&batch.stream));
        }

        let results = (0..batch.len())
            .map(|position| {
                if attempt.throttle_positions.contains(&position) {
                    return RecordResult::throttled();
                }
                if let Some((_, code)) =
                    attempt.fail_codes.iter().find(|(pos, _)| *pos == position)
                {
                    return RecordResult::failed(code.clone(), "injected failure");
                }
                RecordResult::accepted(self.allocate_sequence())
            })
            .collect();

        Ok(BatchResult::from_results(results))
    }
}

impl Default for MockStreamClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamClient for MockStreamClient {
    fn name(&self) -> &str {
        "mock"
    }

    #[instrument(name = "mock_client_open", skip(self))]
    async fn open(&mut self) -> Result<(), ProducerError> {
        *self.connected.lock().unwrap() = true;
        Ok(())
    }

    #[instrument(
        name = "mock_client_submit",
        skip(self, batch),
        fields(stream = %batch.stream, records = batch.len())
    )]
    async fn submit(&self, batch: &Batch) -> Result<BatchResult, ProducerError> {
        self.ensure_connected()?;

        self.submissions.lock().unwrap().push(
            batch
                .records
                .iter()
                .map(|r| r.partition_key.clone())
                .collect(),
        );

        let attempt = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();

        self.respond(attempt, batch)
    }

    #[instrument(name = "mock_client_healthy", skip(self))]
    async fn healthy(&self) -> Result<bool, ProducerError> {
        Ok(*self.connected.lock().unwrap())
    }

    #[instrument(name = "mock_client_close", skip(self))]
    async fn close(&mut self) -> Result<(), ProducerError> {
        *self.connected.lock().unwrap() = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{Record, RecordOutcome};

    fn batch(keys: &[&str]) -> Batch {
        Batch::new(
            "orders",
            keys.iter()
                .map(|k| Record::new(*k, Bytes::from_static(b"x")))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_submit_requires_open() {
        let client = MockStreamClient::new();
        let err = client.submit(&batch(&["a"])).await.unwrap_err();
        assert!(matches!(err, ProducerError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_default_accepts_everything() {
        let mut client = MockStreamClient::new();
        client.open().await.unwrap();

        let result = client.submit(&batch(&["a", "b"])).await.unwrap();
        assert!(result.fully_accepted());
        assert_eq!(result.results.len(), 2);
        assert_eq!(client.submission_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_throttle_and_failure() {
        let mut client = MockStreamClient::with_config(MockConfig {
            attempts: vec![MockAttempt {
                throttle_positions: vec![0],
                fail_codes: vec![(2, "malformed_record".to_string())],
                ..Default::default()
            }],
        });
        client.open().await.unwrap();

        let result = client.submit(&batch(&["a", "b", "c"])).await.unwrap();
        assert_eq!(result.failed_record_count, 2);
        assert_eq!(result.results[0].outcome(), RecordOutcome::Throttled);
        assert_eq!(result.results[1].outcome(), RecordOutcome::Accepted);
        assert_eq!(
            result.results[2].outcome(),
            RecordOutcome::Failed("malformed_record".to_string())
        );

        // Script exhausted: next attempt is clean
        let result = client.submit(&batch(&["a"])).await.unwrap();
        assert!(result.fully_accepted());
    }

    #[tokio::test]
    async fn test_scripted_batch_throttle() {
        let mut client = MockStreamClient::with_config(MockConfig {
            attempts: vec![MockAttempt {
                batch_throttled: true,
                ..Default::default()
            }],
        });
        client.open().await.unwrap();

        let err = client.submit(&batch(&["a"])).await.unwrap_err();
        assert!(err.is_throughput_exceeded());
    }

    #[tokio::test]
    async fn test_health_follows_lifecycle() {
        let mut client = MockStreamClient::new();
        assert!(!client.healthy().await.unwrap());
        client.open().await.unwrap();
        assert!(client.healthy().await.unwrap());
        client.close().await.unwrap();
        assert!(!client.healthy().await.unwrap());
    }
}
