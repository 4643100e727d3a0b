//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（无需远端流服务）
//! - 共享限流器的并发一致性

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(contracts::THROTTLED_ERROR_CODE, "throughput_exceeded");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use contracts::{Batch, LimiterConfig, NoopObserver, Record};
    use dispatcher::BatchDispatcher;
    use rate_limiter::build_limiter;
    use stream_client::{MockAttempt, MockConfig, MockStreamClient, StreamClient};

    fn batch(stream: &str, count: usize) -> Batch {
        Batch::new(
            stream,
            (0..count)
                .map(|i| {
                    Record::new(format!("key-{i}"), Bytes::from_static(b"payload"))
                        .with_ordering_key(format!("seq-{i}"))
                })
                .collect(),
        )
    }

    /// End-to-end: MockStreamClient -> BatchDispatcher with an adaptive
    /// limiter, under sustained per-record throttling.
    ///
    /// 验证完整闭环：
    /// 1. 第一次提交部分记录被限流
    /// 2. Dispatcher 只重试被限流子集
    /// 3. 限流器速率先退避、后爬升
    #[tokio::test]
    async fn test_e2e_throttled_batch_converges() {
        let mut client = MockStreamClient::with_config(MockConfig {
            attempts: vec![
                MockAttempt {
                    throttle_positions: vec![2, 3, 4],
                    ..Default::default()
                },
                MockAttempt {
                    throttle_positions: vec![1],
                    ..Default::default()
                },
            ],
        });
        client.open().await.unwrap();

        let limiter = Arc::new(
            build_limiter(&LimiterConfig::Adaptive {
                initial_rate: 10_000.0,
                backoff_divisor: 2.0,
                creep_increment: 1.0,
            })
            .unwrap(),
        );

        let dispatcher = BatchDispatcher::new(client, Arc::clone(&limiter), NoopObserver);

        let failed = dispatcher.send(batch("orders", 5)).await.unwrap();
        assert_eq!(failed, 0);

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.attempt_count, 3);
        assert_eq!(metrics.accepted_count, 5);
        assert_eq!(metrics.throttled_count, 4);

        // Two back-offs (10000 -> 2500), then one creep on the clean attempt
        let rate = limiter.current_rate().unwrap();
        assert!((rate - 2501.0).abs() < 1e-9, "rate {rate}");

        // The client saw exactly the shrinking subsets, in order
        let client = dispatcher.into_client();
        let submissions = client.submissions();
        assert_eq!(submissions.len(), 3);
        assert_eq!(submissions[0], vec!["key-0", "key-1", "key-2", "key-3", "key-4"]);
        assert_eq!(submissions[1], vec!["key-2", "key-3", "key-4"]);
        assert_eq!(submissions[2], vec!["key-3"]);
    }

    /// 多个并发 send 共享一个限流器与客户端
    #[tokio::test]
    async fn test_e2e_concurrent_sends_share_limiter() {
        let mut client = MockStreamClient::new();
        client.open().await.unwrap();

        let limiter = Arc::new(
            build_limiter(&LimiterConfig::Adaptive {
                initial_rate: 50_000.0,
                backoff_divisor: 2.0,
                creep_increment: 1.0,
            })
            .unwrap(),
        );

        let dispatcher = Arc::new(BatchDispatcher::new(
            client,
            Arc::clone(&limiter),
            NoopObserver,
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let dispatcher = Arc::clone(&dispatcher);
            handles.push(tokio::spawn(async move {
                dispatcher.send(batch("orders", 20)).await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 0);
        }

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.accepted_count, 8 * 20);
        assert_eq!(metrics.failed_count, 0);

        // 8 clean attempts crept the shared rate up by exactly 8 increments
        let rate = limiter.current_rate().unwrap();
        assert!((rate - 50_008.0).abs() < 1e-9, "rate {rate}");
    }

    /// 致命错误跨批次传播：第一批照常完成，第二批中止
    #[tokio::test]
    async fn test_e2e_fatal_error_aborts_one_batch_only() {
        let mut client = MockStreamClient::with_config(MockConfig {
            attempts: vec![
                MockAttempt::default(),
                MockAttempt {
                    fatal: Some("expired credentials".to_string()),
                    ..Default::default()
                },
            ],
        });
        client.open().await.unwrap();

        let limiter = Arc::new(build_limiter(&LimiterConfig::Unlimited).unwrap());
        let dispatcher = BatchDispatcher::new(client, limiter, NoopObserver);

        assert_eq!(dispatcher.send(batch("orders", 3)).await.unwrap(), 0);

        let err = dispatcher.send(batch("orders", 3)).await.unwrap_err();
        assert_eq!(err.failed_records(), 0);

        // Script exhausted: the stream is healthy again
        assert_eq!(dispatcher.send(batch("orders", 3)).await.unwrap(), 0);
    }

    /// 配置 -> 工厂 -> 分发全链路
    #[tokio::test]
    async fn test_e2e_config_to_dispatch() {
        let toml = r#"
[stream]
name = "telemetry"

[limiter]
strategy = "fixed"
rate = 100000.0

[batching]
max_records = 4
"#;
        let blueprint =
            config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
                .unwrap();

        let limiter = Arc::new(build_limiter(&blueprint.limiter).unwrap());
        assert_eq!(limiter.current_rate(), Some(100_000.0));

        let mut client = MockStreamClient::new();
        client.open().await.unwrap();
        let dispatcher = BatchDispatcher::new(client, limiter, NoopObserver);

        let failed = dispatcher
            .send(batch(&blueprint.stream.name, blueprint.batching.max_records))
            .await
            .unwrap();
        assert_eq!(failed, 0);
    }
}
