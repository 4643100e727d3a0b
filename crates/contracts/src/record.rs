//! Record / Batch - Dispatcher 输入
//!
//! 发往分区追加流的记录与批次结构。

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// 单条记录
///
/// 构造后不可变；Dispatcher 只会重组下一次提交包含哪些记录，
/// 绝不修改载荷字节。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// 分区键 (决定记录落入哪个分区)
    pub partition_key: String,

    /// 可选的排序键 (分区内定序/诊断)
    #[serde(default)]
    pub ordering_key: Option<String>,

    /// 数据载荷 (零拷贝)
    pub payload: Bytes,
}

impl Record {
    /// 创建记录
    pub fn new(partition_key: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            partition_key: partition_key.into(),
            ordering_key: None,
            payload: payload.into(),
        }
    }

    /// 附加排序键
    pub fn with_ordering_key(mut self, ordering_key: impl Into<String>) -> Self {
        self.ordering_key = Some(ordering_key.into());
        self
    }

    /// 载荷字节数
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

/// 提交批次
///
/// 一次 dispatch 调用独占所有权；重试间 Dispatcher 会把
/// `records` 替换为可重试子集 (保持原有相对顺序)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// 目标流名称
    pub stream: String,

    /// 记录序列 (有序)
    pub records: Vec<Record>,
}

impl Batch {
    /// 创建批次
    pub fn new(stream: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            stream: stream.into(),
            records,
        }
    }

    /// 记录条数
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 收缩到指定位置子集
    ///
    /// `positions` 必须升序且不含重复；保留的记录维持原有相对顺序。
    pub fn shrink_to(&mut self, positions: &[usize]) {
        let mut keep = positions.iter().copied().peekable();
        let mut next = Vec::with_capacity(positions.len());

        for (pos, record) in self.records.drain(..).enumerate() {
            if keep.peek() == Some(&pos) {
                keep.next();
                next.push(record);
            }
        }

        self.records = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str) -> Record {
        Record::new(key, Bytes::from_static(b"payload"))
    }

    #[test]
    fn test_shrink_preserves_order() {
        let mut batch = Batch::new(
            "orders",
            vec![record("a"), record("b"), record("c"), record("d")],
        );

        batch.shrink_to(&[1, 3]);

        let keys: Vec<_> = batch
            .records
            .iter()
            .map(|r| r.partition_key.as_str())
            .collect();
        assert_eq!(keys, vec!["b", "d"]);
    }

    #[test]
    fn test_shrink_to_empty() {
        let mut batch = Batch::new("orders", vec![record("a"), record("b")]);
        batch.shrink_to(&[]);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_record_serde_round_trip() {
        let original = Record::new("user-42", Bytes::from_static(b"{\"v\":1}"))
            .with_ordering_key("seq-7");

        let json = serde_json::to_string(&original).unwrap();
        let parsed: Record = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.partition_key, "user-42");
        assert_eq!(parsed.ordering_key.as_deref(), Some("seq-7"));
        assert_eq!(parsed.payload, original.payload);
    }
}
