//! # Dispatcher
//!
//! 批次分发模块。
//!
//! 负责：
//! - 驱动 acquire → submit → classify → update 重试循环
//! - 只重试吞吐超限的记录子集，保持分区内相对顺序
//! - 永久失败只计数、不重试；非吞吐错误立即终止

pub mod dispatcher;
pub mod error;
pub mod metrics;

pub use contracts::{Batch, Record, StreamClient};
pub use dispatcher::BatchDispatcher;
pub use error::DispatchError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
