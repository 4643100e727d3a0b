//! # Stream Client
//!
//! 流服务客户端实现。
//!
//! 提供两种 [`contracts::StreamClient`] 实现：
//! - [`MockStreamClient`]：脚本化 mock，支持注入限流/失败场景
//! - [`RemoteStreamClient`]：TCP + newline-delimited JSON 的远端客户端
//!
//! 按配置的 `client_type` 标签在构造期选择实现。

mod mock;
mod remote;

pub use contracts::StreamClient;
pub use mock::{MockAttempt, MockConfig, MockStreamClient};
pub use remote::{RemoteClientConfig, RemoteStreamClient};
