//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Throughput Model
//! - Rates are expressed in permits per second (f64); one permit admits one record
//! - Per-record failure codes come back aligned by submission position

mod blueprint;
mod error;
mod observer;
mod record;
mod result;
mod stream_client;

pub use blueprint::*;
pub use error::*;
pub use observer::{DispatchObserver, NoopObserver};
pub use record::*;
pub use result::*;
pub use stream_client::StreamClient;
