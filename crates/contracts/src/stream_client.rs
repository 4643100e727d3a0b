//! StreamClient trait - Dispatcher submission interface
//!
//! Defines the abstract interface for the stream collaborator.

use crate::{Batch, BatchResult, ProducerError};

/// Stream submission trait
///
/// All stream client implementations must implement this trait.
#[trait_variant::make(StreamClient: Send)]
pub trait LocalStreamClient {
    /// Client name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Open the client (connect, authenticate)
    ///
    /// # Errors
    /// Returns a connection error if the stream endpoint is unreachable
    async fn open(&mut self) -> Result<(), ProducerError>;

    /// Submit a batch and return per-record results
    ///
    /// A batch-level throughput rejection is reported as
    /// [`ProducerError::ThroughputExceeded`]; per-record rejections come
    /// back inside the [`BatchResult`].
    async fn submit(&self, batch: &Batch) -> Result<BatchResult, ProducerError>;

    /// Probe stream availability
    async fn healthy(&self) -> Result<bool, ProducerError>;

    /// Close the client
    async fn close(&mut self) -> Result<(), ProducerError>;
}
