//! Dispatcher error types

use thiserror::Error;

use contracts::ProducerError;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Fatal collaborator error aborted the retry loop.
    ///
    /// Carries the count of records that had already failed permanently
    /// before the abort, so callers keep the partial accounting.
    #[error("dispatch aborted after {failed_records} permanent record failures: {source}")]
    Aborted {
        failed_records: usize,
        #[source]
        source: ProducerError,
    },
}

impl DispatchError {
    /// Create an abort error
    pub fn aborted(failed_records: usize, source: ProducerError) -> Self {
        Self::Aborted {
            failed_records,
            source,
        }
    }

    /// Permanently-failed count accumulated before the abort
    pub fn failed_records(&self) -> usize {
        match self {
            Self::Aborted { failed_records, .. } => *failed_records,
        }
    }
}
