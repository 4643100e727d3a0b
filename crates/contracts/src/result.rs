//! Batch submission results and per-record outcome classification.

use serde::{Deserialize, Serialize};

/// Reserved failure code: the stream rejected this record because its
/// current write capacity was exceeded. Records carrying this code are
/// retryable; every other non-empty code is permanent.
pub const THROTTLED_ERROR_CODE: &str = "throughput_exceeded";

/// Result for a single record, aligned by submission position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordResult {
    /// Sequence number assigned by the stream on acceptance
    #[serde(default)]
    pub sequence: Option<String>,

    /// Failure code (None / empty = accepted)
    #[serde(default)]
    pub error_code: Option<String>,

    /// Human-readable failure detail
    #[serde(default)]
    pub error_message: Option<String>,
}

impl RecordResult {
    /// Accepted record with a sequence number
    pub fn accepted(sequence: impl Into<String>) -> Self {
        Self {
            sequence: Some(sequence.into()),
            error_code: None,
            error_message: None,
        }
    }

    /// Failed record with a code and message
    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sequence: None,
            error_code: Some(code.into()),
            error_message: Some(message.into()),
        }
    }

    /// Throttled record (retryable)
    pub fn throttled() -> Self {
        Self::failed(THROTTLED_ERROR_CODE, "rate exceeded for partition")
    }

    /// Classify this result into an outcome tag
    pub fn outcome(&self) -> RecordOutcome {
        match self.error_code.as_deref() {
            None | Some("") => RecordOutcome::Accepted,
            Some(THROTTLED_ERROR_CODE) => RecordOutcome::Throttled,
            Some(code) => RecordOutcome::Failed(code.to_string()),
        }
    }
}

/// Classification of one record's fate within a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Durably appended to the stream
    Accepted,
    /// Rejected for throughput; retryable
    Throttled,
    /// Rejected permanently with the given code; never retried
    Failed(String),
}

/// Batch-level response from the stream collaborator.
///
/// `results` is aligned with the submitted record positions. A response
/// whose `failed_record_count` is 0 means the entire batch was accepted
/// and per-record results need not be scanned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResult {
    /// Number of records that did not get accepted in this attempt
    #[serde(default)]
    pub failed_record_count: usize,

    /// Per-position results
    #[serde(default)]
    pub results: Vec<RecordResult>,
}

impl BatchResult {
    /// Build a response from per-record results, deriving the failure count
    pub fn from_results(results: Vec<RecordResult>) -> Self {
        let failed_record_count = results
            .iter()
            .filter(|r| !matches!(r.outcome(), RecordOutcome::Accepted))
            .count();
        Self {
            failed_record_count,
            results,
        }
    }

    /// Fully-accepted response for `count` records
    pub fn all_accepted(count: usize) -> Self {
        Self {
            failed_record_count: 0,
            results: (0..count)
                .map(|i| RecordResult::accepted(format!("seq-{i}")))
                .collect(),
        }
    }

    /// Whether the whole batch was accepted
    pub fn fully_accepted(&self) -> bool {
        self.failed_record_count == 0
    }
}
