//! Record source - reads JSONL record files and chunks them into batches.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;

use contracts::{Batch, Record};

/// One record per input line
#[derive(Debug, Deserialize)]
struct RecordLine {
    partition_key: String,
    #[serde(default)]
    ordering_key: Option<String>,
    /// UTF-8 payload text
    payload: String,
}

/// Read records from a JSONL file.
///
/// Blank lines are skipped; a malformed line aborts with its line number.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open record file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let parsed: RecordLine = serde_json::from_str(&line)
            .with_context(|| format!("Malformed record at line {}", index + 1))?;

        let mut record = Record::new(parsed.partition_key, Bytes::from(parsed.payload.into_bytes()));
        if let Some(ordering_key) = parsed.ordering_key {
            record = record.with_ordering_key(ordering_key);
        }
        records.push(record);
    }

    debug!(path = %path.display(), records = records.len(), "Record file loaded");
    Ok(records)
}

/// Chunk records into batches of at most `max_records`, preserving order
pub fn chunk_batches(stream: &str, records: Vec<Record>, max_records: usize) -> Vec<Batch> {
    let mut batches = Vec::new();
    let mut current = Vec::with_capacity(max_records.min(records.len()));

    for record in records {
        current.push(record);
        if current.len() == max_records {
            batches.push(Batch::new(stream, std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        batches.push(Batch::new(stream, current));
    }

    batches
}
