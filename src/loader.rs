//! Log file loading
//!
//! Reads a whole log file, decodes it, and extracts one record per usable
//! line, preserving file order. Decoding failures are fatal for the file;
//! individual bad lines are counted and skipped.

use crate::decode::{decode_bytes, TextEncoding};
use crate::error::IngestError;
use crate::record::{extract_record, EventRecord};
use std::path::{Path, PathBuf};

/// Records loaded from one log file
#[derive(Debug, Clone)]
pub struct LoadedLog {
    pub path: PathBuf,
    /// Encoding the file was decoded with
    pub encoding: TextEncoding,
    /// Extracted records, in file order
    pub records: Vec<EventRecord>,
    /// Non-blank lines that did not yield a record
    pub skipped_lines: usize,
}

impl LoadedLog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load a log file using the default encoding candidates
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<LoadedLog, IngestError> {
    load_records_with(path, &TextEncoding::CANDIDATES)
}

/// Load a log file, trying `candidates` in order
pub fn load_records_with<P: AsRef<Path>>(
    path: P,
    candidates: &[TextEncoding],
) -> Result<LoadedLog, IngestError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let decoded = decode_bytes(&bytes, candidates).ok_or_else(|| IngestError::Undecodable {
        path: path.to_path_buf(),
        tried: candidates.to_vec(),
    })?;

    let (records, skipped_lines) = parse_lines(&decoded.text);

    tracing::debug!(
        path = %path.display(),
        encoding = %decoded.encoding,
        records = records.len(),
        skipped = skipped_lines,
        "loaded log file"
    );
    if skipped_lines > 0 {
        tracing::info!(
            "{}: skipped {} line(s) without a parseable JSON object",
            path.display(),
            skipped_lines
        );
    }

    Ok(LoadedLog {
        path: path.to_path_buf(),
        encoding: decoded.encoding,
        records,
        skipped_lines,
    })
}

/// Extract records from decoded text, returning them with the skip count
pub fn parse_lines(text: &str) -> (Vec<EventRecord>, usize) {
    let mut records = Vec::new();
    let mut skipped = 0;

    for line in text.split(is_line_break) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match extract_record(line) {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    (records, skipped)
}

/// Line boundaries: LF, CR, and the Unicode separators log shippers emit
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}
