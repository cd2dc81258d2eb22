//! Fatal ingestion errors
//!
//! Only two things can abort a run: a log file that cannot be read, and a
//! log file that no candidate encoding accepts. Bad lines inside a readable
//! file are skipped by the loader and never surface here.

use std::path::PathBuf;
use thiserror::Error;

use crate::decode::TextEncoding;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read log file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not decode log file {} (tried {})", .path.display(), format_tried(.tried))]
    Undecodable {
        path: PathBuf,
        tried: Vec<TextEncoding>,
    },
}

fn format_tried(tried: &[TextEncoding]) -> String {
    tried
        .iter()
        .map(|e| e.label())
        .collect::<Vec<_>>()
        .join(", ")
}
