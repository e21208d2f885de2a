//! Result aggregation and export
//!
//! Shard results are flattened in shard order and serialized as one pretty-printed
//! JSON array. No sorting or de-duplication happens here.

mod size;

pub use size::format_size;

use serde::Serialize;
use std::path::Path;

/// Decimal places used when reporting export sizes
pub const SIZE_DECIMALS: usize = 2;

/// A serialized export, ready to be written
#[derive(Debug, Clone)]
pub struct Export {
    /// Pretty-printed JSON document
    pub json: String,

    /// Number of records in the document
    pub records: usize,
}

impl Export {
    /// Byte length of the serialized document
    pub fn size_bytes(&self) -> u64 {
        self.json.len() as u64
    }

    /// Human readable size of the document
    pub fn display_size(&self) -> String {
        format_size(self.size_bytes(), SIZE_DECIMALS)
    }

    /// Writes the document to `path` in a single write
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.json)
    }
}

/// Flattens shard results and serializes them with two-space indentation
pub fn export<T: Serialize>(shards: Vec<Vec<T>>) -> serde_json::Result<Export> {
    let records: Vec<T> = shards.into_iter().flatten().collect();
    let json = serde_json::to_string_pretty(&records)?;

    Ok(Export {
        json,
        records: records.len(),
    })
}
