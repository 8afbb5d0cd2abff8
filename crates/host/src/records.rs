//! Record files produced by the source-chain indexer

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::info;

/// `{"records": [...]}`, in commitment order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordFile<R> {
    /// Records, leaf 0 first
    pub records: Vec<R>,
}

impl<R: DeserializeOwned> RecordFile<R> {
    /// Read and parse a record file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading records from {}", path.display()))?;
        let file: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing records in {}", path.display()))?;
        info!(count = file.records.len(), path = %path.display(), "loaded records");
        Ok(file)
    }
}

impl<R: Serialize> RecordFile<R> {
    /// Write the record file as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing records to {}", path.display()))
    }
}
