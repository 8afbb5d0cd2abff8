//! Configuration

use std::{env, path::PathBuf};

use serde::{Deserialize, Serialize};
use xbridge_merkle::{ByteOrder, LeafLayout};

/// Hash function used for leaves and nodes
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum HasherKind {
    /// Poseidon over BN254, restated by the circuit
    #[default]
    Poseidon,
    /// Keccak256 reduced into BN254, for EVM-side verifiers
    Keccak,
}

impl From<&str> for HasherKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "keccak" | "keccak256" => Self::Keccak,
            _ => Self::Poseidon,
        }
    }
}

/// Shape of the committed records
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LayoutKind {
    /// address + attestation key + value
    #[default]
    Attested,
    /// address only
    Address,
}

impl From<&str> for LayoutKind {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "address" | "ordered-address" => Self::Address,
            _ => Self::Attested,
        }
    }
}

/// Committer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommitterConfig {
    /// Indexer output: JSON record file
    pub records_path: PathBuf,
    /// Where summaries and witnesses are written
    pub output_dir: PathBuf,
    /// Hash function
    pub hasher: HasherKind,
    /// Record shape
    pub layout: LayoutKind,
    /// Element byte order; must match the deployed counterpart
    pub byte_order: ByteOrder,
}

impl Default for CommitterConfig {
    fn default() -> Self {
        Self {
            records_path: PathBuf::from("records.json"),
            output_dir: PathBuf::from("out"),
            hasher: HasherKind::default(),
            layout: LayoutKind::default(),
            byte_order: ByteOrder::LittleEndian,
        }
    }
}

impl CommitterConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            records_path: env::var("RECORDS_PATH").map(PathBuf::from).unwrap_or(defaults.records_path),
            output_dir: env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            hasher: env::var("LEAF_HASHER")
                .map(|s| HasherKind::from(s.as_str()))
                .unwrap_or_default(),
            layout: env::var("LEAF_LAYOUT")
                .map(|s| LayoutKind::from(s.as_str()))
                .unwrap_or_default(),
            byte_order: env::var("LEAF_BYTE_ORDER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.byte_order),
        }
    }

    /// Leaf layout selected by `layout` and `byte_order`
    pub fn leaf_layout(&self) -> LeafLayout {
        let layout = match self.layout {
            LayoutKind::Attested => LeafLayout::attested_deposit(),
            LayoutKind::Address => LeafLayout::ordered_address(),
        };
        layout.with_byte_order(self.byte_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing_falls_back() {
        assert_eq!(HasherKind::from("KECCAK"), HasherKind::Keccak);
        assert_eq!(HasherKind::from("sha3"), HasherKind::Poseidon);
        assert_eq!(LayoutKind::from("address"), LayoutKind::Address);
        assert_eq!(LayoutKind::from(""), LayoutKind::Attested);
    }

    #[test]
    fn test_leaf_layout_follows_config() {
        let config = CommitterConfig {
            layout: LayoutKind::Address,
            byte_order: ByteOrder::BigEndian,
            ..Default::default()
        };
        let layout = config.leaf_layout();
        assert_eq!(layout.name(), "ordered-address");
        assert_eq!(layout.byte_order(), ByteOrder::BigEndian);
        assert_eq!(CommitterConfig::default().leaf_layout(), LeafLayout::attested_deposit());
    }
}
