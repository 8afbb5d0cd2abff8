//! File-based commit / prove / verify flows used by the committer binary

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;
use xbridge_merkle::{FieldHasher, LeafRecord};

use crate::{
    committer::Committer,
    config::CommitterConfig,
    records::RecordFile,
    witness::{CommitmentSummary, MembershipWitness},
};

/// Record types the binary can commit
pub trait CommittedRecord: LeafRecord + Clone + Sync + Serialize + DeserializeOwned {}

impl<R: LeafRecord + Clone + Sync + Serialize + DeserializeOwned> CommittedRecord for R {}

fn load_committer<H: FieldHasher, R: CommittedRecord>(config: &CommitterConfig) -> Result<Committer<H, R>> {
    let file = RecordFile::<R>::load(&config.records_path)?;
    Committer::new(config.leaf_layout(), file.records)
}

fn write_output(config: &CommitterConfig, name: &str, contents: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let path = config.output_dir.join(name);
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// Compute the root and write `commitment.json`
pub fn commit<H: FieldHasher, R: CommittedRecord>(config: &CommitterConfig) -> Result<CommitmentSummary> {
    let summary = load_committer::<H, R>(config)?.summary()?;
    let path = write_output(config, "commitment.json", serde_json::to_string_pretty(&summary)?.as_bytes())?;
    info!(path = %path.display(), root = %summary.root, "wrote commitment");
    Ok(summary)
}

/// Build witnesses for `indices` and write `witness-<i>.json` and `.bin`
pub fn prove<H: FieldHasher, R: CommittedRecord>(
    config: &CommitterConfig,
    indices: &[usize],
) -> Result<Vec<MembershipWitness<R>>> {
    let mut committer = load_committer::<H, R>(config)?;
    let witnesses = if let [index] = indices {
        vec![committer.witness(*index)?]
    } else {
        committer.witnesses(indices)?
    };

    for (index, witness) in indices.iter().zip(&witnesses) {
        witness.verify::<H>()?;
        write_output(config, &format!("witness-{index}.json"), witness.to_json()?.as_bytes())?;
        let path = write_output(config, &format!("witness-{index}.bin"), &witness.to_bincode()?)?;
        info!(index, depth = witness.path.depth(), path = %path.display(), "wrote witness");
    }
    Ok(witnesses)
}

/// Verify a JSON witness file
pub fn verify<H: FieldHasher, R: CommittedRecord>(path: &Path) -> Result<MembershipWitness<R>> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let witness = MembershipWitness::<R>::from_json(&json)?;
    witness.verify::<H>()?;
    info!(index = witness.path.index, root = %witness.root, "witness verified");
    Ok(witness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbridge_merkle::{AttestedRecord, Keccak256Hasher, PoseidonHasher};

    fn workspace(tag: &str) -> CommitterConfig {
        let dir = std::env::temp_dir().join(format!("xbridge-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let records: Vec<_> = (0..6u8)
            .map(|i| AttestedRecord::from_slices(&[i; 20], &[i + 1; 32], &[i + 2; 32]).unwrap())
            .collect();
        let records_path = dir.join("records.json");
        RecordFile { records }.save(&records_path).unwrap();
        CommitterConfig { records_path, output_dir: dir.join("out"), ..Default::default() }
    }

    #[test]
    fn test_commit_prove_verify() {
        let config = workspace("flow");
        let summary = commit::<PoseidonHasher, AttestedRecord>(&config).unwrap();
        assert_eq!(summary.shape.count, 6);

        let witnesses = prove::<PoseidonHasher, AttestedRecord>(&config, &[2, 5]).unwrap();
        assert!(witnesses.iter().all(|w| w.root == summary.root));

        let verified =
            verify::<PoseidonHasher, AttestedRecord>(&config.output_dir.join("witness-5.json")).unwrap();
        assert_eq!(verified.path.index, 5);
        assert!(config.output_dir.join("witness-2.bin").exists());

        // wrong hasher for the file
        assert!(verify::<Keccak256Hasher, AttestedRecord>(&config.output_dir.join("witness-2.json")).is_err());

        fs::remove_dir_all(config.output_dir.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_malformed_layout_is_an_error() {
        let config = workspace("layout");
        prove::<PoseidonHasher, AttestedRecord>(&config, &[1]).unwrap();

        let path = config.output_dir.join("witness-1.json");
        let mut witness: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        witness["layout"]["fields"] = serde_json::json!([{ "name": "address", "width": 20 }]);
        witness["layout"]["elements"] = serde_json::json!([[{ "field": 3, "start": 0, "end": 20 }]]);
        fs::write(&path, witness.to_string()).unwrap();

        let err = verify::<PoseidonHasher, AttestedRecord>(&path).unwrap_err();
        assert!(format!("{err:#}").contains("deserializing witness"), "{err:#}");

        fs::remove_dir_all(config.output_dir.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_missing_records_file() {
        let config = CommitterConfig {
            records_path: PathBuf::from("/nonexistent/records.json"),
            ..Default::default()
        };
        let err = commit::<PoseidonHasher, AttestedRecord>(&config).unwrap_err();
        assert!(format!("{err:#}").contains("reading records"));
    }
}
