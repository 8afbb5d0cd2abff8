//! Membership witnesses handed to the proving routine

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use xbridge_merkle::{
    FieldHasher, Fr, LeafEncoder, LeafLayout, LeafRecord, MembershipVerifier, MerklePath,
    NativeVerifier, TreeShape,
};

/// Published commitment over one record set
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentSummary {
    /// Hasher name
    pub hasher: String,
    /// Leaf layout, including its byte order
    pub layout: LeafLayout,
    /// Count, padded size and depth
    pub shape: TreeShape,
    /// Merkle root
    pub root: Fr,
}

/// Everything the circuit needs to assert one record's membership
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MembershipWitness<R> {
    /// Hasher name
    pub hasher: String,
    /// Leaf layout the record was encoded with
    pub layout: LeafLayout,
    /// The committed record
    pub record: R,
    /// Encoded leaf
    pub leaf: Fr,
    /// Inclusion path
    pub path: MerklePath,
    /// Root the path must reach
    pub root: Fr,
}

impl<R: LeafRecord> MembershipWitness<R> {
    /// Re-encode the record and re-run the path check.
    ///
    /// A rejected path is returned as an error and must not be retried.
    pub fn verify<H: FieldHasher>(&self) -> Result<()> {
        if self.hasher != H::NAME {
            bail!("witness built with {}, verifying with {}", self.hasher, H::NAME);
        }
        let leaf = LeafEncoder::<H>::new(self.layout.clone())
            .encode_record(&self.record)
            .context("re-encoding witness record")?;
        ensure!(leaf == self.leaf, "record encodes to {leaf}, witness carries {}", self.leaf);

        NativeVerifier::<H>::new()
            .verify_membership(&self.leaf, &self.path, &self.root)
            .context("membership proof rejected")?;
        Ok(())
    }
}

impl<R: Serialize> MembershipWitness<R> {
    /// Compact binary form for the prover's input stream
    pub fn to_bincode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).context("serializing witness")
    }

    /// Pretty JSON form
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing witness")
    }
}

impl<R: for<'de> Deserialize<'de>> MembershipWitness<R> {
    /// Parse the binary form
    pub fn from_bincode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).context("deserializing witness")
    }

    /// Parse the JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("deserializing witness")
    }
}
