//! Commitment building over an indexed record set

use anyhow::{Context, Result};
use tracing::{debug, info};
use xbridge_merkle::{
    fold_path, fold_root, FieldHasher, Fr, LeafEncoder, LeafLayout, LeafRecord, MerklePath,
    MerkleTree, TreeShape,
};

use crate::witness::{CommitmentSummary, MembershipWitness};

/// Encodes records once and answers root and proof queries over them.
///
/// Root-only and single-proof queries fold a copy of the leaves; batches of
/// proofs materialize the full tree once and walk it.
#[derive(Debug)]
pub struct Committer<H, R> {
    encoder: LeafEncoder<H>,
    records: Vec<R>,
    leaves: Vec<Fr>,
    tree: Option<MerkleTree<H>>,
}

impl<H: FieldHasher, R: LeafRecord + Clone + Sync> Committer<H, R> {
    /// Encode `records` with `layout`.
    pub fn new(layout: LeafLayout, records: Vec<R>) -> Result<Self> {
        let encoder = LeafEncoder::<H>::new(layout);
        let leaves = encoder.encode_all(&records).context("encoding records")?;
        debug!(count = leaves.len(), layout = encoder.layout().name(), "encoded leaves");
        Ok(Self { encoder, records, leaves, tree: None })
    }

    /// Encoded leaves in commitment order
    pub fn leaves(&self) -> &[Fr] {
        &self.leaves
    }

    /// Number of committed records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are committed
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Merkle root
    pub fn root(&self) -> Result<Fr> {
        match &self.tree {
            Some(tree) => Ok(tree.root()),
            None => Ok(fold_root::<H>(self.leaves.clone())?),
        }
    }

    /// Build and keep every layer, for repeated proof queries
    pub fn materialize(&mut self) -> Result<&MerkleTree<H>> {
        if self.tree.is_none() {
            self.tree = Some(MerkleTree::<H>::build(&self.leaves)?);
        }
        self.tree.as_ref().context("tree missing after build")
    }

    /// Root plus the parameters a verifier needs to reproduce it
    pub fn summary(&self) -> Result<CommitmentSummary> {
        let summary = CommitmentSummary {
            hasher: H::NAME.to_string(),
            layout: self.encoder.layout().clone(),
            shape: TreeShape::for_count(self.leaves.len())?,
            root: self.root()?,
        };
        info!(
            count = summary.shape.count,
            depth = summary.shape.depth,
            root = %summary.root,
            "computed commitment"
        );
        Ok(summary)
    }

    /// Witness for the record at `index`
    pub fn witness(&self, index: usize) -> Result<MembershipWitness<R>> {
        let (path, root) = match &self.tree {
            Some(tree) => (tree.get_proof(index)?, tree.root()),
            None => (fold_path::<H>(self.leaves.clone(), index)?, self.root()?),
        };
        self.assemble(index, path, root)
    }

    /// Witnesses for several records from one materialized tree
    pub fn witnesses(&mut self, indices: &[usize]) -> Result<Vec<MembershipWitness<R>>> {
        self.materialize()?;
        indices.iter().map(|&index| self.witness(index)).collect()
    }

    fn assemble(&self, index: usize, path: MerklePath, root: Fr) -> Result<MembershipWitness<R>> {
        let record = self
            .records
            .get(index)
            .cloned()
            .with_context(|| format!("no record at index {index}"))?;
        Ok(MembershipWitness {
            hasher: H::NAME.to_string(),
            layout: self.encoder.layout().clone(),
            record,
            leaf: self.leaves[index],
            path,
            root,
        })
    }
}
