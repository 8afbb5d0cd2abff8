//! Inclusion proof verification

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::{MerkleError, Result},
    hasher::FieldHasher,
    shape::MAX_DEPTH,
    Fr,
};

/// Inclusion path for one leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerklePath {
    /// Leaf position; bit `i` selects the side at height `i`.
    pub index: u64,
    /// Sibling hashes from leaf to root. Its length is the tree depth.
    pub siblings: Vec<Fr>,
}

impl MerklePath {
    /// Pair an index with its siblings.
    pub const fn new(index: u64, siblings: Vec<Fr>) -> Self {
        Self { index, siblings }
    }

    /// Depth of the tree this path belongs to.
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Recompute the root reached from `leaf`.
    ///
    /// Fails if the index has bits set above the path depth, so a path
    /// proves exactly one position.
    pub fn compute_root<H: FieldHasher>(&self, leaf: &Fr) -> Result<Fr> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            return Err(MerkleError::invalid(format!(
                "path depth {depth} exceeds limit {MAX_DEPTH}"
            )));
        }
        if self.index >> depth != 0 {
            return Err(MerkleError::IndexOutOfRange { index: self.index, count: 1 << depth });
        }

        let mut current = *leaf;
        let mut index = self.index;
        for sibling in &self.siblings {
            current = if index & 1 == 0 {
                H::hash_pair(&current, sibling)
            } else {
                H::hash_pair(sibling, &current)
            };
            index >>= 1;
        }
        Ok(current)
    }

    /// Check that `leaf` sits at `index` under `root`.
    pub fn verify<H: FieldHasher>(&self, leaf: &Fr, root: &Fr) -> Result<()> {
        let computed = self.compute_root::<H>(leaf)?;
        if computed == *root {
            return Ok(());
        }
        warn!(index = self.index, expected = %root, %computed, "merkle proof rejected");
        Err(MerkleError::VerificationFailed { expected: *root, computed })
    }
}

/// Check `leaf` at `index` against `root` using `siblings`.
pub fn verify_membership<H: FieldHasher>(
    leaf: &Fr,
    index: u64,
    siblings: &[Fr],
    root: &Fr,
) -> Result<()> {
    MerklePath::new(index, siblings.to_vec()).verify::<H>(leaf, root)
}

/// Seam for the membership check.
///
/// The off-circuit implementation is [`NativeVerifier`]; the constrained
/// restatement of the same algorithm sits behind this trait in the prover.
pub trait MembershipVerifier {
    /// Accept or reject `leaf` under `root`.
    fn verify_membership(&self, leaf: &Fr, path: &MerklePath, root: &Fr) -> Result<()>;
}

/// Ordinary, unconstrained verification with hasher `H`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeVerifier<H>(PhantomData<fn() -> H>);

impl<H> NativeVerifier<H> {
    /// Verifier for hasher `H`.
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<H: FieldHasher> MembershipVerifier for NativeVerifier<H> {
    fn verify_membership(&self, leaf: &Fr, path: &MerklePath, root: &Fr) -> Result<()> {
        path.verify::<H>(leaf, root)
    }
}
