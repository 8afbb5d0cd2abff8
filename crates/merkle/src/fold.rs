//! Root and path computation by folding a leaf buffer in place
//!
//! Both functions take the buffer by value and overwrite it level by level,
//! so no layer beyond the leaves is ever allocated. Clone first if the leaves
//! are still needed.

use tracing::debug;

use crate::{
    error::Result,
    hasher::FieldHasher,
    proof::MerklePath,
    shape::TreeShape,
    zeros::ZeroCache,
    Fr,
};

/// Replace the live prefix of `buf` with its parent level.
///
/// `buf` holds only real nodes; a missing right child is `empty`.
fn collapse<H: FieldHasher>(buf: &mut Vec<Fr>, empty: Fr) {
    let parents = buf.len().div_ceil(2);
    for i in 0..parents {
        let left = buf[2 * i];
        let right = buf.get(2 * i + 1).copied().unwrap_or(empty);
        buf[i] = H::hash_pair(&left, &right);
    }
    buf.truncate(parents);
}

/// Merkle root of `leaves`, consuming the buffer.
pub fn fold_root<H: FieldHasher>(mut leaves: Vec<Fr>) -> Result<Fr> {
    let shape = TreeShape::for_count(leaves.len())?;
    if leaves.is_empty() {
        return Ok(Fr::ZERO);
    }
    let zeros = ZeroCache::shared::<H>(shape.depth)?;

    for height in 0..shape.depth {
        collapse::<H>(&mut leaves, zeros.get(height));
    }

    debug!(count = shape.count, depth = shape.depth, hasher = H::NAME, "folded merkle root");
    Ok(leaves[0])
}

/// Sibling path for `index`, consuming the buffer.
///
/// Agrees with [`MerkleTree::get_proof`](crate::MerkleTree::get_proof) for
/// every index, including the empty-set case.
pub fn fold_path<H: FieldHasher>(mut leaves: Vec<Fr>, index: usize) -> Result<MerklePath> {
    let shape = TreeShape::for_count(leaves.len())?;
    if leaves.is_empty() && index == 0 {
        return Ok(MerklePath::new(0, Vec::new()));
    }
    shape.check_index(index)?;
    let zeros = ZeroCache::shared::<H>(shape.depth)?;

    let mut siblings = Vec::with_capacity(shape.depth);
    let mut position = index;
    for height in 0..shape.depth {
        let empty = zeros.get(height);
        siblings.push(leaves.get(position ^ 1).copied().unwrap_or(empty));
        collapse::<H>(&mut leaves, empty);
        position >>= 1;
    }
    Ok(MerklePath::new(index as u64, siblings))
}
