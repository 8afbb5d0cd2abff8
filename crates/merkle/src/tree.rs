//! Fully materialized Merkle tree, for serving many proofs from one build

use std::marker::PhantomData;

use rayon::prelude::*;
use tracing::debug;

use crate::{
    error::Result,
    hasher::{FieldHasher, PoseidonHasher},
    proof::MerklePath,
    shape::TreeShape,
    zeros::ZeroCache,
    Fr,
};

/// Every layer of a padded binary Merkle tree.
///
/// `layers[0]` holds the root, `layers[depth]` the leaves padded with
/// [`Fr::ZERO`] to a power of two.
#[derive(Clone, Debug)]
pub struct MerkleTree<H = PoseidonHasher> {
    shape: TreeShape,
    layers: Vec<Vec<Fr>>,
    _hasher: PhantomData<fn() -> H>,
}

impl<H: FieldHasher> MerkleTree<H> {
    /// Build every layer over `leaves`.
    ///
    /// Parents whose children are all padding take the cached empty-subtree
    /// hash instead of being hashed. Parents of one level are hashed in
    /// parallel; levels run bottom-up in sequence.
    pub fn build(leaves: &[Fr]) -> Result<Self> {
        let shape = TreeShape::for_count(leaves.len())?;
        let zeros = ZeroCache::shared::<H>(shape.depth)?;

        let mut layers = vec![Vec::new(); shape.depth + 1];
        let mut level = Vec::with_capacity(shape.padded_size);
        level.extend_from_slice(leaves);
        level.resize(shape.padded_size, Fr::ZERO);

        let mut real = leaves.len();
        for height in 0..shape.depth {
            let parent_real = real.div_ceil(2);
            let empty = zeros.get(height + 1);
            let parents: Vec<Fr> = level
                .par_chunks(2)
                .enumerate()
                .map(|(i, pair)| {
                    if i < parent_real {
                        H::hash_pair(&pair[0], &pair[1])
                    } else {
                        empty
                    }
                })
                .collect();
            layers[shape.depth - height] = std::mem::replace(&mut level, parents);
            real = parent_real;
        }
        layers[0] = level;

        debug!(
            count = shape.count,
            depth = shape.depth,
            hasher = H::NAME,
            root = %layers[0][0],
            "built merkle tree"
        );
        Ok(Self { shape, layers, _hasher: PhantomData })
    }

    /// Root of the tree.
    pub fn root(&self) -> Fr {
        self.layers[0][0]
    }

    /// Shape the tree was built with.
    pub const fn shape(&self) -> TreeShape {
        self.shape
    }

    /// Tree depth; also the length of every path.
    pub const fn depth(&self) -> usize {
        self.shape.depth
    }

    /// Number of real leaves.
    pub const fn len(&self) -> usize {
        self.shape.count
    }

    /// Whether the tree commits to no leaves.
    pub const fn is_empty(&self) -> bool {
        self.shape.count == 0
    }

    /// Real leaves, without padding.
    pub fn leaves(&self) -> &[Fr] {
        &self.layers[self.shape.depth][..self.shape.count]
    }

    /// Layer `level`, where 0 is the root and `depth` the padded leaves.
    pub fn layer(&self, level: usize) -> Option<&[Fr]> {
        self.layers.get(level).map(Vec::as_slice)
    }

    /// Sibling path for leaf `index`, leaf-adjacent sibling first.
    ///
    /// An empty tree answers index 0 with an empty path.
    pub fn get_proof(&self, index: usize) -> Result<MerklePath> {
        if !(self.is_empty() && index == 0) {
            self.shape.check_index(index)?;
        }

        let mut siblings = Vec::with_capacity(self.shape.depth);
        let mut position = index;
        for level in (1..=self.shape.depth).rev() {
            siblings.push(self.layers[level][position ^ 1]);
            position >>= 1;
        }
        Ok(MerklePath::new(index as u64, siblings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Keccak256Hasher, MerkleError};

    fn leaves(n: u64) -> Vec<Fr> {
        (1..=n).map(Fr::from_u64).collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree = MerkleTree::<PoseidonHasher>::build(&[]).unwrap();
        assert_eq!(tree.root(), Fr::ZERO);
        assert_eq!(tree.depth(), 0);
        assert!(tree.get_proof(0).unwrap().siblings.is_empty());
        assert!(tree.get_proof(1).is_err());
    }

    #[test]
    fn test_single_leaf_is_root() {
        let leaf = Fr::from_u64(42);
        let tree = MerkleTree::<PoseidonHasher>::build(&[leaf]).unwrap();
        assert_eq!(tree.root(), leaf);
        assert!(tree.get_proof(0).unwrap().siblings.is_empty());
    }

    #[test]
    fn test_layer_shapes() {
        let tree = MerkleTree::<Keccak256Hasher>::build(&leaves(5)).unwrap();
        assert_eq!(tree.depth(), 3);
        for level in 0..=3 {
            assert_eq!(tree.layer(level).unwrap().len(), 1 << level);
        }
        assert!(tree.layer(4).is_none());
        assert_eq!(tree.leaves(), &leaves(5)[..]);
        assert_eq!(tree.layer(3).unwrap()[5..], [Fr::ZERO; 3]);
    }

    #[test]
    fn test_cached_zeros_match_literal_hashing() {
        type H = Keccak256Hasher;
        for n in 0..70 {
            let tree = MerkleTree::<H>::build(&leaves(n)).unwrap();

            // hash every pair literally, padding included
            let mut level = tree.layer(tree.depth()).unwrap().to_vec();
            assert_eq!(level.len(), tree.shape().padded_size);
            while level.len() > 1 {
                level = level.chunks(2).map(|p| H::hash_pair(&p[0], &p[1])).collect();
            }
            assert_eq!(level[0], tree.root(), "n = {n}");
        }

        // 9 leaves, depth 4: the node over leaves 12..16 is all padding
        let tree = MerkleTree::<H>::build(&leaves(9)).unwrap();
        assert_eq!(tree.layer(2).unwrap()[3], ZeroCache::new::<H>(4).unwrap().get(2));
    }

    #[test]
    fn test_two_leaves() {
        let l = leaves(2);
        let tree = MerkleTree::<PoseidonHasher>::build(&l).unwrap();
        assert_eq!(tree.root(), PoseidonHasher::hash_pair(&l[0], &l[1]));
        assert_eq!(tree.get_proof(0).unwrap().siblings, vec![l[1]]);
        assert_eq!(tree.get_proof(1).unwrap().siblings, vec![l[0]]);
    }

    #[test]
    fn test_proof_index_out_of_range() {
        let tree = MerkleTree::<PoseidonHasher>::build(&leaves(5)).unwrap();
        assert_eq!(
            tree.get_proof(5).unwrap_err(),
            MerkleError::IndexOutOfRange { index: 5, count: 5 }
        );
        // padding slots are not provable
        assert!(tree.get_proof(7).is_err());
    }
}
