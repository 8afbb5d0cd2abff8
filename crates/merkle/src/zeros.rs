//! Hashes of empty subtrees, one per height

use std::{
    collections::HashMap,
    sync::{Arc, OnceLock, RwLock},
};

use crate::{
    error::{MerkleError, Result},
    hasher::FieldHasher,
    shape::MAX_DEPTH,
    Fr,
};

type SharedTables = RwLock<HashMap<(&'static str, usize), Arc<ZeroCache>>>;

static SHARED: OnceLock<SharedTables> = OnceLock::new();

/// `zeros[0]` is the empty leaf, `zeros[h] = H(zeros[h - 1], zeros[h - 1])`.
///
/// Holds `depth + 1` entries, so `get(depth)` is the root of an empty tree of
/// that depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZeroCache {
    zeros: Vec<Fr>,
}

impl ZeroCache {
    /// Compute the table for `depth` levels, at most [`MAX_DEPTH`].
    pub fn new<H: FieldHasher>(depth: usize) -> Result<Self> {
        if depth > MAX_DEPTH {
            return Err(MerkleError::invalid(format!(
                "zero table depth {depth} exceeds limit {MAX_DEPTH}"
            )));
        }
        let mut zeros = Vec::with_capacity(depth + 1);
        let mut current = Fr::ZERO;
        zeros.push(current);
        for _ in 0..depth {
            current = H::hash_pair(&current, &current);
            zeros.push(current);
        }
        Ok(Self { zeros })
    }

    /// Process-wide memoized table for `(H, depth)`.
    pub fn shared<H: FieldHasher>(depth: usize) -> Result<Arc<Self>> {
        let tables = SHARED.get_or_init(Default::default);
        let key = (H::NAME, depth);

        if let Some(hit) = tables.read().unwrap_or_else(|e| e.into_inner()).get(&key) {
            return Ok(Arc::clone(hit));
        }

        let cache = Arc::new(Self::new::<H>(depth)?);
        let mut guard = tables.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(guard.entry(key).or_insert(cache)))
    }

    /// Root of an empty subtree of height `height`.
    ///
    /// Panics if `height > depth`.
    pub fn get(&self, height: usize) -> Fr {
        self.zeros[height]
    }

    /// Depth the table was built for.
    pub fn depth(&self) -> usize {
        self.zeros.len() - 1
    }

    /// All entries, empty leaf first.
    pub fn as_slice(&self) -> &[Fr] {
        &self.zeros
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Keccak256Hasher, PoseidonHasher};

    #[test]
    fn test_table_shape() {
        let zeros = ZeroCache::new::<PoseidonHasher>(4).unwrap();
        assert_eq!(zeros.as_slice().len(), 5);
        assert_eq!(zeros.depth(), 4);
        assert_eq!(zeros.get(0), Fr::ZERO);
        for h in 1..=4 {
            assert_eq!(zeros.get(h), PoseidonHasher::hash_pair(&zeros.get(h - 1), &zeros.get(h - 1)));
        }
    }

    #[test]
    fn test_depth_zero() {
        let zeros = ZeroCache::new::<Keccak256Hasher>(0).unwrap();
        assert_eq!(zeros.as_slice(), &[Fr::ZERO]);
    }

    #[test]
    fn test_prefix_stable() {
        let short = ZeroCache::new::<PoseidonHasher>(3).unwrap();
        let long = ZeroCache::new::<PoseidonHasher>(6).unwrap();
        assert_eq!(short.as_slice(), &long.as_slice()[..4]);
    }

    #[test]
    fn test_shared_is_memoized_per_hasher() {
        let a = ZeroCache::shared::<PoseidonHasher>(5).unwrap();
        let b = ZeroCache::shared::<PoseidonHasher>(5).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let k = ZeroCache::shared::<Keccak256Hasher>(5).unwrap();
        assert_ne!(a.get(5), k.get(5));
        assert_eq!(*k, ZeroCache::new::<Keccak256Hasher>(5).unwrap());
    }

    #[test]
    fn test_depth_limit() {
        assert_eq!(ZeroCache::new::<Keccak256Hasher>(MAX_DEPTH).unwrap().depth(), MAX_DEPTH);
        assert!(matches!(
            ZeroCache::new::<Keccak256Hasher>(MAX_DEPTH + 1),
            Err(MerkleError::InvalidArgument(_))
        ));
        assert!(ZeroCache::shared::<PoseidonHasher>(usize::MAX).is_err());
    }
}
