//! Padded width and depth derived from a leaf count

use serde::{Deserialize, Serialize};

use crate::error::{MerkleError, Result};

/// Deepest tree the engine will size.
pub const MAX_DEPTH: usize = 32;

/// Padded width and depth of a tree holding `count` leaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeShape {
    /// Number of real leaves.
    pub count: usize,
    /// Smallest power of two `>= max(count, 1)`.
    pub padded_size: usize,
    /// `log2(padded_size)`.
    pub depth: usize,
}

impl TreeShape {
    /// Size a tree for `count` leaves.
    ///
    /// Zero and one leaf both give a single-slot tree of depth 0.
    pub fn for_count(count: usize) -> Result<Self> {
        let padded_size = count.max(1).checked_next_power_of_two().ok_or_else(|| {
            MerkleError::invalid(format!("leaf count {count} has no power-of-two width"))
        })?;
        let depth = padded_size.trailing_zeros() as usize;
        if depth > MAX_DEPTH {
            return Err(MerkleError::invalid(format!(
                "leaf count {count} needs depth {depth}, limit is {MAX_DEPTH}"
            )));
        }
        Ok(Self { count, padded_size, depth })
    }

    /// Size a tree from a signed count supplied across a foreign interface.
    pub fn try_from_signed(count: i64) -> Result<Self> {
        let count = usize::try_from(count)
            .map_err(|_| MerkleError::invalid(format!("negative leaf count {count}")))?;
        Self::for_count(count)
    }

    /// Whether `index` addresses a real leaf.
    pub const fn contains(&self, index: usize) -> bool {
        index < self.count
    }

    /// Error unless `index` addresses a real leaf.
    pub fn check_index(&self, index: usize) -> Result<()> {
        if self.contains(index) {
            Ok(())
        } else {
            Err(MerkleError::IndexOutOfRange { index: index as u64, count: self.count as u64 })
        }
    }
}
