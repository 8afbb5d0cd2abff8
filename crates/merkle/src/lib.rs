//! Merkle commitments over deposit attestations
//!
//! This crate commits an ordered set of fixed-width records to a single
//! BN254 field element and proves membership of one record against it.
//! The same root must come out of this crate and out of the circuit that
//! restates [`MerklePath::verify`], so every step is deterministic:
//! - Leaf encoding: records are packed into field elements by a pinned
//!   [`LeafLayout`] and compressed with a [`FieldHasher`]
//! - Shape: leaves are padded with [`Fr::ZERO`] to a power of two
//! - Root: [`MerkleTree::build`] keeps every layer, [`fold_root`] keeps none
//! - Paths: [`MerkleTree::get_proof`] and [`fold_path`] always agree

mod encoding;
mod error;
mod field;
mod fold;
mod hasher;
mod proof;
mod record;
mod shape;
mod tree;
mod zeros;

pub use encoding::{ByteOrder, FieldSpec, LeafEncoder, LeafLayout, Segment, ELEMENT_PAYLOAD};
pub use error::{MerkleError, Result};
pub use field::{Fr, MODULUS_BE};
pub use fold::{fold_path, fold_root};
pub use hasher::{FieldHasher, Keccak256Hasher, PoseidonHasher, MAX_HASH_INPUTS};
pub use proof::{verify_membership, MembershipVerifier, MerklePath, NativeVerifier};
pub use record::{AddressRecord, AttestedRecord, LeafRecord};
pub use shape::{TreeShape, MAX_DEPTH};
pub use tree::MerkleTree;
pub use zeros::ZeroCache;

#[cfg(test)]
mod tests {
    use super::*;

    fn record(i: u8) -> AttestedRecord {
        AttestedRecord::from_slices(&[i; 20], &[i.wrapping_mul(3); 32], &[i.wrapping_add(7); 32])
            .unwrap()
    }

    #[test]
    fn test_empty_commitment() {
        let tree = MerkleTree::<PoseidonHasher>::build(&[]).unwrap();
        assert_eq!(tree.root(), Fr::ZERO);
        assert_eq!(fold_root::<PoseidonHasher>(vec![]).unwrap(), Fr::ZERO);
    }

    #[test]
    fn test_record_commit_and_proof() {
        let encoder = LeafEncoder::<PoseidonHasher>::new(LeafLayout::attested_deposit());
        let records: Vec<_> = (0..5).map(record).collect();
        let leaves = encoder.encode_all(&records).unwrap();

        let tree = MerkleTree::<PoseidonHasher>::build(&leaves).unwrap();
        let proof = tree.get_proof(4).unwrap();

        let leaf = encoder.encode_record(&records[4]).unwrap();
        assert!(proof.verify::<PoseidonHasher>(&leaf, &tree.root()).is_ok());
        assert_eq!(fold_root::<PoseidonHasher>(leaves).unwrap(), tree.root());
    }

    #[test]
    fn test_value_change_changes_root() {
        let encoder = LeafEncoder::<PoseidonHasher>::new(LeafLayout::attested_deposit());
        let records: Vec<_> = (0..9).map(record).collect();
        let mut altered = records.clone();
        altered[6].value.0[0] ^= 0x80;

        let a = fold_root::<PoseidonHasher>(encoder.encode_all(&records).unwrap()).unwrap();
        let b = fold_root::<PoseidonHasher>(encoder.encode_all(&altered).unwrap()).unwrap();
        assert_ne!(a, b);
    }
}
