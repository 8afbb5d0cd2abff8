//! Field hashers for leaves and internal nodes

use poseidon_bn128::poseidon;
use tiny_keccak::{Hasher, Keccak};

use crate::{
    error::{MerkleError, Result},
    Fr,
};

/// Largest input count accepted by [`FieldHasher::hash_elements`].
pub const MAX_HASH_INPUTS: usize = 16;

/// Two-to-one and many-to-one hashing over [`Fr`].
///
/// Implementations must be deterministic and agree bit for bit with the
/// counterpart that verifies the same commitments.
pub trait FieldHasher: Send + Sync + 'static {
    /// Stable identifier, used to key memoized tables and in summaries.
    const NAME: &'static str;

    /// Hash two child nodes into their parent.
    fn hash_pair(left: &Fr, right: &Fr) -> Fr;

    /// Compress `1..=MAX_HASH_INPUTS` elements into one.
    fn hash_elements(inputs: &[Fr]) -> Result<Fr>;
}

fn check_arity(len: usize) -> Result<()> {
    if len == 0 || len > MAX_HASH_INPUTS {
        return Err(MerkleError::invalid(format!(
            "hash arity {len} outside 1..={MAX_HASH_INPUTS}"
        )));
    }
    Ok(())
}

/// Circom-compatible Poseidon over BN254.
#[derive(Clone, Copy, Debug, Default)]
pub struct PoseidonHasher;

impl FieldHasher for PoseidonHasher {
    const NAME: &'static str = "poseidon-bn254";

    fn hash_pair(left: &Fr, right: &Fr) -> Fr {
        let out = poseidon(2, &[left.to_scalar(), right.to_scalar()])
            .expect("poseidon supports two inputs");
        Fr::from_scalar(&out)
    }

    fn hash_elements(inputs: &[Fr]) -> Result<Fr> {
        check_arity(inputs.len())?;
        let scalars: Vec<_> = inputs.iter().map(|fe| fe.to_scalar()).collect();
        let out = poseidon(inputs.len() as u8, &scalars)
            .map_err(|e| MerkleError::invalid(format!("poseidon hash failed: {e:?}")))?;
        Ok(Fr::from_scalar(&out))
    }
}

/// Keccak256 over big-endian element encodings, reduced into the field
#[derive(Clone, Copy, Debug, Default)]
pub struct Keccak256Hasher;

impl Keccak256Hasher {
    fn digest<'a>(inputs: impl IntoIterator<Item = &'a Fr>) -> Fr {
        let mut hasher = Keccak::v256();
        for input in inputs {
            hasher.update(input.as_bytes());
        }
        let mut output = [0u8; 32];
        hasher.finalize(&mut output);
        Fr::from_be_bytes_reduced(&output)
    }
}

impl FieldHasher for Keccak256Hasher {
    const NAME: &'static str = "keccak256-bn254";

    fn hash_pair(left: &Fr, right: &Fr) -> Fr {
        Self::digest([left, right])
    }

    fn hash_elements(inputs: &[Fr]) -> Result<Fr> {
        check_arity(inputs.len())?;
        Ok(Self::digest(inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_pair() {
        let left = Fr::from_u64(1);
        let right = Fr::from_u64(2);
        let hash = PoseidonHasher::hash_pair(&left, &right);
        assert_ne!(hash, Fr::ZERO);
        assert_ne!(hash, PoseidonHasher::hash_pair(&right, &left));
        assert_eq!(hash, PoseidonHasher::hash_pair(&left, &right));
    }

    #[test]
    fn test_poseidon_matches_circomlib() {
        // poseidon([1, 2]) from circomlibjs
        let expected: Fr = "0x115cc0f5e7d690413df64c6b9662e9cf2a3617f2743245519e19607a4417189a"
            .parse()
            .unwrap();
        assert_eq!(PoseidonHasher::hash_pair(&Fr::from_u64(1), &Fr::from_u64(2)), expected);
    }

    #[test]
    fn test_pair_equals_two_element_hash() {
        let (a, b) = (Fr::from_u64(7), Fr::from_u64(9));
        assert_eq!(PoseidonHasher::hash_pair(&a, &b), PoseidonHasher::hash_elements(&[a, b]).unwrap());
        assert_eq!(Keccak256Hasher::hash_pair(&a, &b), Keccak256Hasher::hash_elements(&[a, b]).unwrap());
    }

    #[test]
    fn test_keccak_of_zero_pair() {
        // keccak256(0^64) = ad3228b6...; reduced modulo p
        let hash = Keccak256Hasher::hash_pair(&Fr::ZERO, &Fr::ZERO);
        let raw = hex::decode("ad3228b676f7d3cd4284a5443f17f1962b36e491b30a40b2405849e597ba5fb5").unwrap();
        assert_eq!(hash, Fr::from_be_bytes_reduced(&raw));
    }

    #[test]
    fn test_arity_bounds() {
        assert!(matches!(PoseidonHasher::hash_elements(&[]), Err(MerkleError::InvalidArgument(_))));
        let too_many = vec![Fr::ZERO; MAX_HASH_INPUTS + 1];
        assert!(Keccak256Hasher::hash_elements(&too_many).is_err());
        assert!(PoseidonHasher::hash_elements(&[Fr::from_u64(3)]).is_ok());
    }
}
