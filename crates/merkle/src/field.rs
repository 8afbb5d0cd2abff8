//! BN254 scalar field elements as fixed 32-byte values

use std::{fmt, str::FromStr};

use num_bigint::BigUint;
use scalarff::{Bn128FieldElement, FieldElement};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MerkleError, Result};

/// BN254 scalar modulus, big-endian.
pub const MODULUS_BE: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29,
    0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91,
    0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

/// A field element, held as its canonical big-endian encoding.
///
/// The wrapped integer is always below [`MODULUS_BE`], so byte equality is
/// field equality.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fr([u8; 32]);

impl Fr {
    /// The identity-zero value. Also the padding leaf.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Interpret `bytes` as a big-endian integer, rejecting values `>= p`.
    pub fn try_from_be_bytes(bytes: [u8; 32]) -> Result<Self> {
        if bytes < MODULUS_BE {
            Ok(Self(bytes))
        } else {
            Err(MerkleError::NonCanonical(bytes))
        }
    }

    /// Interpret `bytes` as a big-endian integer and reduce it modulo `p`.
    pub fn from_be_bytes_reduced(bytes: &[u8]) -> Self {
        Self::from_biguint(&BigUint::from_bytes_be(bytes))
    }

    /// Interpret `bytes` as a little-endian integer and reduce it modulo `p`.
    pub fn from_le_bytes_reduced(bytes: &[u8]) -> Self {
        Self::from_biguint(&BigUint::from_bytes_le(bytes))
    }

    /// Small integer constant.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Canonical big-endian encoding.
    pub const fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Borrow the canonical big-endian encoding.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the identity-zero value.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub(crate) fn from_biguint(n: &BigUint) -> Self {
        Self::from_scalar(&Bn128FieldElement::from_biguint(n))
    }

    pub(crate) fn to_scalar(self) -> Bn128FieldElement {
        Bn128FieldElement::from_biguint(&BigUint::from_bytes_be(&self.0))
    }

    pub(crate) fn from_scalar(fe: &Bn128FieldElement) -> Self {
        let digits = fe.to_biguint().to_bytes_be();
        let mut bytes = [0u8; 32];
        // the reduced value never exceeds 32 bytes
        let len = digits.len().min(32);
        bytes[32 - len..].copy_from_slice(&digits[digits.len() - len..]);
        Self(bytes)
    }
}

impl fmt::Display for Fr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Fr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fr({self})")
    }
}

impl FromStr for Fr {
    type Err = MerkleError;

    /// Parses `0x`-prefixed or bare hex of at most 32 bytes.
    fn from_str(s: &str) -> Result<Self> {
        let mut clean = s.strip_prefix("0x").unwrap_or(s).to_string();
        if clean.len() % 2 == 1 {
            clean.insert(0, '0');
        }
        let raw = hex::decode(&clean)
            .map_err(|e| MerkleError::invalid(format!("invalid hex field element: {e}")))?;
        if raw.len() > 32 {
            return Err(MerkleError::width("field element", 32, raw.len()));
        }
        let mut bytes = [0u8; 32];
        bytes[32 - raw.len()..].copy_from_slice(&raw);
        Self::try_from_be_bytes(bytes)
    }
}

impl TryFrom<[u8; 32]> for Fr {
    type Error = MerkleError;

    fn try_from(bytes: [u8; 32]) -> Result<Self> {
        Self::try_from_be_bytes(bytes)
    }
}

impl From<Fr> for [u8; 32] {
    fn from(value: Fr) -> Self {
        value.0
    }
}

impl Serialize for Fr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Fr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        } else {
            let bytes = <[u8; 32]>::deserialize(deserializer)?;
            Self::try_from_be_bytes(bytes).map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulus_is_rejected() {
        assert!(matches!(Fr::try_from_be_bytes(MODULUS_BE), Err(MerkleError::NonCanonical(_))));

        let mut below = MODULUS_BE;
        below[31] = 0;
        assert!(Fr::try_from_be_bytes(below).is_ok());
    }

    #[test]
    fn test_reduction() {
        // p reduces to zero, p + 5 to five
        assert_eq!(Fr::from_be_bytes_reduced(&MODULUS_BE), Fr::ZERO);
        let mut p_plus_5 = MODULUS_BE;
        p_plus_5[31] += 5;
        assert_eq!(Fr::from_be_bytes_reduced(&p_plus_5), Fr::from_u64(5));
    }

    #[test]
    fn test_endianness() {
        let mut le = [0u8; 31];
        le[0] = 1;
        assert_eq!(Fr::from_le_bytes_reduced(&le), Fr::from_u64(1));

        // big-endian reads the same bytes as 2^240
        let be = Fr::from_be_bytes_reduced(&le);
        assert_eq!(be.as_bytes()[1], 1);
        assert_ne!(be, Fr::from_u64(1));
    }

    #[test]
    fn test_hex_text_form() {
        let fr = Fr::from_u64(0xabcd);
        let text = fr.to_string();
        assert_eq!(text.len(), 66);
        assert!(text.ends_with("abcd"));
        assert_eq!(text.parse::<Fr>().unwrap(), fr);
        assert_eq!("0xabcd".parse::<Fr>().unwrap(), fr);
        assert_eq!("abcd".parse::<Fr>().unwrap(), fr);
        assert!("0x0xabcd".parse::<Fr>().is_err());
        assert!("0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001"
            .parse::<Fr>()
            .is_err());
    }

    #[test]
    fn test_scalar_round_trip() {
        let fr = Fr::from_u64(123_456_789);
        assert_eq!(Fr::from_scalar(&fr.to_scalar()), fr);
    }
}
