//! Typed records committed as leaves

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::error::{MerkleError, Result};

const ADDRESS_WIDTH: usize = 20;
const WORD_WIDTH: usize = 32;

/// A fixed-width record that can be handed to a [`LeafEncoder`](crate::LeafEncoder).
pub trait LeafRecord {
    /// Field bytes in layout declaration order.
    fn fields(&self) -> Vec<&[u8]>;
}

/// Deposit attestation read from the source chain's contract storage.
///
/// Field order is address, attestation key, value; it matches
/// [`LeafLayout::attested_deposit`](crate::LeafLayout::attested_deposit).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttestedRecord {
    /// Depositor address.
    pub address: Address,
    /// Attestation key.
    pub attestation_key: B256,
    /// Attested value.
    pub value: B256,
}

impl AttestedRecord {
    /// Build from raw byte slices, rejecting wrong widths.
    pub fn from_slices(address: &[u8], attestation_key: &[u8], value: &[u8]) -> Result<Self> {
        Ok(Self {
            address: address_from_slice(address)?,
            attestation_key: word_from_slice("attestation_key", attestation_key)?,
            value: word_from_slice("value", value)?,
        })
    }
}

impl LeafRecord for AttestedRecord {
    fn fields(&self) -> Vec<&[u8]> {
        vec![self.address.as_slice(), self.attestation_key.as_slice(), self.value.as_slice()]
    }
}

/// Bare address record, for ordered address sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Member address.
    pub address: Address,
}

impl AddressRecord {
    /// Build from a raw slice, rejecting wrong widths.
    pub fn from_slice(address: &[u8]) -> Result<Self> {
        Ok(Self { address: address_from_slice(address)? })
    }
}

impl LeafRecord for AddressRecord {
    fn fields(&self) -> Vec<&[u8]> {
        vec![self.address.as_slice()]
    }
}

fn address_from_slice(bytes: &[u8]) -> Result<Address> {
    if bytes.len() != ADDRESS_WIDTH {
        return Err(MerkleError::width("address", ADDRESS_WIDTH, bytes.len()));
    }
    Ok(Address::from_slice(bytes))
}

fn word_from_slice(field: &str, bytes: &[u8]) -> Result<B256> {
    if bytes.len() != WORD_WIDTH {
        return Err(MerkleError::width(field, WORD_WIDTH, bytes.len()));
    }
    Ok(B256::from_slice(bytes))
}
