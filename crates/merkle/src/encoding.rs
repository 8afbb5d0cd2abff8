//! Leaf encoding: fixed-width byte records packed into field elements
//!
//! A [`LeafLayout`] is the cross-chain wire contract for leaves. It declares
//! the record's fields and, for every field element, which byte ranges of
//! which fields it carries. Each element holds at most [`ELEMENT_PAYLOAD`]
//! bytes; the payload is zero-filled on the right to that width and read as
//! an integer in the layout's [`ByteOrder`]. Because 31 bytes is below the
//! BN254 modulus, no element is ever reduced.
//!
//! The attested-deposit layout packs as follows (little-endian):
//!
//! ```text
//! element 0: address[0..20] ++ attestation_key[0..1]   (21 bytes)
//! element 1: attestation_key[1..32]                     (31 bytes)
//! element 2: value[0..31]                               (31 bytes)
//! element 3: value[31..32]                              ( 1 byte )
//! ```
//!
//! The leaf is `H(element 0, .., element n-1)`.

use std::{fmt, marker::PhantomData, str::FromStr};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    error::{MerkleError, Result},
    hasher::{FieldHasher, MAX_HASH_INPUTS},
    record::LeafRecord,
    Fr,
};

/// Payload bytes carried by one field element.
pub const ELEMENT_PAYLOAD: usize = 31;

/// How an element payload is read as an integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// First payload byte is least significant.
    #[default]
    LittleEndian,
    /// First payload byte is most significant.
    BigEndian,
}

impl ByteOrder {
    /// Short name, `le` or `be`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LittleEndian => "le",
            Self::BigEndian => "be",
        }
    }

    fn to_field(self, payload: &[u8; ELEMENT_PAYLOAD]) -> Fr {
        match self {
            Self::LittleEndian => Fr::from_le_bytes_reduced(payload),
            Self::BigEndian => Fr::from_be_bytes_reduced(payload),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ByteOrder {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "le" | "little" | "little_endian" => Ok(Self::LittleEndian),
            "be" | "big" | "big_endian" => Ok(Self::BigEndian),
            other => Err(MerkleError::invalid(format!("unknown byte order {other:?}"))),
        }
    }
}

/// A named fixed-width byte field of a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, used in encoding errors.
    pub name: String,
    /// Exact width in bytes.
    pub width: usize,
}

impl FieldSpec {
    /// Declare a field.
    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Self { name: name.into(), width }
    }
}

/// Bytes `start..end` of field number `field`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Index into the layout's fields.
    pub field: usize,
    /// First byte, inclusive.
    pub start: usize,
    /// Last byte, exclusive.
    pub end: usize,
}

impl Segment {
    /// Shorthand constructor.
    pub const fn new(field: usize, start: usize, end: usize) -> Self {
        Self { field, start, end }
    }

    const fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Field declarations plus the element packing for one leaf shape.
///
/// Deserialized layouts go through [`LeafLayout::new`], so a layout read from
/// a file is validated before it can pack anything.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLeafLayout")]
pub struct LeafLayout {
    name: String,
    fields: Vec<FieldSpec>,
    elements: Vec<Vec<Segment>>,
    byte_order: ByteOrder,
}

#[derive(Deserialize)]
struct RawLeafLayout {
    name: String,
    fields: Vec<FieldSpec>,
    elements: Vec<Vec<Segment>>,
    byte_order: ByteOrder,
}

impl TryFrom<RawLeafLayout> for LeafLayout {
    type Error = MerkleError;

    fn try_from(raw: RawLeafLayout) -> Result<Self> {
        Self::new(raw.name, raw.fields, raw.elements, raw.byte_order)
    }
}

impl LeafLayout {
    /// Build and validate a layout.
    ///
    /// The segments, read element by element, must cover every byte of every
    /// field exactly once and in declaration order.
    pub fn new(
        name: impl Into<String>,
        fields: Vec<FieldSpec>,
        elements: Vec<Vec<Segment>>,
        byte_order: ByteOrder,
    ) -> Result<Self> {
        let layout = Self { name: name.into(), fields, elements, byte_order };
        layout.validate()?;
        Ok(layout)
    }

    /// Concatenate the fields and cut the result every [`ELEMENT_PAYLOAD`] bytes.
    pub fn packed(
        name: impl Into<String>,
        fields: Vec<FieldSpec>,
        byte_order: ByteOrder,
    ) -> Result<Self> {
        let mut elements = Vec::new();
        let mut current: Vec<Segment> = Vec::new();
        let mut room = ELEMENT_PAYLOAD;

        for (index, field) in fields.iter().enumerate() {
            let mut start = 0;
            while start < field.width {
                let take = room.min(field.width - start);
                current.push(Segment::new(index, start, start + take));
                start += take;
                room -= take;
                if room == 0 {
                    elements.push(std::mem::take(&mut current));
                    room = ELEMENT_PAYLOAD;
                }
            }
        }
        if !current.is_empty() {
            elements.push(current);
        }

        Self::new(name, fields, elements, byte_order)
    }

    /// Address (20) ++ attestation key (32) ++ value (32), four elements.
    pub fn attested_deposit() -> Self {
        Self {
            name: "attested-deposit".to_string(),
            fields: vec![
                FieldSpec::new("address", 20),
                FieldSpec::new("attestation_key", 32),
                FieldSpec::new("value", 32),
            ],
            elements: vec![
                vec![Segment::new(0, 0, 20), Segment::new(1, 0, 1)],
                vec![Segment::new(1, 1, 32)],
                vec![Segment::new(2, 0, 31)],
                vec![Segment::new(2, 31, 32)],
            ],
            byte_order: ByteOrder::LittleEndian,
        }
    }

    /// A single 20-byte address in one element.
    pub fn ordered_address() -> Self {
        Self {
            name: "ordered-address".to_string(),
            fields: vec![FieldSpec::new("address", 20)],
            elements: vec![vec![Segment::new(0, 0, 20)]],
            byte_order: ByteOrder::LittleEndian,
        }
    }

    /// Same packing, different element byte order.
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Layout name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields in order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of field elements per leaf.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Element byte order.
    pub const fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Total record width in bytes.
    pub fn record_width(&self) -> usize {
        self.fields.iter().map(|f| f.width).sum()
    }

    /// Check widths of `fields` against the declaration.
    pub fn check(&self, fields: &[&[u8]]) -> Result<()> {
        if fields.len() != self.fields.len() {
            return Err(MerkleError::width("field count", self.fields.len(), fields.len()));
        }
        for (spec, bytes) in self.fields.iter().zip(fields) {
            if bytes.len() != spec.width {
                return Err(MerkleError::width(spec.name.clone(), spec.width, bytes.len()));
            }
        }
        Ok(())
    }

    /// Pack a record's fields into field elements.
    pub fn pack(&self, fields: &[&[u8]]) -> Result<Vec<Fr>> {
        self.check(fields)?;
        let elements = self
            .elements
            .iter()
            .map(|segments| {
                let mut payload = [0u8; ELEMENT_PAYLOAD];
                let mut offset = 0;
                for seg in segments {
                    payload[offset..offset + seg.len()]
                        .copy_from_slice(&fields[seg.field][seg.start..seg.end]);
                    offset += seg.len();
                }
                self.byte_order.to_field(&payload)
            })
            .collect();
        Ok(elements)
    }

    fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(MerkleError::invalid("layout declares no fields"));
        }
        if let Some(empty) = self.fields.iter().find(|f| f.width == 0) {
            return Err(MerkleError::invalid(format!("field {} has zero width", empty.name)));
        }
        if self.elements.is_empty() || self.elements.len() > MAX_HASH_INPUTS {
            return Err(MerkleError::invalid(format!(
                "layout has {} elements, supported 1..={MAX_HASH_INPUTS}",
                self.elements.len()
            )));
        }

        // cursor walks the concatenated record
        let (mut field, mut pos) = (0usize, 0usize);
        for (index, segments) in self.elements.iter().enumerate() {
            let payload: usize = segments.iter().map(|seg| seg.end.saturating_sub(seg.start)).sum();
            if segments.is_empty() || payload > ELEMENT_PAYLOAD {
                return Err(MerkleError::invalid(format!(
                    "element {index} carries {payload} bytes, supported 1..={ELEMENT_PAYLOAD}"
                )));
            }
            for seg in segments {
                if seg.field != field || seg.start != pos || seg.end <= seg.start {
                    return Err(MerkleError::invalid(format!(
                        "element {index} segment {seg:?} does not continue at field {field} byte {pos}"
                    )));
                }
                let Some(spec) = self.fields.get(field) else {
                    return Err(MerkleError::invalid(format!(
                        "element {index} segment {seg:?} follows the last field"
                    )));
                };
                let width = spec.width;
                if seg.end > width {
                    return Err(MerkleError::invalid(format!(
                        "element {index} segment {seg:?} overruns field of width {width}"
                    )));
                }
                pos = seg.end;
                if pos == width {
                    field += 1;
                    pos = 0;
                }
            }
        }
        if field != self.fields.len() {
            return Err(MerkleError::invalid(format!(
                "layout leaves field {} from byte {pos} unpacked",
                self.fields[field].name
            )));
        }
        Ok(())
    }
}

/// Turns records into leaves with hasher `H`.
#[derive(Clone, Debug)]
pub struct LeafEncoder<H> {
    layout: LeafLayout,
    _hasher: PhantomData<fn() -> H>,
}

impl<H: FieldHasher> LeafEncoder<H> {
    /// Encoder for `layout`.
    pub const fn new(layout: LeafLayout) -> Self {
        Self { layout, _hasher: PhantomData }
    }

    /// Layout in use.
    pub const fn layout(&self) -> &LeafLayout {
        &self.layout
    }

    /// Encode raw field bytes, in declaration order.
    pub fn encode(&self, fields: &[&[u8]]) -> Result<Fr> {
        let elements = self.layout.pack(fields)?;
        H::hash_elements(&elements)
    }

    /// Encode a typed record.
    pub fn encode_record<R: LeafRecord>(&self, record: &R) -> Result<Fr> {
        self.encode(&record.fields())
    }

    /// Encode many records in parallel, keeping their order.
    pub fn encode_all<R: LeafRecord + Sync>(&self, records: &[R]) -> Result<Vec<Fr>> {
        records.par_iter().map(|record| self.encode_record(record)).collect()
    }
}
