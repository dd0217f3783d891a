use crate::error::RrError;
use crate::table::{CategoryId, Popularity};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One user's membership bits, aligned with the owning population's
/// category order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    bits: Vec<u8>,
}

impl Record {
    /// Build a record from raw bits. Every bit must be 0 or 1.
    pub fn from_bits(bits: Vec<u8>) -> Result<Self, RrError> {
        if let Some(pos) = bits.iter().position(|&b| b > 1) {
            return Err(RrError::invalid_seed(format!(
                "bit at position {pos} is {}, expected 0 or 1",
                bits[pos]
            )));
        }
        Ok(Self { bits })
    }

    pub(crate) fn from_bits_unchecked(bits: Vec<u8>) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    pub fn bit(&self, pos: usize) -> Option<u8> {
        self.bits.get(pos).copied()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Positions whose bit is 0, in category order.
    pub fn zero_positions(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == 0)
            .map(|(i, _)| i)
            .collect()
    }
}

/// A population of per-user binary membership records over a shared,
/// fixed category order.
///
/// The ground-truth seed and every perturbed copy of it are populations.
/// Perturbed copies share the seed's category list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Population {
    categories: Arc<[CategoryId]>,
    records: Vec<Record>,
}

impl Population {
    /// Assemble a population, checking every record spans all categories.
    pub fn new(categories: Vec<CategoryId>, records: Vec<Record>) -> Result<Self, RrError> {
        let width = categories.len();
        if let Some(pos) = records.iter().position(|r| r.len() != width) {
            return Err(RrError::invalid_seed(format!(
                "record {pos} has {} bits, expected {width}",
                records[pos].len()
            )));
        }
        Ok(Self {
            categories: categories.into(),
            records,
        })
    }

    /// Population over the same categories with a new set of records.
    pub(crate) fn with_records(&self, records: Vec<Record>) -> Self {
        debug_assert!(records.iter().all(|r| r.len() == self.categories.len()));
        Self {
            categories: Arc::clone(&self.categories),
            records,
        }
    }

    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn num_categories(&self) -> usize {
        self.categories.len()
    }

    /// Number of records (users).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flag of `category` in record `index`.
    pub fn flag(&self, index: usize, category: &str) -> Option<u8> {
        let pos = self.categories.iter().position(|c| c == category)?;
        self.records.get(index)?.bit(pos)
    }
}

/// Build the ground-truth seed from a popularity mapping.
///
/// Records are filled in order; within a record, categories are visited in
/// the popularity mapping's insertion order. A category is flagged while its
/// remaining count is positive, so each category's ones sit in the earliest
/// records and total `min(count, num_records)`.
pub fn build(num_records: usize, popularity: &Popularity) -> Population {
    let categories: Vec<CategoryId> = popularity.keys().map(String::from).collect();
    let mut remaining: Vec<u64> = popularity.values().copied().collect();

    let records = (0..num_records)
        .map(|_| {
            let bits = remaining
                .iter_mut()
                .map(|left| {
                    if *left > 0 {
                        *left -= 1;
                        1
                    } else {
                        0
                    }
                })
                .collect();
            Record::from_bits_unchecked(bits)
        })
        .collect();

    Population {
        categories: categories.into(),
        records,
    }
}

struct RecordMap<'a> {
    categories: &'a [CategoryId],
    record: &'a Record,
}

impl Serialize for RecordMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (id, bit) in self.categories.iter().zip(self.record.bits()) {
            map.serialize_entry(id, bit)?;
        }
        map.end()
    }
}

/// Serialized as an array of objects mapping category id to 0/1.
impl Serialize for Population {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for record in &self.records {
            seq.serialize_element(&RecordMap {
                categories: &self.categories,
                record,
            })?;
        }
        seq.end()
    }
}

/// Column layout learned from the first record of a document.
#[derive(Default)]
struct Layout {
    categories: Vec<CategoryId>,
    columns: HashMap<CategoryId, usize>,
}

/// Deserializes one record object against the layout. The first record
/// defines the layout; later records may list keys in any order but must
/// cover exactly the same set.
struct RecordSeed<'a> {
    layout: &'a mut Layout,
    first: bool,
}

impl<'de> de::DeserializeSeed<'de> for RecordSeed<'_> {
    type Value = Record;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Record, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for RecordSeed<'_> {
    type Value = Record;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of category ids to 0/1")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
        if self.first {
            let mut bits = Vec::new();
            while let Some((key, bit)) = access.next_entry::<CategoryId, u8>()? {
                if self.layout.columns.contains_key(&key) {
                    return Err(de::Error::custom(format!("duplicate category id {key:?}")));
                }
                self.layout.columns.insert(key.clone(), bits.len());
                self.layout.categories.push(key);
                bits.push(bit);
            }
            return Record::from_bits(bits).map_err(de::Error::custom);
        }

        let width = self.layout.categories.len();
        let mut bits = vec![0u8; width];
        let mut seen = vec![false; width];
        while let Some((key, bit)) = access.next_entry::<CategoryId, u8>()? {
            let col = *self
                .layout
                .columns
                .get(&key)
                .ok_or_else(|| de::Error::custom(format!("unknown category id {key:?}")))?;
            if seen[col] {
                return Err(de::Error::custom(format!("duplicate category id {key:?}")));
            }
            seen[col] = true;
            bits[col] = bit;
        }
        if let Some(col) = seen.iter().position(|s| !s) {
            return Err(de::Error::custom(format!(
                "missing category id {:?}",
                self.layout.categories[col]
            )));
        }
        Record::from_bits(bits).map_err(de::Error::custom)
    }
}

struct PopulationVisitor;

impl<'de> Visitor<'de> for PopulationVisitor {
    type Value = Population;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of category membership records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Population, A::Error> {
        let mut layout = Layout::default();
        let mut records = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(record) = access.next_element_seed(RecordSeed {
            layout: &mut layout,
            first: records.is_empty(),
        })? {
            records.push(record);
        }
        Ok(Population {
            categories: layout.categories.into(),
            records,
        })
    }
}

impl<'de> Deserialize<'de> for Population {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(PopulationVisitor)
    }
}
