use ahash::RandomState;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Category identifier: a string-encoded small integer (`"0"`, `"1"`, ...).
pub type CategoryId = String;

/// Category popularity: number of true members per category.
pub type Popularity = CategoryTable<u64>;

/// Aggregated reported bits per category.
pub type FrequencyTable = CategoryTable<u64>;

/// Insertion-ordered mapping from category id to a value.
///
/// Enumeration, serialization and equality all follow insertion order.
/// Re-inserting an existing id replaces its value in place without moving it.
/// Lookups go through a side index hashed with fixed-seed `ahash`, so the
/// table behaves identically across processes.
#[derive(Clone)]
pub struct CategoryTable<V> {
    entries: Vec<(CategoryId, V)>,
    index: HashMap<CategoryId, usize, RandomState>,
}

fn index_hasher() -> RandomState {
    RandomState::with_seeds(1, 2, 3, 4)
}

impl<V> CategoryTable<V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, index_hasher()),
        }
    }

    /// Insert or replace. Returns the previous value if the id was present.
    pub fn insert(&mut self, id: impl Into<CategoryId>, value: V) -> Option<V> {
        let id = id.into();
        if let Some(&pos) = self.index.get(&id) {
            return Some(std::mem::replace(&mut self.entries[pos].1, value));
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, value));
        None
    }

    pub fn get(&self, id: &str) -> Option<&V> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut V> {
        match self.index.get(id) {
            Some(&pos) => Some(&mut self.entries[pos].1),
            None => None,
        }
    }

    /// Enumeration position of `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get_index(&self, pos: usize) -> Option<(&str, &V)> {
        self.entries.get(pos).map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl<V> Default for CategoryTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for CategoryTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: PartialEq> PartialEq for CategoryTable<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V: Eq> Eq for CategoryTable<V> {}

impl<K: Into<CategoryId>, V> FromIterator<(K, V)> for CategoryTable<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut table = Self::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

impl<V> IntoIterator for CategoryTable<V> {
    type Item = (CategoryId, V);
    type IntoIter = std::vec::IntoIter<(CategoryId, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Serialize> Serialize for CategoryTable<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct TableVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for TableVisitor<V> {
    type Value = CategoryTable<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of category ids to values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = CategoryTable::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<CategoryId, V>()? {
            if table.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate category id {key:?}")));
            }
            table.insert(key, value);
        }
        Ok(table)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for CategoryTable<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor(PhantomData))
    }
}
