// ============================================================
// DIMENSION MAP
// ============================================================
// Ordered mapping from dimension name to member identifier columns.
// A column name is listed under at most one dimension.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::DimensionName;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionMap {
    entries: IndexMap<DimensionName, Vec<String>>,
}

impl DimensionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &DimensionName) -> bool {
        self.entries.contains_key(name)
    }

    pub fn members(&self, name: &DimensionName) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &DimensionName> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DimensionName, &[String])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// The dimension currently holding `column`, if any.
    pub fn dimension_of(&self, column: &str) -> Option<&DimensionName> {
        self.entries
            .iter()
            .find(|(_, members)| members.iter().any(|m| m == column))
            .map(|(name, _)| name)
    }

    /// Create an empty entry. Returns false if it already existed.
    pub fn ensure(&mut self, name: DimensionName) -> bool {
        if self.entries.contains_key(&name) {
            return false;
        }
        self.entries.insert(name, Vec::new());
        true
    }

    /// Drop the entry, returning its former members.
    pub fn remove(&mut self, name: &DimensionName) -> Option<Vec<String>> {
        self.entries.shift_remove(name)
    }

    /// Rename in place, keeping members and position. The caller checks that
    /// `to` is free.
    pub fn rename(&mut self, from: &DimensionName, to: DimensionName) -> bool {
        let Some(index) = self.entries.get_index_of(from) else {
            return false;
        };
        let Some((_, members)) = self.entries.shift_remove_index(index) else {
            return false;
        };
        let (new_index, _) = self.entries.insert_full(to, members);
        self.entries.move_index(new_index, index);
        true
    }

    /// Remove `column` from every dimension. Returns true if any list changed.
    pub fn release(&mut self, column: &str) -> bool {
        let mut changed = false;
        for members in self.entries.values_mut() {
            let before = members.len();
            members.retain(|m| m != column);
            changed |= members.len() != before;
        }
        changed
    }

    /// Move `column` into `name`, creating the entry if absent. The column is
    /// released from every other dimension first.
    pub fn assign(&mut self, column: &str, name: &DimensionName) -> bool {
        if self.dimension_of(column) == Some(name) {
            return false;
        }
        self.release(column);
        self.entries
            .entry(name.clone())
            .or_default()
            .push(column.to_string());
        true
    }

    /// Number of dimensions not listed in `builtins`.
    pub fn custom_count(&self, builtins: &[DimensionName]) -> usize {
        self.entries
            .keys()
            .filter(|name| !builtins.contains(name))
            .count()
    }

    /// True when no column appears twice across all lists.
    pub fn is_exclusive(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .values()
            .flatten()
            .all(|column| seen.insert(column.as_str()))
    }

    /// Plain string map for payloads.
    pub fn to_record(&self) -> IndexMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|(name, members)| (name.to_string(), members.clone()))
            .collect()
    }
}
