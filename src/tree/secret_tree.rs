//! SecretTree - every leaf found by a collection run

use std::collections::{BTreeSet, HashMap};

use super::path::SecretPath;
use super::record::SecretRecord;

/// Mapping from full path to record, in discovery order.
///
/// Inserting a path that is already present replaces the record in place:
/// the entry keeps its original position and is never duplicated.
#[derive(Debug, Clone, Default)]
pub struct SecretTree {
    entries: Vec<(SecretPath, SecretRecord)>,
    index: HashMap<SecretPath, usize>,
}

impl SecretTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a leaf. Returns the previous record when the path was already known.
    pub fn insert(&mut self, path: SecretPath, record: SecretRecord) -> Option<SecretRecord> {
        if let Some(&pos) = self.index.get(&path) {
            return Some(std::mem::replace(&mut self.entries[pos].1, record));
        }
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push((path, record));
        None
    }

    /// Fold another tree into this one, later records winning.
    ///
    /// Returns the paths whose records were replaced.
    pub fn merge(&mut self, other: SecretTree) -> Vec<SecretPath> {
        let mut replaced = Vec::new();
        for (path, record) in other.entries {
            if self.index.contains_key(&path) {
                replaced.push(path.clone());
            }
            self.insert(path, record);
        }
        replaced
    }

    pub fn get(&self, path: &SecretPath) -> Option<&SecretRecord> {
        self.index.get(path).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in discovery (depth-first) order.
    pub fn iter(&self) -> impl Iterator<Item = (&SecretPath, &SecretRecord)> {
        self.entries.iter().map(|(p, r)| (p, r))
    }

    /// Entries ordered segment by segment, the same order the tree output uses.
    ///
    /// `kv/a/x` sorts before `kv/a-b` because `a` < `a-b`.
    pub fn sorted(&self) -> Vec<(&SecretPath, &SecretRecord)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));
        sorted
    }

    /// Full leaf paths in [`sorted`](Self::sorted) order. Paths are unique by construction.
    pub fn paths(&self) -> Vec<String> {
        self.sorted().into_iter().map(|(p, _)| p.to_string()).collect()
    }

    /// Every field name seen across all leaves, sorted and unique.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(_, r)| r.data.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl FromIterator<(SecretPath, SecretRecord)> for SecretTree {
    fn from_iter<I: IntoIterator<Item = (SecretPath, SecretRecord)>>(iter: I) -> Self {
        let mut tree = SecretTree::new();
        for (path, record) in iter {
            tree.insert(path, record);
        }
        tree
    }
}
