//! Canonical street-type vocabulary and alias table.
//!
//! The vocabulary is the live set of accepted street types. It starts from
//! a configured seed list and only ever grows, through promotion. The
//! alias table is fixed for the lifetime of a pass and maps known
//! misspellings and abbreviations ("St", "Rd,", "GROVE") to a canonical
//! street type.

use std::collections::{BTreeMap, BTreeSet};

/// Append-only set of canonical street types.
///
/// Insertion order is kept for reporting; membership checks go through a
/// sorted set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    ordered: Vec<String>,
    members: BTreeSet<String>,
}

impl Vocabulary {
    /// Creates a vocabulary seeded with `seed`, ignoring duplicates.
    pub fn new<I, S>(seed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Self::default();
        for term in seed {
            vocabulary.insert(term.into());
        }
        vocabulary
    }

    /// Returns `true` if `token` is a canonical street type.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.members.contains(token)
    }

    /// Adds a street type. Returns `false` if it was already present.
    pub fn insert(&mut self, token: String) -> bool {
        if self.members.contains(&token) {
            return false;
        }
        self.members.insert(token.clone());
        self.ordered.push(token);
        true
    }

    /// Street types in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    /// Number of street types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns `true` if the vocabulary is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Street types in insertion order, owned.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.ordered.clone()
    }
}

/// Fixed mapping from non-canonical spellings to canonical street types.
///
/// Every alias target counts as canonical in its own right, so rewriting
/// never needs to follow a chain of aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
    targets: BTreeSet<String>,
}

impl AliasTable {
    /// Builds a table from `(alias, canonical)` pairs.
    #[must_use]
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        let targets = entries.values().cloned().collect();
        Self { entries, targets }
    }

    /// Canonical street type for `alias`, if it is a known alias.
    #[must_use]
    pub fn canonical_for(&self, alias: &str) -> Option<&str> {
        self.entries.get(alias).map(String::as_str)
    }

    /// Returns `true` if `token` is the target of some alias.
    #[must_use]
    pub fn is_target(&self, token: &str) -> bool {
        self.targets.contains(token)
    }

    /// The underlying `(alias, canonical)` map.
    #[must_use]
    pub const fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AliasTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_keeps_insertion_order_and_ignores_duplicates() {
        let mut vocabulary = Vocabulary::new(["Street", "Road", "Street"]);
        assert_eq!(vocabulary.len(), 2);
        assert!(vocabulary.insert("Mews".to_string()));
        assert!(!vocabulary.insert("Road".to_string()));
        assert_eq!(
            vocabulary.iter().collect::<Vec<_>>(),
            vec!["Street", "Road", "Mews"]
        );
    }

    #[test]
    fn vocabulary_membership_is_case_sensitive() {
        let vocabulary = Vocabulary::new(["Street"]);
        assert!(vocabulary.contains("Street"));
        assert!(!vocabulary.contains("street"));
    }

    #[test]
    fn alias_table_looks_up_exact_spelling() {
        let aliases: AliasTable = [("St", "Street"), ("St.", "Street"), ("Rd", "Road")]
            .into_iter()
            .collect();
        assert_eq!(aliases.canonical_for("St."), Some("Street"));
        assert_eq!(aliases.canonical_for("st"), None);
    }

    #[test]
    fn alias_targets_are_tracked() {
        let aliases: AliasTable = [("HIll", "Hill")].into_iter().collect();
        assert!(aliases.is_target("Hill"));
        assert!(!aliases.is_target("HIll"));
    }
}
