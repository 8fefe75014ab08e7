//! Ordered block lists.
//!
//! A block list keeps entries in insertion order, compares them
//! case-sensitively and never holds the same entry twice. Lists are small
//! (a user types them in by hand), so membership is a linear scan.

use serde::{Deserialize, Serialize};

/// Result of toggling one entry's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// The entry was absent and has been appended.
    Added,
    /// The entry was present and has been removed.
    Removed,
}

/// Insertion-ordered set of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct BlockList {
    items: Vec<String>,
}

impl BlockList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` unless it is already present. Returns `true` if added.
    pub fn insert(&mut self, entry: impl Into<String>) -> bool {
        let entry = entry.into();
        if self.contains(&entry) {
            return false;
        }
        self.items.push(entry);
        true
    }

    /// Remove `entry` if present. Returns `true` if removed.
    pub fn remove(&mut self, entry: &str) -> bool {
        match self.items.iter().position(|item| item == entry) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Set complement for a single entry: add if absent, remove if present.
    pub fn toggle(&mut self, entry: &str) -> Toggle {
        if self.remove(entry) {
            Toggle::Removed
        } else {
            self.items.push(entry.to_string());
            Toggle::Added
        }
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.items.iter().any(|item| item == entry)
    }

    /// First of `candidates` that is in the list.
    pub fn first_match<'a, I>(&self, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates.into_iter().find(|c| self.contains(c))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }
}

impl From<Vec<String>> for BlockList {
    fn from(items: Vec<String>) -> Self {
        items.into_iter().collect()
    }
}

impl From<BlockList> for Vec<String> {
    fn from(list: BlockList) -> Self {
        list.items
    }
}

impl FromIterator<String> for BlockList {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut list = BlockList::new();
        for item in iter {
            list.insert(item);
        }
        list
    }
}

impl<'a> FromIterator<&'a str> for BlockList {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

impl<'a> IntoIterator for &'a BlockList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_rejects_duplicates() {
        let mut list = BlockList::new();
        assert!(list.insert("b"));
        assert!(list.insert("a"));
        assert!(!list.insert("b"));
        assert_eq!(list.as_slice(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        let list: BlockList = ["Streamer"].into_iter().collect();
        assert!(list.contains("Streamer"));
        assert!(!list.contains("streamer"));
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut list: BlockList = ["a"].into_iter().collect();
        assert_eq!(list.toggle("b"), Toggle::Added);
        assert_eq!(list.toggle("b"), Toggle::Removed);
        assert_eq!(list.as_slice(), &["a".to_string()]);
    }

    #[test]
    fn test_remove_preserves_order_of_rest() {
        let mut list: BlockList = ["a", "b", "c"].into_iter().collect();
        assert!(list.remove("b"));
        assert!(!list.remove("b"));
        assert_eq!(list.as_slice(), &["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_deserialize_drops_duplicates() {
        let list: BlockList = serde_json::from_str(r#"["x", "y", "x"]"#).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["x","y"]"#);
    }

    #[test]
    fn test_first_match() {
        let list: BlockList = ["game", "talk"].into_iter().collect();
        let tags = ["music", "talk", "game"];
        assert_eq!(list.first_match(tags.iter().copied()), Some("talk"));
        assert_eq!(list.first_match(["music"].iter().copied()), None);
    }
}
