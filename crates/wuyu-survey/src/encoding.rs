//! Label-to-code tables for ordinal categorical fields.
//!
//! Codes are dense positive integers starting at 1, assigned in the order
//! distinct labels are first encountered while scanning the input. An absent
//! answer never receives a code.
//!
//! # Examples
//!
//! ```
//! use wuyu_survey::encoding::EncodingTableBuilder;
//!
//! let mut builder = EncodingTableBuilder::new();
//! for label in ["B.大二", "A.大一", "B.大二", "C.大三"] {
//!     builder.observe(label);
//! }
//! let table = builder.build();
//!
//! assert_eq!(table.forward("B.大二"), Some(1));
//! assert_eq!(table.forward("A.大一"), Some(2));
//! assert_eq!(table.inverse(3), Some("C.大三"));
//! assert_eq!(table.len(), 3);
//! ```

use indexmap::IndexSet;
use serde::Serialize;

/// Bijection between the distinct labels of a field and their codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncodingTable {
    labels: IndexSet<String>,
}

impl EncodingTable {
    /// Returns the code of `label`.
    #[must_use]
    pub fn forward(&self, label: &str) -> Option<u32> {
        self.labels.get_index_of(label).map(index_to_code)
    }

    /// Returns the label of `code`.
    #[must_use]
    pub fn inverse(&self, code: u32) -> Option<&str> {
        let index = usize::try_from(code).ok()?.checked_sub(1)?;
        self.labels.get_index(index).map(String::as_str)
    }

    /// Iterates `(code, label)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(index, label)| (index_to_code(index), label.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[expect(clippy::cast_possible_truncation)]
fn index_to_code(index: usize) -> u32 {
    (index + 1) as u32
}

/// Accumulates labels in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct EncodingTableBuilder {
    labels: IndexSet<String>,
}

impl EncodingTableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `label` and returns its code.
    pub fn observe(&mut self, label: &str) -> u32 {
        let index = match self.labels.get_index_of(label) {
            Some(index) => index,
            None => self.labels.insert_full(label.to_owned()).0,
        };
        index_to_code(index)
    }

    #[must_use]
    pub fn build(self) -> EncodingTable {
        EncodingTable {
            labels: self.labels,
        }
    }
}

impl<'a> FromIterator<Option<&'a str>> for EncodingTable {
    /// Builds a table from a column scan; `None` entries are skipped.
    fn from_iter<T: IntoIterator<Item = Option<&'a str>>>(iter: T) -> Self {
        let mut builder = EncodingTableBuilder::new();
        for label in iter.into_iter().flatten() {
            builder.observe(label);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order() {
        let table = [Some("C"), None, Some("A"), Some("C"), Some("B"), None]
            .into_iter()
            .collect::<EncodingTable>();
        let pairs = table.iter().collect::<Vec<_>>();
        assert_eq!(pairs, vec![(1, "C"), (2, "A"), (3, "B")]);
    }

    #[test]
    fn test_codes_are_dense_and_invertible() {
        let table = ["x", "y", "x", "z", "y", "w"]
            .into_iter()
            .map(Some)
            .collect::<EncodingTable>();
        let codes = table.iter().map(|(code, _)| code).collect::<Vec<_>>();
        assert_eq!(codes, (1..=4).collect::<Vec<u32>>());
        for (code, label) in table.iter() {
            assert_eq!(table.forward(label), Some(code));
            assert_eq!(table.inverse(code), Some(label));
        }
    }

    #[test]
    fn test_unknown_lookups() {
        let table = [Some("A")].into_iter().collect::<EncodingTable>();
        assert_eq!(table.forward("B"), None);
        assert_eq!(table.inverse(0), None);
        assert_eq!(table.inverse(2), None);
    }

    #[test]
    fn test_empty_column() {
        let table = [None, None].into_iter().collect::<EncodingTable>();
        assert!(table.is_empty());
    }
}
