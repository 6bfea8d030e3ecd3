//! Record structure.
//!
//! A `Record` is one row flowing between operators: one `Entry` per symbol-table
//! column, plus a flag marking rows synthesized by an optional-match miss.

use crate::entry::Entry;
use alloc::vec;
use alloc::vec::Vec;

/// A row of entries indexed by symbol-table column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    /// Entries stored in this record, indexed by column position.
    values: Vec<Entry>,
    /// Set when the row stands in for an optional match that found nothing.
    null: bool,
}

impl Record {
    /// Creates a record of the given width with every slot unbound.
    pub fn new(width: usize) -> Self {
        Self {
            values: vec![Entry::Unknown; width],
            null: false,
        }
    }

    /// Creates a record from existing entries.
    pub fn from_entries(values: Vec<Entry>) -> Self {
        Self { values, null: false }
    }

    /// Creates a null-marker row of the given width, every slot holding Null.
    pub fn null_marker(width: usize) -> Self {
        Self {
            values: vec![Entry::null(); width],
            null: true,
        }
    }

    /// Returns true if this row marks an optional-match miss.
    #[inline]
    pub fn is_null_marker(&self) -> bool {
        self.null
    }

    /// Sets or clears the null-marker flag.
    #[inline]
    pub fn set_null_marker(&mut self, null: bool) {
        self.null = null;
    }

    /// Returns a reference to the entries.
    #[inline]
    pub fn values(&self) -> &[Entry] {
        &self.values
    }

    /// Returns the entry at the given column.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.values.get(index)
    }

    /// Sets the entry at the given column, growing the record if needed.
    pub fn set(&mut self, index: usize, entry: Entry) {
        if index >= self.values.len() {
            self.values.resize(index + 1, Entry::Unknown);
        }
        self.values[index] = entry;
    }

    /// Returns the number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the record has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resets every slot to unbound and clears the null marker.
    pub fn clear(&mut self) {
        for v in &mut self.values {
            *v = Entry::Unknown;
        }
        self.null = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let r = Record::new(3);
        assert_eq!(r.len(), 3);
        assert!(r.values().iter().all(Entry::is_unknown));
        assert!(!r.is_null_marker());
    }

    #[test]
    fn test_record_set_grows() {
        let mut r = Record::new(1);
        r.set(2, Entry::constant(5i64));
        assert_eq!(r.len(), 3);
        assert_eq!(r.get(2), Some(&Entry::constant(5i64)));
        assert_eq!(r.get(1), Some(&Entry::Unknown));
        assert_eq!(r.get(3), None);
    }

    #[test]
    fn test_null_marker() {
        let r = Record::null_marker(2);
        assert!(r.is_null_marker());
        assert!(r.values().iter().all(Entry::is_null));
    }

    #[test]
    fn test_clear() {
        let mut r = Record::from_entries(vec![Entry::Node(1)]);
        r.set_null_marker(true);
        r.clear();
        assert_eq!(r.get(0), Some(&Entry::Unknown));
        assert!(!r.is_null_marker());
    }
}
