//! Uniques bundles
//!
//! A bundle summarizes the distinct values of one field within one prefilter
//! scope: occurrence counts plus a sorted value list. Two flags report what a
//! round of mutations changed: whether the list itself changed, and whether
//! the last instance of some value disappeared (the partition-empty signal).

use std::collections::HashMap;

use crate::value::Value;

/// Distinct-value counts and sorted value list for one `(prefilter, field)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniquesBundle {
    counts: HashMap<Value, usize>,
    list: Vec<Value>,
    list_changed: bool,
    last_removed: bool,
}

impl UniquesBundle {
    /// Creates an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates a bundle from stored parts, with clean flags.
    pub fn from_parts(counts: HashMap<Value, usize>, list: Vec<Value>) -> Self {
        Self {
            counts,
            list,
            list_changed: false,
            last_removed: false,
        }
    }

    /// Builds a bundle by counting every value in the iterator.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut bundle = Self::new();
        for value in values {
            bundle.add(value);
        }
        bundle.list_changed = false;
        bundle
    }

    /// Records one occurrence of a value.
    pub fn add(&mut self, value: Value) {
        match self.counts.get_mut(&value) {
            Some(count) => *count += 1,
            None => {
                match self.list.binary_search(&value) {
                    Ok(_) => {}
                    Err(pos) => self.list.insert(pos, value.clone()),
                }
                self.counts.insert(value, 1);
                self.list_changed = true;
            }
        }
    }

    /// Removes one occurrence of a value.
    ///
    /// Removing the last occurrence drops the value from both the map and
    /// the list and raises `last_removed`.
    pub fn remove(&mut self, value: &Value) {
        let Some(count) = self.counts.get_mut(value) else {
            debug_assert!(false, "remove of untracked value");
            return;
        };

        if *count > 1 {
            *count -= 1;
            return;
        }

        self.counts.remove(value);
        if let Ok(pos) = self.list.binary_search(value) {
            self.list.remove(pos);
        }
        self.list_changed = true;
        self.last_removed = true;
    }

    /// Occurrence count map
    pub fn counts(&self) -> &HashMap<Value, usize> {
        &self.counts
    }

    /// Sorted distinct values
    pub fn list(&self) -> &[Value] {
        &self.list
    }

    /// Whether the value list changed since the bundle was read
    pub fn list_changed(&self) -> bool {
        self.list_changed
    }

    /// Whether some value's last occurrence was removed
    pub fn last_removed(&self) -> bool {
        self.last_removed
    }

    /// True when no values are tracked
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Consumes the bundle into its stored parts.
    pub fn into_parts(self) -> (HashMap<Value, usize>, Vec<Value>) {
        (self.counts, self.list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_first_occurrence_inserts_sorted() {
        let mut bundle = UniquesBundle::new();

        bundle.add(Value::from("Mazda"));
        bundle.add(Value::from("Audi"));
        bundle.add(Value::from("Lambo"));

        assert_eq!(
            bundle.list(),
            &[Value::from("Audi"), Value::from("Lambo"), Value::from("Mazda")]
        );
        assert!(bundle.list_changed());
    }

    #[test]
    fn test_add_repeat_increments() {
        let mut bundle = UniquesBundle::new();

        bundle.add(Value::from("CD"));
        bundle.add(Value::from("CD"));

        assert_eq!(bundle.counts().get(&Value::from("CD")), Some(&2));
        assert_eq!(bundle.list().len(), 1);
    }

    #[test]
    fn test_remove_decrements_without_flags() {
        let mut bundle = UniquesBundle::from_values(vec![Value::from("CD"), Value::from("CD")]);

        bundle.remove(&Value::from("CD"));

        assert_eq!(bundle.counts().get(&Value::from("CD")), Some(&1));
        assert!(!bundle.last_removed());
        assert!(!bundle.list_changed());
    }

    #[test]
    fn test_remove_last_occurrence_signals() {
        let mut bundle = UniquesBundle::from_values(vec![Value::from("Vinyl")]);

        bundle.remove(&Value::from("Vinyl"));

        assert!(bundle.is_empty());
        assert!(bundle.list().is_empty());
        assert!(bundle.last_removed());
        assert!(bundle.list_changed());
    }

    #[test]
    fn test_from_values_counts() {
        let bundle = UniquesBundle::from_values(vec![
            Value::from("CD"),
            Value::from("Vinyl"),
            Value::from("CD"),
        ]);

        assert_eq!(bundle.counts().get(&Value::from("CD")), Some(&2));
        assert_eq!(bundle.counts().get(&Value::from("Vinyl")), Some(&1));
        assert_eq!(bundle.list(), &[Value::from("CD"), Value::from("Vinyl")]);
        assert!(!bundle.list_changed());
    }

    #[test]
    fn test_from_parts_has_clean_flags() {
        let mut counts = HashMap::new();
        counts.insert(Value::from("CD"), 2);
        let bundle = UniquesBundle::from_parts(counts, vec![Value::from("CD")]);

        assert!(!bundle.list_changed());
        assert!(!bundle.last_removed());
    }

    #[test]
    fn test_list_stays_sorted_across_churn() {
        let mut bundle = UniquesBundle::new();
        for v in ["m", "a", "z", "b", "a"] {
            bundle.add(Value::from(v));
        }
        bundle.remove(&Value::from("b"));

        let mut expected = bundle.list().to_vec();
        expected.sort();
        assert_eq!(bundle.list(), expected.as_slice());
    }
}
