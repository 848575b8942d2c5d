//! Sorted id-list algebra
//!
//! A sorted index is a pair of id lists per `(prefilter, field)`: the engine
//! maintains the descending list and stores the ascending list as its exact
//! reverse. Ties keep insertion order: a new id lands after existing
//! equal-valued ids in the descending list.

use crate::value::{SortStrategy, Value};

/// Inserts an id into a descending list.
///
/// Scans for the first id whose stored value is strictly smaller than
/// `new_value` and inserts immediately before it; appends when no such id
/// exists.
pub fn insert_desc(
    list: &mut Vec<Value>,
    id: Value,
    new_value: &Value,
    strategy: SortStrategy,
    stored_value: impl Fn(&Value) -> Option<Value>,
) {
    let position = list.iter().position(|existing| {
        let existing_value = stored_value(existing).unwrap_or(Value::Null);
        strategy.compare(&existing_value, new_value) == std::cmp::Ordering::Less
    });

    match position {
        Some(pos) => list.insert(pos, id),
        None => list.push(id),
    }
}

/// Removes an id from a list. Returns whether it was present.
pub fn remove_id(list: &mut Vec<Value>, id: &Value) -> bool {
    match list.iter().position(|existing| existing == id) {
        Some(pos) => {
            list.remove(pos);
            true
        }
        None => false,
    }
}

/// Stable ascending sort of ids by their stored field values.
pub fn sort_ids_asc(
    ids: Vec<Value>,
    strategy: SortStrategy,
    stored_value: impl Fn(&Value) -> Option<Value>,
) -> Vec<Value> {
    let mut keyed: Vec<(Value, Value)> = ids
        .into_iter()
        .map(|id| {
            let value = stored_value(&id).unwrap_or(Value::Null);
            (value, id)
        })
        .collect();
    keyed.sort_by(|a, b| strategy.compare(&a.0, &b.0));
    keyed.into_iter().map(|(_, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn store(pairs: &[(i64, &str)]) -> HashMap<Value, Value> {
        pairs
            .iter()
            .map(|(id, v)| (Value::Int(*id), Value::Str(v.to_string())))
            .collect()
    }

    #[test]
    fn test_insert_desc_orders_descending() {
        let store = store(&[(1, "Mazda"), (2, "Lambo"), (3, "Porsche")]);
        let mut list = vec![Value::Int(1), Value::Int(2)]; // Mazda, Lambo

        insert_desc(
            &mut list,
            Value::Int(3),
            &Value::from("Porsche"),
            SortStrategy::Natural,
            |id| store.get(id).cloned(),
        );

        assert_eq!(list, vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_insert_desc_appends_smallest() {
        let store = store(&[(1, "Mazda"), (2, "Audi")]);
        let mut list = vec![Value::Int(1)];

        insert_desc(
            &mut list,
            Value::Int(2),
            &Value::from("Audi"),
            SortStrategy::Natural,
            |id| store.get(id).cloned(),
        );

        assert_eq!(list, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_insert_desc_ties_append_after_equals() {
        let store = store(&[(1, "Mazda"), (2, "Mazda"), (3, "Audi")]);
        let mut list = vec![Value::Int(1), Value::Int(3)]; // Mazda, Audi

        insert_desc(
            &mut list,
            Value::Int(2),
            &Value::from("Mazda"),
            SortStrategy::Natural,
            |id| store.get(id).cloned(),
        );

        // New equal-valued id goes after the existing one
        assert_eq!(list, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_remove_id() {
        let mut list = vec![Value::Int(1), Value::Int(2), Value::Int(3)];

        assert!(remove_id(&mut list, &Value::Int(2)));
        assert_eq!(list, vec![Value::Int(1), Value::Int(3)]);

        assert!(!remove_id(&mut list, &Value::Int(9)));
        assert_eq!(list, vec![Value::Int(1), Value::Int(3)]);
    }

    #[test]
    fn test_sort_ids_asc_stable() {
        let store = store(&[(1, "Mazda"), (2, "Audi"), (3, "Mazda")]);
        let ids = vec![Value::Int(1), Value::Int(2), Value::Int(3)];

        let sorted = sort_ids_asc(ids, SortStrategy::Natural, |id| store.get(id).cloned());

        // Equal values keep input order: 1 before 3
        assert_eq!(sorted, vec![Value::Int(2), Value::Int(1), Value::Int(3)]);
    }
}
