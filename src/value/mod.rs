//! Tagged field values
//!
//! Records are dynamic maps, so field values carry their own type tag.
//! Ordering is deterministic: Null < Bool < Int < Float < String < DateTime
//! < Uuid, with natural ordering within a type. Floats are ordered by their
//! total-order bit transform so that every value is totally comparable and
//! hashable.

mod compare;

pub use compare::{SortDirection, SortStrategy};

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single field value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    /// Absent / null
    Null,
    /// Boolean (false < true)
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// UTC timestamp
    DateTime(DateTime<Utc>),
    /// UUID
    Uuid(Uuid),
}

impl Value {
    /// Rank used for cross-type comparison
    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 3,
            Value::Str(_) => 4,
            Value::DateTime(_) => 5,
            Value::Uuid(_) => 6,
        }
    }

    /// Total-order bits for a float.
    ///
    /// Negative floats flip all bits, positive floats flip the sign bit.
    fn ordered_bits(v: f64) -> u64 {
        let bits = v.to_bits();
        if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        }
    }

    /// Returns the string content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the timestamp content, if this is a datetime
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// True for `Value::Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let rank = self.type_rank().cmp(&other.type_rank());
        if rank != Ordering::Equal {
            return rank;
        }

        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => {
                Self::ordered_bits(*a).cmp(&Self::ordered_bits(*b))
            }
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            _ => unreachable!("equal type ranks imply equal variants"),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_rank().hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => Self::ordered_bits(*f).hash(state),
            Value::Str(s) => s.hash(state),
            Value::DateTime(dt) => dt.hash(state),
            Value::Uuid(u) => u.hash(state),
        }
    }
}

impl fmt::Display for Value {
    /// Bare scalar rendering, used in index keys and fingerprints.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_type_rank_ordering() {
        let values = vec![
            Value::Null,
            Value::Bool(true),
            Value::Int(i64::MAX),
            Value::Float(f64::NEG_INFINITY),
            Value::Str("".into()),
            Value::DateTime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            Value::Uuid(Uuid::nil()),
        ];

        for i in 1..values.len() {
            assert!(values[i - 1] < values[i], "rank order must hold");
        }
    }

    #[test]
    fn test_float_total_order() {
        let mut floats = vec![
            Value::Float(1.5),
            Value::Float(-2.0),
            Value::Float(0.0),
            Value::Float(-0.5),
            Value::Float(100.0),
        ];
        floats.sort();

        assert_eq!(
            floats,
            vec![
                Value::Float(-2.0),
                Value::Float(-0.5),
                Value::Float(0.0),
                Value::Float(1.5),
                Value::Float(100.0),
            ]
        );
    }

    #[test]
    fn test_string_ordering() {
        assert!(Value::from("Lambo") < Value::from("Mazda"));
        assert!(Value::from("a") < Value::from("b"));
    }

    #[test]
    fn test_datetime_ordering() {
        let early = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        assert!(Value::DateTime(early) < Value::DateTime(late));
    }

    #[test]
    fn test_hash_eq_consistent_for_floats() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(Value::Float(1.25), 1);
        assert_eq!(map.get(&Value::Float(1.25)), Some(&1));
    }

    #[test]
    fn test_display_bare_scalars() {
        assert_eq!(Value::from("CD").to_string(), "CD");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
    }
}
