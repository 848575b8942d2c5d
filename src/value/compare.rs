//! Sort strategies and directions
//!
//! Each configured field carries one of a closed set of strategies; the
//! comparison dispatches on the strategy rather than storing a callback.

use std::cmp::Ordering;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use super::Value;

/// Direction of a sorted id list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// String form used in index keys
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// The opposite direction
    pub fn reverse(&self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// How a field's values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortStrategy {
    /// Total order over tagged values
    Natural,
    /// Chronological comparison; RFC 3339 strings are parsed
    Datetime,
}

impl SortStrategy {
    /// Compares two values in ascending terms.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        match self {
            SortStrategy::Natural => a.cmp(b),
            SortStrategy::Datetime => match (Self::as_instant(a), Self::as_instant(b)) {
                (Some(a_dt), Some(b_dt)) => a_dt.cmp(&b_dt),
                _ => a.cmp(b),
            },
        }
    }

    /// Compares two values in the given direction.
    pub fn compare_in(&self, dir: SortDirection, a: &Value, b: &Value) -> Ordering {
        let ordering = self.compare(a, b);
        match dir {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    fn as_instant(v: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
        match v {
            Value::DateTime(dt) => Some(*dt),
            Value::Str(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&chrono::Utc)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_natural_compare() {
        let strategy = SortStrategy::Natural;

        assert_eq!(
            strategy.compare(&Value::from(1), &Value::from(2)),
            Ordering::Less
        );
        assert_eq!(
            strategy.compare(&Value::from("b"), &Value::from("a")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_datetime_compare() {
        let strategy = SortStrategy::Datetime;
        let early = Value::DateTime(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        let late = Value::DateTime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        assert_eq!(strategy.compare(&early, &late), Ordering::Less);
        assert_eq!(strategy.compare(&late, &early), Ordering::Greater);
    }

    #[test]
    fn test_datetime_compare_parses_rfc3339_strings() {
        let strategy = SortStrategy::Datetime;
        let early = Value::from("2023-01-01T00:00:00Z");
        let late = Value::DateTime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        assert_eq!(strategy.compare(&early, &late), Ordering::Less);
    }

    #[test]
    fn test_datetime_compare_falls_back_to_natural() {
        let strategy = SortStrategy::Datetime;

        assert_eq!(
            strategy.compare(&Value::from(1), &Value::from(2)),
            Ordering::Less
        );
    }

    #[test]
    fn test_compare_in_desc_reverses() {
        let strategy = SortStrategy::Natural;

        assert_eq!(
            strategy.compare_in(SortDirection::Desc, &Value::from(1), &Value::from(2)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_direction_reverse() {
        assert_eq!(SortDirection::Asc.reverse(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.reverse(), SortDirection::Asc);
        assert_eq!(SortDirection::Asc.as_str(), "asc");
        assert_eq!(SortDirection::Desc.as_str(), "desc");
    }
}
