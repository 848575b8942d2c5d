//! Engine Invariant Tests
//!
//! Invariants that must hold after every successful mutation:
//! - Ascending lists mirror descending lists
//! - Lists are sorted and hold exactly the records under their prefilter
//! - Uniques counts agree with index membership
//! - Lookups agree with stored field values
//! - put is idempotent; put then drop restores the prior state

use std::collections::HashMap;

use prismdb::engine::{Engine, WarmEntry};
use prismdb::index::Prefilter;
use prismdb::record;
use prismdb::record::IdKey;
use prismdb::schema::{EntityConfig, FieldConfig, PrefilterConfig, WarmBatch};
use prismdb::value::{SortDirection, SortStrategy, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn albums_engine() -> Engine {
    let config = EntityConfig::new(
        "albums",
        IdKey::field("id"),
        vec![FieldConfig::natural("name"), FieldConfig::natural("label")],
    )
    .with_prefilter(PrefilterConfig::on_field("label", &["media"]))
    .with_lookups(&["artist"]);

    let records = vec![
        record! { "id" => 1, "name" => "Hold Your Colour", "label" => "Breakbeat Kaos", "media" => "CD", "artist" => "Pendulum" },
        record! { "id" => 2, "name" => "Fabric", "label" => "Hospital Records", "media" => "CD", "artist" => "Logistics" },
        record! { "id" => 3, "name" => "Louder", "label" => "Hospital Records", "media" => "Vinyl", "artist" => "Logistics" },
        record! { "id" => 4, "name" => "Hospitality", "label" => "Hospital Records", "media" => "CD", "artist" => "Various" },
    ];

    Engine::warm(vec![WarmEntry::new(config, WarmBatch::new(records))]).unwrap()
}

fn known_prefilters(engine: &Engine) -> Vec<Prefilter> {
    let mut prefilters = vec![Prefilter::Global];
    for label in engine
        .get_uniques_list("albums", &Prefilter::Global, "label")
        .unwrap()
    {
        prefilters.push(Prefilter::Field {
            field: "label".into(),
            value: label,
        });
    }
    prefilters
}

/// Asserts invariants 1-3 for every `(prefilter, field)` of the entity.
fn assert_index_invariants(engine: &Engine) {
    for prefilter in known_prefilters(engine) {
        for field in ["name", "label"] {
            let asc = engine
                .get_ids("albums", &prefilter, field, SortDirection::Asc)
                .unwrap();
            let desc = engine
                .get_ids("albums", &prefilter, field, SortDirection::Desc)
                .unwrap();

            // Mirror
            let mirrored: Vec<Value> = desc.iter().rev().cloned().collect();
            assert_eq!(asc, mirrored, "asc != reverse(desc) for {:?}/{}", prefilter, field);

            // Sorted
            let values: Vec<Value> = asc
                .iter()
                .map(|id| {
                    engine
                        .get("albums", id)
                        .unwrap()
                        .unwrap()
                        .get(field)
                        .cloned()
                        .unwrap()
                })
                .collect();
            for window in values.windows(2) {
                assert_ne!(
                    SortStrategy::Natural.compare(&window[0], &window[1]),
                    std::cmp::Ordering::Greater,
                    "list not sorted for {:?}/{}",
                    prefilter,
                    field
                );
            }

            // Membership: exactly the stored records under the prefilter
            let members: Vec<Value> = engine
                .get_records("albums", &prefilter, Some((field, SortDirection::Asc)))
                .unwrap()
                .iter()
                .map(|r| r.get("id").cloned().unwrap())
                .collect();
            assert_eq!(asc, members);
        }
    }
}

/// Asserts invariant 4: uniques agree with the first-field index.
fn assert_uniques_invariant(engine: &Engine) {
    for prefilter in known_prefilters(engine) {
        let map = engine
            .get_uniques_map("albums", &prefilter, "media")
            .unwrap();
        let list = engine
            .get_uniques_list("albums", &prefilter, "media")
            .unwrap();

        if matches!(prefilter, Prefilter::Global) && map.is_empty() {
            continue;
        }

        let mut expected: HashMap<Value, usize> = HashMap::new();
        for record in engine.get_records("albums", &prefilter, None).unwrap() {
            *expected
                .entry(record.get("media").cloned().unwrap())
                .or_insert(0) += 1;
        }
        assert_eq!(map, expected, "counts disagree for {:?}", prefilter);

        let mut sorted_keys: Vec<Value> = map.keys().cloned().collect();
        sorted_keys.sort();
        assert_eq!(list, sorted_keys, "list is not sorted(keys) for {:?}", prefilter);
        assert!(map.values().all(|&count| count > 0));
    }
}

/// Asserts invariant 5: the artist lookup mirrors stored records.
fn assert_lookup_invariant(engine: &Engine) {
    let records = engine.get_records("albums", &Prefilter::Global, None).unwrap();
    for record in &records {
        let artist = record.get("artist").unwrap();
        let hits = engine.get_by("albums", "artist", artist).unwrap();
        assert!(
            hits.iter().any(|r| r.get("id") == record.get("id")),
            "lookup misses id {:?} under {:?}",
            record.get("id"),
            artist
        );
    }
}

fn assert_all_invariants(engine: &Engine) {
    assert_index_invariants(engine);
    assert_uniques_invariant(engine);
    assert_lookup_invariant(engine);
}

/// Observable snapshot for restore comparisons.
fn snapshot(engine: &Engine) -> Vec<String> {
    let mut lines = Vec::new();
    for prefilter in known_prefilters(engine) {
        for field in ["name", "label"] {
            for dir in [SortDirection::Asc, SortDirection::Desc] {
                let ids = engine.get_ids("albums", &prefilter, field, dir).unwrap();
                lines.push(format!("{:?}/{}/{:?}: {:?}", prefilter, field, dir, ids));
            }
        }
        lines.push(format!(
            "{:?}/uniques: {:?}",
            prefilter,
            engine.get_uniques_list("albums", &prefilter, "media").unwrap()
        ));
    }
    lines.push(format!(
        "labels: {:?}",
        engine
            .get_uniques_list("albums", &Prefilter::Global, "label")
            .unwrap()
    ));
    lines.sort();
    lines
}

// =============================================================================
// Invariants After Mutations
// =============================================================================

/// All invariants hold straight after warm.
#[test]
fn test_invariants_after_warm() {
    assert_all_invariants(&albums_engine());
}

/// All invariants hold after a burst of mixed mutations.
#[test]
fn test_invariants_after_mutation_burst() {
    let mut engine = albums_engine();

    engine
        .put(
            "albums",
            record! { "id" => 5, "name" => "Timeless", "label" => "Metalheadz", "media" => "Vinyl", "artist" => "Goldie" },
        )
        .unwrap();
    engine
        .put(
            "albums",
            record! { "id" => 2, "name" => "Fabric Live", "label" => "Hospital Records", "media" => "Cassette", "artist" => "Logistics" },
        )
        .unwrap();
    engine
        .put(
            "albums",
            record! { "id" => 1, "name" => "Hold Your Colour", "label" => "Hospital Records", "media" => "CD", "artist" => "Pendulum" },
        )
        .unwrap();
    engine.drop_record("albums", &Value::Int(3)).unwrap();

    assert_all_invariants(&engine);
}

/// Records moving across every partition keep invariants intact.
#[test]
fn test_invariants_across_partition_moves() {
    let mut engine = albums_engine();

    for label in ["Breakbeat Kaos", "Metalheadz", "Hospital Records"] {
        engine
            .put(
                "albums",
                record! { "id" => 3, "name" => "Louder", "label" => label, "media" => "Vinyl", "artist" => "Logistics" },
            )
            .unwrap();
        assert_all_invariants(&engine);
    }
}

// =============================================================================
// Idempotence and Restore
// =============================================================================

/// put(x); put(x) is equivalent to put(x).
#[test]
fn test_put_idempotent() {
    let mut engine = albums_engine();
    let rec = record! { "id" => 5, "name" => "Timeless", "label" => "Metalheadz", "media" => "Vinyl", "artist" => "Goldie" };

    engine.put("albums", rec.clone()).unwrap();
    let once = snapshot(&engine);

    engine.put("albums", rec).unwrap();
    let twice = snapshot(&engine);

    assert_eq!(once, twice);
}

/// put(x); drop(id(x)) restores the state before put(x).
#[test]
fn test_put_then_drop_restores() {
    let mut engine = albums_engine();
    let before = snapshot(&engine);

    engine
        .put(
            "albums",
            record! { "id" => 5, "name" => "Timeless", "label" => "Metalheadz", "media" => "Vinyl", "artist" => "Goldie" },
        )
        .unwrap();
    engine.drop_record("albums", &Value::Int(5)).unwrap();

    assert_eq!(snapshot(&engine), before);
    assert_all_invariants(&engine);
}

/// Dropping everything leaves empty listings and empty global bundles.
#[test]
fn test_drop_everything() {
    let mut engine = albums_engine();

    for id in 1..=4 {
        engine.drop_record("albums", &Value::Int(id)).unwrap();
    }

    assert!(engine
        .get_records("albums", &Prefilter::Global, None)
        .unwrap()
        .is_empty());
    assert!(engine
        .get_uniques_list("albums", &Prefilter::Global, "label")
        .unwrap()
        .is_empty());
    assert_all_invariants(&engine);
}
