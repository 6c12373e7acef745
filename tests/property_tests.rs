//! Property-based tests for the filter/sort/paginate engine
//!
//! Invariants under test:
//! - `count` equals the filtered (pre-pagination) length for any window
//! - identical condition + unchanged records gives identical output
//! - sorting with all-equal (or all-null) keys preserves insertion order

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use proptest::prelude::*;
use serde_json::{json, Value};

use lineage_query::{AnalyzeError, Condition, LineageInfo, LogAnalyzer, Querier};

/// In-memory analyzer: each path resolves to a prebuilt lineage.
struct MapAnalyzer(HashMap<PathBuf, LineageInfo>);

impl LogAnalyzer for MapAnalyzer {
    fn parse(&self, path: &Path) -> Result<LineageInfo, AnalyzeError> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| AnalyzeError::LogMissing {
                path: path.display().to_string(),
            })
    }
}

fn lineage(accuracy: Option<f64>) -> LineageInfo {
    let eval = accuracy.map(|accuracy| {
        json!({
            "metric": {"accuracy": accuracy},
            "valid_dataset": {}
        })
    });
    LineageInfo {
        train_lineage: Some(json!({
            "algorithm": {},
            "hyper_parameters": {"epoch": 1},
            "model": {},
            "train_dataset": {}
        })),
        eval_lineage: eval,
        dataset_graph: None,
    }
}

fn build_querier(accuracies: &[Option<f64>]) -> Querier<MapAnalyzer> {
    let mut logs = HashMap::new();
    let mut paths = Vec::new();
    for (i, accuracy) in accuracies.iter().enumerate() {
        let path = PathBuf::from(format!("/runs/run{i}/lineage.log"));
        logs.insert(path.clone(), lineage(*accuracy));
        paths.push(path);
    }
    Querier::new(MapAnalyzer(logs), paths).unwrap()
}

fn summary_dirs(output: &[Value]) -> Vec<String> {
    output
        .iter()
        .map(|view| view["summary_dir"].as_str().unwrap().to_string())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_count_ignores_pagination(
        accuracies in prop::collection::vec(prop::option::of(0.0f64..1.0), 1..20),
        limit in 0usize..8,
        offset in 0usize..8,
    ) {
        let mut querier = build_querier(&accuracies);

        let unpaged = querier.filter_summary_lineage(&Condition::new()).unwrap();
        let condition: Condition = serde_json::from_value(json!({
            "limit": limit,
            "offset": offset
        })).unwrap();
        let paged = querier.filter_summary_lineage(&condition).unwrap();

        prop_assert_eq!(paged.count, unpaged.count);
        prop_assert_eq!(paged.count, accuracies.len());
        prop_assert!(paged.object.len() <= limit);
    }

    #[test]
    fn prop_identical_queries_are_idempotent(
        accuracies in prop::collection::vec(prop::option::of(0.0f64..1.0), 1..20),
        limit in 1usize..8,
        offset in 0usize..4,
        descending in any::<bool>(),
    ) {
        let mut querier = build_querier(&accuracies);
        let condition: Condition = serde_json::from_value(json!({
            "sorted_name": "metric_accuracy",
            "sorted_type": if descending { "descending" } else { "ascending" },
            "limit": limit,
            "offset": offset
        })).unwrap();

        let first = querier.filter_summary_lineage(&condition).unwrap();
        let second = querier.filter_summary_lineage(&condition).unwrap();

        prop_assert_eq!(first.count, second.count);
        prop_assert_eq!(summary_dirs(&first.object), summary_dirs(&second.object));
    }

    #[test]
    fn prop_equal_sort_keys_preserve_insertion_order(
        size in 1usize..20,
        descending in any::<bool>(),
        all_null in any::<bool>(),
    ) {
        // Every record carries the same accuracy, or none at all
        let accuracy = if all_null { None } else { Some(0.5) };
        let accuracies = vec![accuracy; size];
        let mut querier = build_querier(&accuracies);

        let condition: Condition = serde_json::from_value(json!({
            "sorted_name": "metric_accuracy",
            "sorted_type": if descending { "descending" } else { "ascending" }
        })).unwrap();
        let sorted = querier.filter_summary_lineage(&condition).unwrap();
        let unsorted = querier.filter_summary_lineage(&Condition::new()).unwrap();

        prop_assert_eq!(summary_dirs(&sorted.object), summary_dirs(&unsorted.object));
    }

    #[test]
    fn prop_ordering_filters_never_match_missing_values(
        accuracies in prop::collection::vec(prop::option::of(0.0f64..1.0), 1..20),
    ) {
        let mut querier = build_querier(&accuracies);
        let condition: Condition = serde_json::from_value(json!({
            "metric_accuracy": {"ge": 0.0}
        })).unwrap();

        let result = querier.filter_summary_lineage(&condition).unwrap();
        let present = accuracies.iter().filter(|a| a.is_some()).count();
        prop_assert_eq!(result.count, present);
    }
}
