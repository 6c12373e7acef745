//! JSON run log analyzer

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::{AnalyzeError, LineageInfo, LogAnalyzer};

const TRAIN_SECTION: &str = "train_lineage";
const EVAL_SECTION: &str = "evaluation_lineage";
const DATASET_SECTION: &str = "dataset_graph";

/// Analyzer for JSON-encoded run logs.
///
/// A log is one JSON object with up to three top-level sections:
/// `train_lineage`, `evaluation_lineage` and `dataset_graph`. A log with
/// none of them carries no lineage event and is reported as
/// [`AnalyzeError::EventMissing`], which the querier treats as retryable
/// (the writer may still be flushing).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLogAnalyzer;

impl JsonLogAnalyzer {
    /// Create a new JSON log analyzer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LogAnalyzer for JsonLogAnalyzer {
    fn parse(&self, path: &Path) -> Result<LineageInfo, AnalyzeError> {
        let content = fs::read_to_string(path).map_err(|_| AnalyzeError::LogMissing {
            path: path.display().to_string(),
        })?;

        let mut root: Value =
            serde_json::from_str(&content).map_err(|e| AnalyzeError::Corrupted {
                reason: e.to_string(),
            })?;

        let Some(object) = root.as_object_mut() else {
            return Err(AnalyzeError::Corrupted {
                reason: "top-level value is not an object".to_string(),
            });
        };

        let train_lineage = object.remove(TRAIN_SECTION);
        let eval_lineage = object.remove(EVAL_SECTION);
        let dataset_graph = object.remove(DATASET_SECTION);

        if train_lineage.is_none() && eval_lineage.is_none() && dataset_graph.is_none() {
            return Err(AnalyzeError::EventMissing {
                path: path.display().to_string(),
            });
        }

        Ok(LineageInfo {
            train_lineage,
            eval_lineage,
            dataset_graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_log(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_full_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(
            &dir,
            "run.log",
            r#"{
                "train_lineage": {"algorithm": {"network": "ResNet"}},
                "evaluation_lineage": {"metric": {"accuracy": 0.9}},
                "dataset_graph": {"op": "batch"}
            }"#,
        );

        let info = JsonLogAnalyzer::new().parse(&path).unwrap();
        assert!(info.train_lineage.is_some());
        assert!(info.eval_lineage.is_some());
        assert!(info.dataset_graph.is_some());
    }

    #[test]
    fn test_parse_train_only_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, "run.log", r#"{"train_lineage": {}}"#);

        let info = JsonLogAnalyzer::new().parse(&path).unwrap();
        assert!(info.train_lineage.is_some());
        assert!(info.eval_lineage.is_none());
        assert!(info.dataset_graph.is_none());
    }

    #[test]
    fn test_missing_log_is_retryable() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonLogAnalyzer::new()
            .parse(&dir.path().join("absent.log"))
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::LogMissing { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_sectionless_log_is_event_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, "run.log", r#"{"unrelated": 1}"#);
        let err = JsonLogAnalyzer::new().parse(&path).unwrap_err();
        assert!(matches!(err, AnalyzeError::EventMissing { .. }));
    }

    #[test]
    fn test_undecodable_log_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_log(&dir, "run.log", "not json at all {{{");
        let err = JsonLogAnalyzer::new().parse(&path).unwrap_err();
        assert!(matches!(err, AnalyzeError::Corrupted { .. }));
        assert!(!err.is_retryable());
    }
}
