//! Run log analysis boundary
//!
//! The querier does not decode run logs itself. It delegates to a
//! [`LogAnalyzer`] implementation that turns one on-disk log into the three
//! lineage sections of [`LineageInfo`]. The built-in [`JsonLogAnalyzer`]
//! reads JSON-encoded run logs; hosts with other log formats supply their
//! own implementation.

mod json_log;

pub use json_log::JsonLogAnalyzer;

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

/// Structured lineage sections extracted from one run log.
///
/// A run always carries train lineage; the evaluation section and the
/// dataset graph are optional (a run may not have been evaluated, and older
/// logs carry no graph).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineageInfo {
    /// Train lineage section (algorithm, model, hyper parameters, dataset)
    pub train_lineage: Option<Value>,
    /// Evaluation lineage section (metric, valid dataset)
    pub eval_lineage: Option<Value>,
    /// Dataset processing graph, if the log recorded one
    pub dataset_graph: Option<Value>,
}

/// Failure modes of run log analysis.
///
/// The first three kinds are transient from the querier's point of view:
/// the log writer may simply not have finished, so the path is kept and
/// re-attempted on the next query. `Corrupted` is terminal.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// The log file does not exist or cannot be opened
    #[error("Summary log not found: {path}")]
    LogMissing {
        /// Path that could not be opened
        path: String,
    },

    /// The log decoded but contains no lineage event section
    #[error("Lineage event missing in summary log: {path}")]
    EventMissing {
        /// Path of the sectionless log
        path: String,
    },

    /// A lineage event is present but a required field is absent
    #[error("Required lineage field {field} missing in summary log")]
    FieldMissing {
        /// Name of the missing field
        field: String,
    },

    /// The log content is not decodable at all
    #[error("Summary log corrupted: {reason}")]
    Corrupted {
        /// Decoder failure description
        reason: String,
    },
}

impl AnalyzeError {
    /// Whether the failure may resolve on a later attempt.
    ///
    /// Retryable failures are swallowed per path during ingestion and the
    /// path is re-parsed on every subsequent query.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Corrupted { .. })
    }
}

/// Decoder of one run log path into structured lineage sections.
pub trait LogAnalyzer {
    /// Parse the run log at `path`.
    ///
    /// # Errors
    /// Returns [`AnalyzeError`] describing why the log could not be
    /// decoded; see [`AnalyzeError::is_retryable`] for how the querier
    /// treats each kind.
    fn parse(&self, path: &Path) -> std::result::Result<LineageInfo, AnalyzeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        let missing = AnalyzeError::LogMissing {
            path: "/tmp/x".to_string(),
        };
        let event = AnalyzeError::EventMissing {
            path: "/tmp/x".to_string(),
        };
        let field = AnalyzeError::FieldMissing {
            field: "model".to_string(),
        };
        let corrupted = AnalyzeError::Corrupted {
            reason: "truncated".to_string(),
        };
        assert!(missing.is_retryable());
        assert!(event.is_retryable());
        assert!(field.is_retryable());
        assert!(!corrupted.is_retryable());
    }
}
