//! Error types for lineage-query

use thiserror::Error;

use crate::analyzer::AnalyzeError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Lineage query error types
#[derive(Error, Debug)]
pub enum Error {
    /// Querier constructed with an empty path set
    #[error("The summary path is empty")]
    EmptyPaths,

    /// Condition references a field outside the supported field mapping
    #[error("The field {name} is not supported")]
    UnknownField {
        /// Offending field name
        name: String,
    },

    /// Condition uses an expression kind outside the supported vocabulary
    #[error("The expression {name} is not supported")]
    UnknownExpression {
        /// Offending expression name
        name: String,
    },

    /// Summary lookup requested an unrecognized filter key
    #[error("The filter key {name} is invalid")]
    UnknownFilterKey {
        /// Offending filter key
        name: String,
    },

    /// Summary lookup requested a directory absent from the index
    #[error("Summary dir {dir} does not exist")]
    DirNotFound {
        /// Requested summary directory
        dir: String,
    },

    /// Every supplied run log failed to parse
    #[error("All summary logs failed to parse")]
    AllLogsFailed,

    /// Fatal (non-retryable) analyzer failure
    #[error("Summary analysis failed: {0}")]
    Analyze(#[from] AnalyzeError),
}
