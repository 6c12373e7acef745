//! # lineage-query: embedded query engine for ML run lineage
//!
//! Training and evaluation runs record their lineage (hyper parameters,
//! dataset pipeline, metrics, model info) in on-disk run logs. This crate
//! loads zero or more such logs, builds an in-memory index of run records,
//! and answers two kinds of queries:
//!
//! - **summary lookup**: full or partial lineage for one run or all runs;
//! - **filter query**: filter, sort and paginate runs by a structured
//!   condition.
//!
//! Ingestion tolerates partial failure: a log that is still being written
//! is kept aside and re-parsed at the start of every query, so the querier
//! self-heals as writers finish. Runs with structurally equal dataset
//! graphs are grouped under a shared dataset mark.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lineage_query::{Condition, JsonLogAnalyzer, Querier};
//! use std::path::PathBuf;
//!
//! # fn main() -> lineage_query::Result<()> {
//! let mut querier = Querier::new(
//!     JsonLogAnalyzer::new(),
//!     vec![PathBuf::from("/runs/exp0/lineage.log")],
//! )?;
//!
//! let condition: Condition = serde_json::from_value(serde_json::json!({
//!     "learning_rate": {"ge": 0.01},
//!     "sorted_name": "metric_accuracy",
//!     "sorted_type": "descending",
//!     "limit": 10,
//!     "offset": 0
//! })).expect("condition is a JSON object");
//!
//! let result = querier.filter_summary_lineage(&condition)?;
//! println!("{} matching runs", result.count);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analyzer;
pub mod condition;
pub mod error;
pub mod querier;
pub mod record;

pub use analyzer::{AnalyzeError, JsonLogAnalyzer, LineageInfo, LogAnalyzer};
pub use condition::{Condition, ConditionKey, ExpressionKind, LineageType, SortOrder};
pub use error::{Error, Result};
pub use querier::{Querier, QueryOutput};
pub use record::{FilterKey, LineageField, RecordError, RunRecord};
