//! Lineage querier - ingestion, retry and the filter/sort/paginate engine
//!
//! The querier owns the full query session: it ingests run logs through a
//! [`LogAnalyzer`], tolerates per-log parse failures, re-attempts failed
//! logs on every query (writers may still be flushing at ingestion time),
//! and answers summary lookups and filter queries over the resulting
//! records.

mod marks;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::analyzer::LogAnalyzer;
use crate::condition::{compare_values, Condition, ExpressionKind, LineageType, SortOrder};
use crate::record::{FilterKey, LineageField, RunRecord};
use crate::{Error, Result};

use marks::assign_dataset_marks;

/// Result of a filter query.
///
/// `count` is the size of the filtered sequence before pagination, so a
/// paging client always sees the full population size.
#[derive(Debug, Serialize)]
pub struct QueryOutput {
    /// Projected records of the requested page
    pub object: Vec<Value>,
    /// Filtered record count, pagination-independent
    pub count: usize,
}

/// Querier over the lineage of a set of training runs.
///
/// Construction parses every supplied run log; logs that fail for a
/// transient reason are kept aside and re-parsed at the start of every
/// query, so a querier heals itself as log writers finish. Records are
/// append-only and indexed by their run directory.
///
/// A querier is a single-session, single-threaded object: query methods
/// take `&mut self` because the retry pass mutates shared state. Hosts
/// serving concurrent requests keep one instance per request or serialize
/// access externally.
pub struct Querier<A> {
    analyzer: A,
    records: Vec<RunRecord>,
    index_map: HashMap<String, usize>,
    failed_paths: Vec<PathBuf>,
    /// Records ever produced; used as the insertion index for retried
    /// paths so indices stay monotonic as the failed list shrinks.
    size: usize,
}

// Analyzers need not be Debug, so the derive is not an option here.
impl<A> fmt::Debug for Querier<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Querier")
            .field("records", &self.records.len())
            .field("failed_paths", &self.failed_paths)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl<A: LogAnalyzer> Querier<A> {
    /// Ingest the given run log paths and build the querier.
    ///
    /// Each path is parsed independently; a transient failure (missing
    /// log, missing event, missing field) is recorded for retry and does
    /// not abort the remaining paths.
    ///
    /// # Errors
    /// - [`Error::EmptyPaths`] if `summary_paths` is empty.
    /// - [`Error::AllLogsFailed`] if not a single log produced a record.
    /// - [`Error::Analyze`] on a non-retryable analyzer failure.
    pub fn new(analyzer: A, summary_paths: Vec<PathBuf>) -> Result<Self> {
        if summary_paths.is_empty() {
            return Err(Error::EmptyPaths);
        }

        let mut querier = Self {
            analyzer,
            records: Vec::new(),
            index_map: HashMap::new(),
            failed_paths: Vec::new(),
            size: 0,
        };

        let mut index = 0;
        for path in &summary_paths {
            if querier.parse_log(path, index, true)? {
                index += 1;
            }
        }

        if !querier.failed_paths.is_empty() {
            info!(failed = ?querier.failed_paths, "summary logs failed to parse");
        }
        if querier.records.is_empty() {
            return Err(Error::AllLogsFailed);
        }
        querier.size = querier.records.len();
        Ok(querier)
    }

    /// Ingest a single run log path.
    ///
    /// # Errors
    /// Same as [`Querier::new`].
    pub fn from_path(analyzer: A, summary_path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(analyzer, vec![summary_path.into()])
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the querier holds no records. Unreachable after a
    /// successful construction, but kept for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Paths whose logs have not parsed yet; retried on every query.
    #[must_use]
    pub fn failed_paths(&self) -> &[PathBuf] {
        &self.failed_paths
    }

    /// Get summary lineage for one run or for all runs.
    ///
    /// `filter_keys` selects which lineage sections each summary carries;
    /// `None` selects all of them. With a `summary_dir` the result is a
    /// single-element list for that run.
    ///
    /// # Errors
    /// - [`Error::UnknownFilterKey`] for a key outside the vocabulary,
    ///   checked before any lookup.
    /// - [`Error::DirNotFound`] if `summary_dir` is not indexed.
    /// - Any fatal failure from the retry pass.
    pub fn get_summary_lineage(
        &mut self,
        summary_dir: Option<&str>,
        filter_keys: Option<&[String]>,
    ) -> Result<Vec<Map<String, Value>>> {
        self.retry_failed_logs()?;

        let keys: Vec<FilterKey> = match filter_keys {
            None => FilterKey::all().to_vec(),
            Some(names) => names
                .iter()
                .map(|name| {
                    FilterKey::parse(name).ok_or_else(|| Error::UnknownFilterKey {
                        name: name.clone(),
                    })
                })
                .collect::<Result<_>>()?,
        };

        match summary_dir {
            None => Ok(self
                .records
                .iter()
                .map(|record| record.get_summary_info(&keys))
                .collect()),
            Some(dir) => {
                let index = *self.index_map.get(dir).ok_or_else(|| Error::DirNotFound {
                    dir: dir.to_string(),
                })?;
                Ok(vec![self.records[index].get_summary_info(&keys)])
            }
        }
    }

    /// Filter, sort and paginate lineage records by `condition`.
    ///
    /// The condition is validated in full before any record is evaluated:
    /// every field filter must name a supported field and every expression
    /// a supported kind, and `sorted_name` (when present) must name a
    /// supported field. A condition that simply matches nothing yields
    /// `{object: [], count: 0}` as a success.
    ///
    /// # Errors
    /// - [`Error::UnknownField`] / [`Error::UnknownExpression`] for a
    ///   malformed condition.
    /// - Any fatal failure from the retry pass.
    pub fn filter_summary_lineage(&mut self, condition: &Condition) -> Result<QueryOutput> {
        self.retry_failed_logs()?;

        let filters = Self::validate_filters(condition)?;
        // A present sorted_name must name a supported field; a non-string
        // value is just as unsupported as an unknown name.
        let sort_field = condition
            .sorted_name()
            .map(|raw| {
                raw.as_str()
                    .and_then(LineageField::parse)
                    .ok_or_else(|| Error::UnknownField {
                        name: raw
                            .as_str()
                            .map_or_else(|| raw.to_string(), ToString::to_string),
                    })
            })
            .transpose()?;

        let mut selected: Vec<&RunRecord> = self
            .records
            .iter()
            .filter(|record| Self::matches(record, &filters))
            .collect();

        if let Some(field) = &sort_field {
            match condition.sort_order() {
                SortOrder::Ascending => {
                    selected.sort_by(|a, b| Self::compare_by_field(a, b, field));
                }
                // Stable descending: ties keep their insertion order
                SortOrder::Descending => {
                    selected.sort_by(|a, b| Self::compare_by_field(b, a, field));
                }
            }
        }

        let count = selected.len();
        let page = Self::paginate(condition, &selected);

        let object = page
            .iter()
            .map(|record| match condition.lineage_type() {
                LineageType::Dataset => Value::Object(record.to_dataset_view()),
                LineageType::Model => Value::Object(record.to_filtration_view()),
            })
            .collect();

        Ok(QueryOutput { object, count })
    }

    /// Resolve field filters against the vocabulary, before evaluation.
    fn validate_filters(
        condition: &Condition,
    ) -> Result<Vec<(LineageField, Vec<(ExpressionKind, Value)>)>> {
        let mut filters = Vec::new();
        for (name, raw) in condition.field_filters() {
            let field = LineageField::parse(name).ok_or_else(|| Error::UnknownField {
                name: name.to_string(),
            })?;
            let mut expressions = Vec::new();
            if let Some(map) = raw.as_object() {
                for (kind_name, expected) in map {
                    let kind =
                        ExpressionKind::parse(kind_name).ok_or_else(|| Error::UnknownExpression {
                            name: kind_name.clone(),
                        })?;
                    expressions.push((kind, expected.clone()));
                }
            }
            filters.push((field, expressions));
        }
        Ok(filters)
    }

    fn matches(record: &RunRecord, filters: &[(LineageField, Vec<(ExpressionKind, Value)>)]) -> bool {
        filters.iter().all(|(field, expressions)| {
            let actual = record.value_of(field);
            expressions
                .iter()
                .all(|(kind, expected)| kind.is_match(expected, actual.as_ref()))
        })
    }

    /// Comparator for sorting: missing values sort before present ones,
    /// otherwise natural order of the value type. Incomparable non-null
    /// pairs are treated as equal so the sort stays stable.
    fn compare_by_field(a: &RunRecord, b: &RunRecord, field: &LineageField) -> Ordering {
        match (a.value_of(field), b.value_of(field)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => compare_values(&x, &y).unwrap_or(Ordering::Equal),
        }
    }

    /// Apply the pagination window.
    ///
    /// With neither `limit` nor `offset` present the window is the whole
    /// sequence; otherwise it is `[offset*limit, offset*limit + limit)`
    /// with out-of-range bounds clamped, never an error.
    fn paginate<'r>(condition: &Condition, selected: &'r [&'r RunRecord]) -> &'r [&'r RunRecord] {
        if !condition.has_pagination() {
            return selected;
        }
        let limit = condition.limit().unwrap_or(10);
        let offset = condition.offset().unwrap_or(0);
        let start = offset.saturating_mul(limit).min(selected.len());
        let end = start.saturating_add(limit).min(selected.len());
        &selected[start..end]
    }

    /// Re-attempt every failed path once, in order.
    ///
    /// Paths that now parse are appended to the record sequence with the
    /// next monotonic index and leave the failed list; paths that still
    /// fail stay, in their original relative order.
    fn retry_failed_logs(&mut self) -> Result<()> {
        if self.failed_paths.is_empty() {
            return Ok(());
        }
        debug!(pending = self.failed_paths.len(), "retrying failed summary logs");

        let pending = self.failed_paths.clone();
        let mut still_failed = Vec::new();
        for path in pending {
            if self.parse_log(&path, self.size, false)? {
                self.size += 1;
            } else {
                still_failed.push(path);
            }
        }
        self.failed_paths = still_failed;
        Ok(())
    }

    /// Parse one run log and absorb it into the record sequence.
    ///
    /// Returns whether a record was produced. Retryable failures are
    /// recorded (during initial ingestion only) and reported as `false`;
    /// non-retryable analyzer failures propagate.
    fn parse_log(&mut self, path: &Path, index: usize, save_failed: bool) -> Result<bool> {
        let summary_dir = path
            .parent()
            .map_or_else(String::new, |dir| dir.display().to_string());

        let info = match self.analyzer.parse(path) {
            Ok(info) => info,
            Err(error) if error.is_retryable() => {
                warn!(path = %path.display(), %error, "summary log not parseable yet");
                if save_failed {
                    self.failed_paths.push(path.to_path_buf());
                }
                return Ok(false);
            }
            Err(error) => return Err(Error::Analyze(error)),
        };

        // Record construction failures are structural-incompleteness
        // failures and therefore retryable as well.
        let record = match RunRecord::new(summary_dir.clone(), info) {
            Ok(record) => record,
            Err(error) => {
                warn!(path = %path.display(), %error, "summary log structurally incomplete");
                if save_failed {
                    self.failed_paths.push(path.to_path_buf());
                }
                return Ok(false);
            }
        };

        self.records.push(record);
        assign_dataset_marks(&mut self.records);
        self.index_map.insert(summary_dir, index);
        Ok(true)
    }
}
