//! Run Record - lineage of one training/evaluation run
//!
//! One record per successfully parsed run log. A record holds the lineage
//! sections as decoded JSON maps and exposes three projections: a summary
//! view keyed by [`FilterKey`], a flat filtration view for filter query
//! results, and a dataset view for dataset-oriented searches.

mod fields;

pub use fields::{FilterKey, LineageField, METRIC_PREFIX};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::analyzer::LineageInfo;

const TRAIN_FIELDS: [&str; 4] = ["algorithm", "hyper_parameters", "model", "train_dataset"];
const EVAL_FIELDS: [&str; 2] = ["metric", "valid_dataset"];

/// Run record construction failures.
///
/// Every kind is retryable: a structurally incomplete log usually means the
/// writer has not finished, so the querier keeps the path and re-parses it
/// on the next query.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The log carried no train lineage event
    #[error("Train lineage event missing for {summary_dir}")]
    TrainEventMissing {
        /// Directory of the incomplete run
        summary_dir: String,
    },

    /// A lineage event is present but a required section is absent
    #[error("Lineage field {field} missing in {event} event")]
    EventFieldMissing {
        /// Event the section belongs to (`train` or `evaluation`)
        event: String,
        /// Missing section name
        field: String,
    },
}

/// Lineage of a single run.
///
/// `summary_dir` is the record's unique lookup key. All lineage sections
/// are immutable after construction; only `dataset_mark` is assigned later
/// by the querier's grouping pass.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunRecord {
    summary_dir: String,
    algorithm: Map<String, Value>,
    hyper_parameters: Map<String, Value>,
    model: Map<String, Value>,
    train_dataset: Map<String, Value>,
    metric: Map<String, Value>,
    valid_dataset: Map<String, Value>,
    dataset_graph: Option<Value>,
    dataset_mark: Option<String>,
}

impl RunRecord {
    /// Build a record from the analyzed sections of one run log.
    ///
    /// # Errors
    /// Returns [`RecordError::TrainEventMissing`] when the log has no train
    /// lineage, and [`RecordError::EventFieldMissing`] when a required
    /// section of the train or evaluation event is absent.
    pub fn new(summary_dir: impl Into<String>, info: LineageInfo) -> Result<Self, RecordError> {
        let summary_dir = summary_dir.into();

        let Some(train) = info.train_lineage else {
            return Err(RecordError::TrainEventMissing { summary_dir });
        };
        let mut train = Self::require_sections(train, "train", &TRAIN_FIELDS)?;

        let (metric, valid_dataset) = match info.eval_lineage {
            Some(eval) => {
                let mut eval = Self::require_sections(eval, "evaluation", &EVAL_FIELDS)?;
                (
                    Self::take_section(&mut eval, "metric"),
                    Self::take_section(&mut eval, "valid_dataset"),
                )
            }
            None => (Map::new(), Map::new()),
        };

        Ok(Self {
            summary_dir,
            algorithm: Self::take_section(&mut train, "algorithm"),
            hyper_parameters: Self::take_section(&mut train, "hyper_parameters"),
            model: Self::take_section(&mut train, "model"),
            train_dataset: Self::take_section(&mut train, "train_dataset"),
            metric,
            valid_dataset,
            dataset_graph: info.dataset_graph,
            dataset_mark: None,
        })
    }

    fn require_sections(
        event: Value,
        event_name: &str,
        required: &[&str],
    ) -> Result<Map<String, Value>, RecordError> {
        let Value::Object(map) = event else {
            return Err(RecordError::EventFieldMissing {
                event: event_name.to_string(),
                field: required[0].to_string(),
            });
        };
        for field in required {
            if !map.contains_key(*field) {
                return Err(RecordError::EventFieldMissing {
                    event: event_name.to_string(),
                    field: (*field).to_string(),
                });
            }
        }
        Ok(map)
    }

    fn take_section(event: &mut Map<String, Value>, name: &str) -> Map<String, Value> {
        match event.remove(name) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// The run's directory, unique per querier instance.
    #[must_use]
    pub fn summary_dir(&self) -> &str {
        &self.summary_dir
    }

    /// Dataset graph recorded by the run, if any.
    #[must_use]
    pub const fn dataset_graph(&self) -> Option<&Value> {
        self.dataset_graph.as_ref()
    }

    /// Group tag assigned by dataset-mark grouping, if assigned yet.
    #[must_use]
    pub fn dataset_mark(&self) -> Option<&str> {
        self.dataset_mark.as_deref()
    }

    /// Assign the dataset mark. Called only by the grouping pass.
    pub fn set_dataset_mark(&mut self, mark: impl Into<String>) {
        self.dataset_mark = Some(mark.into());
    }

    /// Resolve a field's current value.
    ///
    /// `None` means "field has no value for this run", which is a valid
    /// answer; unknown field names never reach this point because the
    /// condition vocabulary rejects them first.
    #[must_use]
    pub fn value_of(&self, field: &LineageField) -> Option<Value> {
        let value = match field {
            LineageField::SummaryDir => Some(Value::String(self.summary_dir.clone())),
            LineageField::LossFunction => self.hyper_parameters.get("loss_function").cloned(),
            LineageField::TrainDatasetPath => self.train_dataset.get("train_dataset_path").cloned(),
            LineageField::TrainDatasetCount => {
                self.train_dataset.get("train_dataset_size").cloned()
            }
            LineageField::TestDatasetPath => self.valid_dataset.get("valid_dataset_path").cloned(),
            LineageField::TestDatasetCount => {
                self.valid_dataset.get("valid_dataset_size").cloned()
            }
            LineageField::Network => self.algorithm.get("network").cloned(),
            LineageField::Optimizer => self.hyper_parameters.get("optimizer").cloned(),
            LineageField::LearningRate => self.hyper_parameters.get("learning_rate").cloned(),
            LineageField::Epoch => self.hyper_parameters.get("epoch").cloned(),
            LineageField::BatchSize => self.hyper_parameters.get("batch_size").cloned(),
            LineageField::DeviceNum => self.hyper_parameters.get("device_num").cloned(),
            LineageField::Loss => self.model.get("loss").cloned(),
            LineageField::ModelSize => self.model.get("size").cloned(),
            LineageField::DatasetMark => self.dataset_mark.clone().map(Value::String),
            LineageField::Metric(name) => self.metric.get(name).cloned(),
        };
        value.filter(|v| !v.is_null())
    }

    /// Summary projection: `summary_dir` plus each requested section.
    #[must_use]
    pub fn get_summary_info(&self, filter_keys: &[FilterKey]) -> Map<String, Value> {
        let mut info = Map::new();
        info.insert(
            "summary_dir".to_string(),
            Value::String(self.summary_dir.clone()),
        );
        for key in filter_keys {
            info.insert(key.name().to_string(), self.section_value(*key));
        }
        info
    }

    fn section_value(&self, key: FilterKey) -> Value {
        match key {
            FilterKey::Metric => Value::Object(self.metric.clone()),
            FilterKey::HyperParameters => Value::Object(self.hyper_parameters.clone()),
            FilterKey::Algorithm => Value::Object(self.algorithm.clone()),
            FilterKey::TrainDataset => Value::Object(self.train_dataset.clone()),
            FilterKey::ValidDataset => Value::Object(self.valid_dataset.clone()),
            FilterKey::Model => Value::Object(self.model.clone()),
            FilterKey::DatasetGraph => self.dataset_graph.clone().unwrap_or(Value::Null),
        }
    }

    /// Flat projection used for default filter query results.
    ///
    /// Carries every fixed scalar field by name, the full metric map, the
    /// dataset graph and the dataset mark. Absent values appear as `null`
    /// so the output shape is uniform across records.
    #[must_use]
    pub fn to_filtration_view(&self) -> Map<String, Value> {
        let mut view = Map::new();
        for (name, field) in LineageField::SCALAR_FIELDS {
            view.insert(
                (*name).to_string(),
                self.value_of(field).unwrap_or(Value::Null),
            );
        }
        view.insert("metric".to_string(), Value::Object(self.metric.clone()));
        view.insert(
            "dataset_graph".to_string(),
            self.dataset_graph.clone().unwrap_or(Value::Null),
        );
        view.insert(
            "dataset_mark".to_string(),
            self.dataset_mark
                .clone()
                .map_or(Value::Null, Value::String),
        );
        view
    }

    /// Dataset-oriented projection used when the search type is `dataset`.
    #[must_use]
    pub fn to_dataset_view(&self) -> Map<String, Value> {
        let mut view = Map::new();
        view.insert(
            "summary_dir".to_string(),
            Value::String(self.summary_dir.clone()),
        );
        view.insert(
            "dataset_graph".to_string(),
            self.dataset_graph.clone().unwrap_or(Value::Null),
        );
        view.insert(
            "dataset_mark".to_string(),
            self.dataset_mark
                .clone()
                .map_or(Value::Null, Value::String),
        );
        view
    }
}
