//! Field vocabularies for run records
//!
//! Two closed vocabularies govern what callers may reference:
//! [`LineageField`] names the flat fields usable in filter and sort
//! conditions (plus the open-ended `metric_<name>` family), and
//! [`FilterKey`] names the lineage sections selectable in summary lookups.

/// Prefix marking open-ended metric fields (`metric_accuracy` etc.).
pub const METRIC_PREFIX: &str = "metric_";

/// A filterable/sortable field of a run record.
///
/// The fixed variants map one-to-one onto scalar entries of the lineage
/// sections; `Metric` carries the metric name parsed from a
/// `metric_`-prefixed field. [`LineageField::parse`] is the recognizer: a
/// name it rejects is a query-construction error, not a non-match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineageField {
    /// Run directory, the record's lookup key
    SummaryDir,
    /// `hyper_parameters.loss_function`
    LossFunction,
    /// `train_dataset.train_dataset_path`
    TrainDatasetPath,
    /// `train_dataset.train_dataset_size`
    TrainDatasetCount,
    /// `valid_dataset.valid_dataset_path`
    TestDatasetPath,
    /// `valid_dataset.valid_dataset_size`
    TestDatasetCount,
    /// `algorithm.network`
    Network,
    /// `hyper_parameters.optimizer`
    Optimizer,
    /// `hyper_parameters.learning_rate`
    LearningRate,
    /// `hyper_parameters.epoch`
    Epoch,
    /// `hyper_parameters.batch_size`
    BatchSize,
    /// `hyper_parameters.device_num`
    DeviceNum,
    /// `model.loss`
    Loss,
    /// `model.size`
    ModelSize,
    /// Group tag assigned by dataset-mark grouping
    DatasetMark,
    /// Named metric from the evaluation section
    Metric(String),
}

impl LineageField {
    /// Parse a condition field name into its vocabulary entry.
    ///
    /// Returns `None` for unrecognized names; callers convert that into a
    /// configuration error before any record is evaluated.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(metric_name) = name.strip_prefix(METRIC_PREFIX) {
            return Some(Self::Metric(metric_name.to_string()));
        }
        match name {
            "summary_dir" => Some(Self::SummaryDir),
            "loss_function" => Some(Self::LossFunction),
            "train_dataset_path" => Some(Self::TrainDatasetPath),
            "train_dataset_count" => Some(Self::TrainDatasetCount),
            "test_dataset_path" => Some(Self::TestDatasetPath),
            "test_dataset_count" => Some(Self::TestDatasetCount),
            "network" => Some(Self::Network),
            "optimizer" => Some(Self::Optimizer),
            "learning_rate" => Some(Self::LearningRate),
            "epoch" => Some(Self::Epoch),
            "batch_size" => Some(Self::BatchSize),
            "device_num" => Some(Self::DeviceNum),
            "loss" => Some(Self::Loss),
            "model_size" => Some(Self::ModelSize),
            "dataset_mark" => Some(Self::DatasetMark),
            _ => None,
        }
    }

    /// Whether a condition field name is part of the vocabulary.
    #[must_use]
    pub fn is_supported(name: &str) -> bool {
        Self::parse(name).is_some()
    }

    /// The fixed scalar fields, in filtration view order.
    pub const SCALAR_FIELDS: &'static [(&'static str, Self)] = &[
            ("summary_dir", Self::SummaryDir),
            ("loss_function", Self::LossFunction),
            ("train_dataset_path", Self::TrainDatasetPath),
            ("train_dataset_count", Self::TrainDatasetCount),
            ("test_dataset_path", Self::TestDatasetPath),
            ("test_dataset_count", Self::TestDatasetCount),
            ("network", Self::Network),
            ("optimizer", Self::Optimizer),
            ("learning_rate", Self::LearningRate),
            ("epoch", Self::Epoch),
            ("batch_size", Self::BatchSize),
            ("device_num", Self::DeviceNum),
            ("loss", Self::Loss),
            ("model_size", Self::ModelSize),
        ];
}

/// A lineage section selectable in summary lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
    /// Evaluation metrics
    Metric,
    /// Training hyper parameters
    HyperParameters,
    /// Algorithm description
    Algorithm,
    /// Training dataset description
    TrainDataset,
    /// Validation dataset description
    ValidDataset,
    /// Model description
    Model,
    /// Dataset processing graph
    DatasetGraph,
}

impl FilterKey {
    /// Parse a filter key name into its vocabulary entry.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "metric" => Some(Self::Metric),
            "hyper_parameters" => Some(Self::HyperParameters),
            "algorithm" => Some(Self::Algorithm),
            "train_dataset" => Some(Self::TrainDataset),
            "valid_dataset" => Some(Self::ValidDataset),
            "model" => Some(Self::Model),
            "dataset_graph" => Some(Self::DatasetGraph),
            _ => None,
        }
    }

    /// Every filter key, in summary output order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Metric,
            Self::HyperParameters,
            Self::Algorithm,
            Self::TrainDataset,
            Self::ValidDataset,
            Self::Model,
            Self::DatasetGraph,
        ]
    }

    /// The key's wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::HyperParameters => "hyper_parameters",
            Self::Algorithm => "algorithm",
            Self::TrainDataset => "train_dataset",
            Self::ValidDataset => "valid_dataset",
            Self::Model => "model",
            Self::DatasetGraph => "dataset_graph",
        }
    }
}
