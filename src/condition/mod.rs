//! Filter/sort condition vocabulary and expression semantics
//!
//! A condition is a flat JSON object mapping control keys ([`ConditionKey`])
//! to scalars and field names to expression objects
//! (`{"eq": 0.1, "le": 0.5}`). The vocabularies here are closed: an
//! unrecognized expression kind or field name is a configuration error
//! caught before any record is evaluated, never a silent non-match.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Control keys of a condition, as opposed to field filters.
///
/// `Limit` is the page size, `Offset` the page number, `SortedName` the
/// sort field, `SortedType` the sort direction and `LineageType` the
/// output projection selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKey {
    /// Page size
    Limit,
    /// Page number
    Offset,
    /// Field to sort by
    SortedName,
    /// Sort direction
    SortedType,
    /// Output projection selector
    LineageType,
}

impl ConditionKey {
    /// Parse a condition key name into its vocabulary entry.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "limit" => Some(Self::Limit),
            "offset" => Some(Self::Offset),
            "sorted_name" => Some(Self::SortedName),
            "sorted_type" => Some(Self::SortedType),
            "lineage_type" => Some(Self::LineageType),
            _ => None,
        }
    }

    /// Whether a condition entry is a control key rather than a field filter.
    #[must_use]
    pub fn is_condition_key(name: &str) -> bool {
        Self::parse(name).is_some()
    }
}

/// Comparison kinds usable in field filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    /// Equality
    Eq,
    /// Strictly less than
    Lt,
    /// Strictly greater than
    Gt,
    /// Less than or equal
    Le,
    /// Greater than or equal
    Ge,
    /// Membership in a list of expected values
    In,
}

impl ExpressionKind {
    /// Parse an expression name into its vocabulary entry.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(Self::Eq),
            "lt" => Some(Self::Lt),
            "gt" => Some(Self::Gt),
            "le" => Some(Self::Le),
            "ge" => Some(Self::Ge),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    /// Whether this kind is one of the four ordering comparisons.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Gt | Self::Le | Self::Ge)
    }

    /// Evaluate the expression against a record's actual field value.
    ///
    /// A missing actual value (`None`) can never satisfy an ordering
    /// comparison. `In` tests membership of the actual value in the
    /// expected list; all other kinds apply the binary comparison using
    /// the natural order of same-typed JSON values. Values of different
    /// types never satisfy an ordering comparison.
    #[must_use]
    pub fn is_match(self, expected: &Value, actual: Option<&Value>) -> bool {
        if actual.is_none() && self.is_ordering() {
            return false;
        }
        let actual = actual.unwrap_or(&Value::Null);

        match self {
            Self::In => expected
                .as_array()
                .is_some_and(|list| list.iter().any(|item| values_equal(item, actual))),
            Self::Eq => values_equal(actual, expected),
            Self::Lt => matches!(compare_values(actual, expected), Some(Ordering::Less)),
            Self::Gt => matches!(compare_values(actual, expected), Some(Ordering::Greater)),
            Self::Le => matches!(
                compare_values(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::Ge => matches!(
                compare_values(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
        }
    }
}

/// Sort direction of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Smallest first, nulls first
    #[default]
    Ascending,
    /// Largest first, nulls last
    Descending,
}

/// Lineage search type selecting the output projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineageType {
    /// Dataset-oriented projection
    Dataset,
    /// Full model lineage projection
    #[default]
    Model,
}

/// Filter, sort and pagination condition for a lineage query.
///
/// Wraps the raw JSON object; typed accessors interpret the control keys
/// and [`Condition::field_filters`] yields everything else for the filter
/// engine to validate and evaluate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Condition(Map<String, Value>);

impl Condition {
    /// Create an empty condition (matches every record, no pagination).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Page size; defaults to 10 when pagination applies.
    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.0.get("limit").and_then(Value::as_u64).map(|n| n as usize)
    }

    /// Page number; defaults to 0 when pagination applies.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.0.get("offset").and_then(Value::as_u64).map(|n| n as usize)
    }

    /// Whether the condition carries either pagination key.
    ///
    /// When it carries neither, pagination is a no-op rather than the
    /// default `offset=0, limit=10` window.
    #[must_use]
    pub fn has_pagination(&self) -> bool {
        self.0.contains_key("limit") || self.0.contains_key("offset")
    }

    /// Raw `sorted_name` value, if the condition requests sorting.
    ///
    /// Returned unparsed so a present-but-malformed value (a number, say)
    /// can be rejected as a configuration error rather than silently
    /// skipping the sort.
    #[must_use]
    pub fn sorted_name(&self) -> Option<&Value> {
        self.0.get("sorted_name")
    }

    /// Sort direction; anything other than `"descending"` is ascending.
    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        match self.0.get("sorted_type").and_then(Value::as_str) {
            Some("descending") => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }

    /// Search type; anything other than `"dataset"` is a model search.
    #[must_use]
    pub fn lineage_type(&self) -> LineageType {
        match self.0.get("lineage_type").and_then(Value::as_str) {
            Some("dataset") => LineageType::Dataset,
            _ => LineageType::Model,
        }
    }

    /// Field filter entries: every condition entry that is not a control
    /// key, paired with its raw expression value.
    ///
    /// Expression values are normally objects like `{"eq": 0.1}`; an entry
    /// whose value is not an object carries no expressions and matches
    /// every record.
    pub fn field_filters(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter(|(key, _)| !ConditionKey::is_condition_key(key))
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Insert a raw entry. Mostly useful for building conditions in tests
    /// and hosts without going through JSON.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.0.insert(key.into(), value);
        self
    }
}

impl From<Map<String, Value>> for Condition {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Equality across JSON values with numeric coercion.
///
/// JSON distinguishes `1` from `1.0`; filter semantics do not.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Natural total order of same-typed JSON values.
///
/// Numbers compare numerically, strings lexicographically, booleans with
/// `false < true`. Values of different or unordered types are
/// incomparable and return `None`.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_condition_key_vocabulary() {
        for name in ["limit", "offset", "sorted_name", "sorted_type", "lineage_type"] {
            assert!(ConditionKey::is_condition_key(name), "{name}");
        }
        assert!(!ConditionKey::is_condition_key("learning_rate"));
    }

    #[test]
    fn test_expression_vocabulary() {
        assert_eq!(ExpressionKind::parse("eq"), Some(ExpressionKind::Eq));
        assert_eq!(ExpressionKind::parse("in"), Some(ExpressionKind::In));
        assert_eq!(ExpressionKind::parse("neq"), None);
    }

    #[test]
    fn test_null_never_satisfies_ordering() {
        for kind in [
            ExpressionKind::Lt,
            ExpressionKind::Gt,
            ExpressionKind::Le,
            ExpressionKind::Ge,
        ] {
            assert!(!kind.is_match(&json!(1), None));
        }
    }

    #[test]
    fn test_eq_with_null_actual() {
        // null == null holds; null == 1 does not
        assert!(ExpressionKind::Eq.is_match(&Value::Null, None));
        assert!(!ExpressionKind::Eq.is_match(&json!(1), None));
    }

    #[test]
    fn test_eq_numeric_coercion() {
        assert!(ExpressionKind::Eq.is_match(&json!(1.0), Some(&json!(1))));
        assert!(ExpressionKind::Eq.is_match(&json!("a"), Some(&json!("a"))));
        assert!(!ExpressionKind::Eq.is_match(&json!("1"), Some(&json!(1))));
    }

    #[test]
    fn test_ordering_comparisons() {
        assert!(ExpressionKind::Lt.is_match(&json!(0.5), Some(&json!(0.1))));
        assert!(!ExpressionKind::Lt.is_match(&json!(0.1), Some(&json!(0.5))));
        assert!(ExpressionKind::Ge.is_match(&json!(0.1), Some(&json!(0.1))));
        assert!(ExpressionKind::Gt.is_match(&json!("a"), Some(&json!("b"))));
    }

    #[test]
    fn test_cross_type_ordering_never_matches() {
        assert!(!ExpressionKind::Lt.is_match(&json!(1), Some(&json!("a"))));
        assert!(!ExpressionKind::Ge.is_match(&json!("a"), Some(&json!(1))));
    }

    #[test]
    fn test_membership() {
        let list = json!([0.1, 0.2, 0.3]);
        assert!(ExpressionKind::In.is_match(&list, Some(&json!(0.2))));
        assert!(!ExpressionKind::In.is_match(&list, Some(&json!(0.4))));
        // Missing actual checks membership of null
        assert!(!ExpressionKind::In.is_match(&list, None));
        assert!(ExpressionKind::In.is_match(&json!([null]), None));
        // Expected value must be list-like
        assert!(!ExpressionKind::In.is_match(&json!(0.2), Some(&json!(0.2))));
    }

    #[test]
    fn test_condition_accessors() {
        let condition: Condition = serde_json::from_value(json!({
            "limit": 3,
            "offset": 1,
            "sorted_name": "learning_rate",
            "sorted_type": "descending",
            "lineage_type": "dataset",
            "learning_rate": {"ge": 0.01}
        }))
        .unwrap();

        assert_eq!(condition.limit(), Some(3));
        assert_eq!(condition.offset(), Some(1));
        assert!(condition.has_pagination());
        assert_eq!(condition.sorted_name(), Some(&json!("learning_rate")));
        assert_eq!(condition.sort_order(), SortOrder::Descending);
        assert_eq!(condition.lineage_type(), LineageType::Dataset);

        let filters: Vec<_> = condition.field_filters().collect();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].0, "learning_rate");
    }

    #[test]
    fn test_empty_condition_skips_pagination() {
        let condition = Condition::new();
        assert!(!condition.has_pagination());
        assert_eq!(condition.sort_order(), SortOrder::Ascending);
        assert_eq!(condition.lineage_type(), LineageType::Model);
    }

    #[test]
    fn test_compare_values() {
        assert_eq!(compare_values(&json!(1), &json!(2.0)), Some(Ordering::Less));
        assert_eq!(compare_values(&json!("b"), &json!("a")), Some(Ordering::Greater));
        assert_eq!(compare_values(&json!(true), &json!(true)), Some(Ordering::Equal));
        assert_eq!(compare_values(&json!(1), &json!("1")), None);
        assert_eq!(compare_values(&Value::Null, &Value::Null), None);
    }
}
