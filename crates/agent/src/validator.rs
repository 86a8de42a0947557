//! Operator allow-list for generated pipelines.
//!
//! A generated pipeline may only use the aggregation operators the
//! assistant actually needs; anything else (server-side javascript,
//! `$out`, `$merge`, ...) fails validation. The check is a pure
//! function over the pipeline's JSON: callers decide whether to gate
//! execution on it.

use procurechat_core::domain::AggregationPipeline;
use serde_json::{Map, Value};

/// Operators a generated pipeline is allowed to contain.
pub const ALLOWED_OPERATORS: [&str; 10] = [
    "$match",
    "$group",
    "$sort",
    "$limit",
    "$project",
    "$unwind",
    "$lookup",
    "$dateToString",
    "$sum",
    "$avg",
];

/// Expression operators the query-generation prompt instructs the
/// model to use for date handling and range comparisons. Admitted at
/// execution time on top of [`ALLOWED_OPERATORS`]; still outside the
/// strict advisory list.
pub const EXPRESSION_OPERATORS: [&str; 8] = [
    "$dateFromString",
    "$expr",
    "$eq",
    "$ne",
    "$gt",
    "$gte",
    "$lt",
    "$lte",
];

/// Returns true when every `$`-prefixed key anywhere in the pipeline is
/// on the allow-list. Non-mapping stages fail immediately; mappings are
/// walked recursively, including mappings nested inside arrays.
pub fn validate_pipeline(pipeline: &AggregationPipeline) -> bool {
    check_pipeline(pipeline, |key| ALLOWED_OPERATORS.contains(&key))
}

/// Execution gate: the strict allow-list plus the expression operators
/// the schema prompt names, so a date-range pipeline the prompt itself
/// solicits is runnable while `$out`, `$merge`, `$where` and friends
/// stay blocked.
pub fn validate_for_execution(pipeline: &AggregationPipeline) -> bool {
    check_pipeline(pipeline, |key| {
        ALLOWED_OPERATORS.contains(&key) || EXPRESSION_OPERATORS.contains(&key)
    })
}

fn check_pipeline(pipeline: &AggregationPipeline, allowed: impl Fn(&str) -> bool + Copy) -> bool {
    pipeline.stages().iter().all(|stage| match stage {
        Value::Object(map) => check_map(map, allowed),
        _ => false,
    })
}

fn check_map(map: &Map<String, Value>, allowed: impl Fn(&str) -> bool + Copy) -> bool {
    map.iter().all(|(key, value)| {
        if key.starts_with('$') && !allowed(key.as_str()) {
            return false;
        }
        check_value(value, allowed)
    })
}

fn check_value(value: &Value, allowed: impl Fn(&str) -> bool + Copy) -> bool {
    match value {
        Value::Object(map) => check_map(map, allowed),
        Value::Array(items) => items.iter().all(|item| check_value(item, allowed)),
        _ => true,
    }
}
