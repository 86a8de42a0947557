use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An ordered sequence of aggregation stage descriptors, as generated
/// from natural language. Stages are raw JSON mappings from an operator
/// name to its arguments; the validator decides whether they are safe
/// to run. A pipeline is executed at most once and never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregationPipeline(pub Vec<Value>);

impl AggregationPipeline {
    pub fn stages(&self) -> &[Value] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Value>> for AggregationPipeline {
    fn from(stages: Vec<Value>) -> Self {
        Self(stages)
    }
}
