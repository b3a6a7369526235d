//! Query explain metrics, as printed by `--explain` runs
//!
//! The JSON shape uses PascalCase field names and reports the execution
//! duration as integer nanoseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Planner summary plus execution statistics for one query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExplainMetrics {
    #[serde(default)]
    pub plan_summary: Option<PlanSummary>,
    #[serde(default)]
    pub execution_stats: Option<ExecutionStats>,
}

/// The indexes the planner picked, one property map per index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlanSummary {
    #[serde(default)]
    pub indexes_used: Vec<Option<Map<String, JsonValue>>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecutionStats {
    #[serde(default)]
    pub results_returned: i64,
    /// Nanoseconds.
    #[serde(default)]
    pub execution_duration: Option<u64>,
    #[serde(default)]
    pub read_operations: i64,
    #[serde(default)]
    pub debug_stats: Option<Map<String, JsonValue>>,
}

impl ExecutionStats {
    pub fn duration(&self) -> Option<Duration> {
        self.execution_duration.map(Duration::from_nanos)
    }
}
