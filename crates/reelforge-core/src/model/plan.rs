//! The execution plan emitted by the planner and persisted to
//! `runs/<rev>-plan.json` (§3.7, §6.2).

use serde::{Deserialize, Serialize};

use super::producer_graph::JobContext;

/// One job as it appears inside a persisted plan — a serializable snapshot
/// of the `ProducerGraphNode` it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub producer: String,
    pub inputs: Vec<String>,
    pub produces: Vec<String>,
    pub provider: String,
    pub provider_model: String,
    pub rate_key: String,
    pub context: JobContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub revision: String,
    pub manifest_base_hash: Option<String>,
    pub layers: Vec<Vec<Job>>,
    pub created_at: String,
}

impl ExecutionPlan {
    /// All jobs across all layers, in layer order.
    pub fn all_jobs(&self) -> impl Iterator<Item = &Job> {
        self.layers.iter().flatten()
    }
}
