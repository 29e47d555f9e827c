//! The fully concrete producer graph emitted by the dimension expander
//! (§3.4, §4.6) — every node here is one cartesian instance, ready for the
//! planner and runner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A concrete job identifier, unique within a single producer graph.
pub type JobId = String;

/// The instance context carried alongside a job: where it sits in the
/// namespace tree and which dimension coordinates it was expanded at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobContext {
    pub namespace_path: String,
    /// Raw dimension name -> concrete index, for this instance.
    pub indices: BTreeMap<String, usize>,
    pub qualified_name: String,
    /// Producer-local input name -> the canonical id actually bound to it
    /// for this instance (after dimension projection/broadcast).
    pub input_bindings: BTreeMap<String, String>,
    /// Collector name -> the ordered list of canonical ids folded into it
    /// for this instance (§4.6's "ordered list … grouped by groupBy into a
    /// single target input value"). Empty for jobs with no collector edge.
    #[serde(default)]
    pub collector_bindings: BTreeMap<String, Vec<String>>,
}

/// One concrete producer invocation: the unit of work the planner schedules
/// and the runner executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerGraphNode {
    pub job_id: JobId,
    pub producer: String,
    pub inputs: Vec<String>,
    pub produces: Vec<String>,
    pub provider: String,
    pub provider_model: String,
    pub rate_key: String,
    pub context: JobContext,
}

/// The expanded, concrete producer graph: nodes keyed by `jobId` plus a
/// `(from, to)` edge list for topological ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerGraph {
    pub nodes: BTreeMap<JobId, ProducerGraphNode>,
    pub edges: Vec<(JobId, JobId)>,
}

impl ProducerGraph {
    pub fn node(&self, id: &str) -> Option<&ProducerGraphNode> {
        self.nodes.get(id)
    }

    /// Predecessors of `job`, derived from the edge list.
    pub fn predecessors(&self, job: &str) -> impl Iterator<Item = &str> {
        self.edges
            .iter()
            .filter(move |(_, to)| to == job)
            .map(|(from, _)| from.as_str())
    }

    /// Successors of `job`, derived from the edge list.
    pub fn successors(&self, job: &str) -> impl Iterator<Item = &str> {
        self.edges
            .iter()
            .filter(move |(from, _)| from == job)
            .map(|(_, to)| to.as_str())
    }
}
