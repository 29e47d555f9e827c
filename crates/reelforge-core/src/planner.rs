//! The incremental planner (§4.7): diffs pending edits and out-of-band
//! artefact changes against the current manifest, propagates dirtiness
//! across the producer graph, and layers the dirty subgraph via Kahn's
//! algorithm for per-layer concurrent execution.

use std::collections::{BTreeMap, BTreeSet};

use crate::clock::Clock;
use crate::determinism::hashing::hash_artefact_output;
use crate::errors::{CoreError, CoreResult};
use crate::model::events::{ArtefactEvent, ArtefactStatus, InputEvent};
use crate::model::manifest::Manifest;
use crate::model::plan::{ExecutionPlan, Job};
use crate::model::producer_graph::ProducerGraph;

/// A deterministic, full topological order over every node in `graph`, with
/// ties broken by `jobId` (§4.7 step 4's "stable sorting ... recommended",
/// applied here to the whole-graph pass too). Returns [`CoreError::cycle`]
/// naming every node that could not be ordered.
fn topological_order(graph: &ProducerGraph) -> CoreResult<Vec<String>> {
    let mut indegree: BTreeMap<String, usize> = graph.nodes.keys().map(|id| (id.clone(), 0)).collect();
    for (_, to) in &graph.edges {
        *indegree.entry(to.clone()).or_insert(0) += 1;
    }
    let mut frontier: BTreeSet<String> = indegree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(id, _)| id.clone())
        .collect();

    let mut order = Vec::with_capacity(graph.nodes.len());
    while let Some(next) = frontier.iter().next().cloned() {
        frontier.remove(&next);
        order.push(next.clone());
        for succ in graph.successors(&next) {
            let succ = succ.to_string();
            if let Some(deg) = indegree.get_mut(&succ) {
                *deg -= 1;
                if *deg == 0 {
                    frontier.insert(succ);
                }
            }
        }
    }

    if order.len() != graph.nodes.len() {
        let ordered: BTreeSet<&String> = order.iter().collect();
        let participants: Vec<String> = graph
            .nodes
            .keys()
            .filter(|id| !ordered.contains(id))
            .cloned()
            .collect();
        return Err(CoreError::cycle(participants));
    }
    Ok(order)
}

/// Layer a subset of `graph`'s nodes via Kahn's algorithm restricted to the
/// induced subgraph (only edges whose both endpoints are in `dirty`
/// count). Grounded in the same level-by-level construction used by the
/// runner's per-layer concurrency.
fn layer_dirty_subgraph(graph: &ProducerGraph, dirty: &BTreeSet<String>) -> CoreResult<Vec<Vec<String>>> {
    let mut indegree: BTreeMap<String, usize> = dirty.iter().map(|id| (id.clone(), 0)).collect();
    for (from, to) in &graph.edges {
        if dirty.contains(from) && dirty.contains(to) {
            *indegree.entry(to.clone()).or_insert(0) += 1;
        }
    }

    let mut remaining: BTreeSet<String> = dirty.clone();
    let mut layers = Vec::new();
    while !remaining.is_empty() {
        let layer: Vec<String> = remaining
            .iter()
            .filter(|id| indegree.get(*id).copied().unwrap_or(0) == 0)
            .cloned()
            .collect();
        if layer.is_empty() {
            let participants: Vec<String> = remaining.into_iter().collect();
            return Err(CoreError::cycle(participants));
        }
        for id in &layer {
            remaining.remove(id);
            for succ in graph.successors(id) {
                if let Some(deg) = indegree.get_mut(succ) {
                    *deg -= 1;
                }
            }
        }
        layers.push(layer);
    }
    Ok(layers)
}

fn job_from_node(graph: &ProducerGraph, job_id: &str) -> Job {
    let node = &graph.nodes[job_id];
    Job {
        job_id: node.job_id.clone(),
        producer: node.producer.clone(),
        inputs: node.inputs.clone(),
        produces: node.produces.clone(),
        provider: node.provider.clone(),
        provider_model: node.provider_model.clone(),
        rate_key: node.rate_key.clone(),
        context: node.context.clone(),
    }
}

/// Run the planner (§4.7). `artefact_events_since_manifest` must already be
/// filtered to `revision > manifest.revision` and in file (chronological)
/// order — the caller streams these from the event log.
pub fn plan(
    manifest: &Manifest,
    manifest_hash: Option<&str>,
    graph: &ProducerGraph,
    target_revision: &str,
    pending_edits: &[InputEvent],
    artefact_events_since_manifest: &[ArtefactEvent],
    clock: &dyn Clock,
) -> CoreResult<ExecutionPlan> {
    // Step 1: input diff.
    let mut changed: BTreeSet<String> = BTreeSet::new();
    for edit in pending_edits {
        let differs = manifest
            .inputs
            .get(&edit.id)
            .map(|entry| entry.hash != edit.hash)
            .unwrap_or(true);
        if differs {
            changed.insert(edit.id.clone());
        }
    }

    // Step 2: artefact diff (out-of-band edits), keeping the latest
    // succeeded hash per id in stream order.
    let mut latest_succeeded_hash: BTreeMap<String, String> = BTreeMap::new();
    for ev in artefact_events_since_manifest {
        if ev.status != ArtefactStatus::Succeeded {
            continue;
        }
        let digest = hash_artefact_output(&ev.output)?;
        latest_succeeded_hash.insert(ev.artefact_id.clone(), digest.hash);
    }
    for (aid, hash) in &latest_succeeded_hash {
        let differs = manifest
            .artefacts
            .get(aid)
            .map(|entry| &entry.hash != hash)
            .unwrap_or(true);
        if differs {
            changed.insert(aid.clone());
        }
    }

    // Step 3: dirty propagation over a full topological order. An
    // out-of-band artefact edit (already folded into `changed` by step 2)
    // must dirty that artefact's *consumers*, never its own producer (§4.7
    // edge case ii: "the producer itself is not re-run") — so a job is
    // never dirtied just because one of its own `produces` is in `changed`,
    // only because one of its `inputs` is.
    let order = topological_order(graph)?;
    let mut dirty: BTreeSet<String> = BTreeSet::new();
    for job_id in &order {
        let node = &graph.nodes[job_id];
        let inputs_dirty = node.inputs.iter().any(|id| changed.contains(id) || dirty.contains(id));
        let missing_output = node
            .produces
            .iter()
            .any(|aid| !manifest.artefacts.contains_key(aid));
        if inputs_dirty || missing_output {
            dirty.insert(job_id.clone());
            for aid in &node.produces {
                changed.insert(aid.clone());
            }
        }
    }

    // Step 4 + 5: layer the dirty subgraph, detecting cycles.
    let layers_ids = layer_dirty_subgraph(graph, &dirty)?;
    let layers: Vec<Vec<Job>> = layers_ids
        .into_iter()
        .map(|layer| {
            let mut jobs: Vec<Job> = layer.iter().map(|id| job_from_node(graph, id)).collect();
            jobs.sort_by(|a, b| a.job_id.cmp(&b.job_id));
            jobs
        })
        .collect();

    Ok(ExecutionPlan {
        revision: target_revision.to_string(),
        manifest_base_hash: manifest_hash.map(str::to_string),
        layers,
        created_at: clock.now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::model::events::{ArtefactOutput, EditedBy, MANUAL_EDIT_INPUTS_HASH};
    use crate::model::manifest::{Manifest, ManifestArtefactEntry, ManifestInputEntry};
    use crate::model::producer_graph::{JobContext, ProducerGraphNode};
    use serde_json::json;

    fn node(job_id: &str, inputs: &[&str], produces: &[&str]) -> ProducerGraphNode {
        ProducerGraphNode {
            job_id: job_id.to_string(),
            producer: job_id.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            produces: produces.iter().map(|s| s.to_string()).collect(),
            provider: "stub".into(),
            provider_model: "v1".into(),
            rate_key: "stub:v1".into(),
            context: JobContext::default(),
        }
    }

    fn linear_graph() -> ProducerGraph {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "ScriptProducer".to_string(),
            node("ScriptProducer", &["Input:InquiryPrompt"], &["Artifact:NarrationScript"]),
        );
        nodes.insert(
            "AudioProducer".to_string(),
            node("AudioProducer", &["Artifact:NarrationScript"], &["Artifact:Audio"]),
        );
        ProducerGraph {
            nodes,
            edges: vec![("ScriptProducer".to_string(), "AudioProducer".to_string())],
        }
    }

    fn empty_manifest() -> Manifest {
        Manifest::empty_at("rev-0000", "2024-01-01T00:00:00Z")
    }

    #[test]
    fn initial_run_dirties_everything() {
        let graph = linear_graph();
        let manifest = empty_manifest();
        let edit = InputEvent {
            id: "Input:InquiryPrompt".into(),
            revision: "rev-0001".into(),
            hash: "h1".into(),
            payload: json!("hello"),
            edited_by: EditedBy::User,
            created_at: "2024-01-01T00:00:00Z".into(),
        };
        let clock = FixedClock::epoch();
        let result = plan(&manifest, None, &graph, "rev-0001", &[edit], &[], &clock).unwrap();
        assert_eq!(result.layers.len(), 2);
        assert_eq!(result.layers[0][0].job_id, "ScriptProducer");
        assert_eq!(result.layers[1][0].job_id, "AudioProducer");
    }

    #[test]
    fn unchanged_inputs_produce_empty_plan() {
        let graph = linear_graph();
        let mut manifest = empty_manifest();
        manifest.inputs.insert(
            "Input:InquiryPrompt".to_string(),
            ManifestInputEntry {
                hash: "h1".into(),
                payload_digest: "h1".into(),
                created_at: "2024-01-01T00:00:00Z".into(),
            },
        );
        manifest.artefacts.insert(
            "Artifact:NarrationScript".to_string(),
            ManifestArtefactEntry {
                hash: "sh".into(),
                blob: None,
                inline: Some("script".into()),
                produced_by: "ScriptProducer".into(),
                status: ArtefactStatus::Succeeded,
                diagnostics: None,
                created_at: "2024-01-01T00:00:00Z".into(),
            },
        );
        manifest.artefacts.insert(
            "Artifact:Audio".to_string(),
            ManifestArtefactEntry {
                hash: "ah".into(),
                blob: None,
                inline: Some("audio".into()),
                produced_by: "AudioProducer".into(),
                status: ArtefactStatus::Succeeded,
                diagnostics: None,
                created_at: "2024-01-01T00:00:00Z".into(),
            },
        );
        let clock = FixedClock::epoch();
        let result = plan(&manifest, Some("ptrhash"), &graph, "rev-0002", &[], &[], &clock).unwrap();
        assert!(result.layers.is_empty());
    }

    #[test]
    fn targeted_config_change_skips_upstream() {
        let graph = linear_graph();
        let mut manifest = empty_manifest();
        manifest.inputs.insert(
            "Input:InquiryPrompt".to_string(),
            ManifestInputEntry {
                hash: "h1".into(),
                payload_digest: "h1".into(),
                created_at: "2024-01-01T00:00:00Z".into(),
            },
        );
        manifest.artefacts.insert(
            "Artifact:NarrationScript".to_string(),
            ManifestArtefactEntry {
                hash: "sh".into(),
                blob: None,
                inline: Some("script".into()),
                produced_by: "ScriptProducer".into(),
                status: ArtefactStatus::Succeeded,
                diagnostics: None,
                created_at: "2024-01-01T00:00:00Z".into(),
            },
        );
        // No Audio entry yet: AudioProducer has never succeeded.
        let clock = FixedClock::epoch();
        let result = plan(&manifest, None, &graph, "rev-0002", &[], &[], &clock).unwrap();
        assert_eq!(result.layers.len(), 1);
        assert_eq!(result.layers[0][0].job_id, "AudioProducer");
    }

    #[test]
    fn out_of_band_artefact_edit_dirties_consumer_not_producer() {
        let graph = linear_graph();
        let mut manifest = empty_manifest();
        manifest.inputs.insert(
            "Input:InquiryPrompt".to_string(),
            ManifestInputEntry {
                hash: "h1".into(),
                payload_digest: "h1".into(),
                created_at: "2024-01-01T00:00:00Z".into(),
            },
        );
        manifest.artefacts.insert(
            "Artifact:NarrationScript".to_string(),
            ManifestArtefactEntry {
                hash: "sh".into(),
                blob: None,
                inline: Some("script".into()),
                produced_by: "ScriptProducer".into(),
                status: ArtefactStatus::Succeeded,
                diagnostics: None,
                created_at: "2024-01-01T00:00:00Z".into(),
            },
        );
        manifest.artefacts.insert(
            "Artifact:Audio".to_string(),
            ManifestArtefactEntry {
                hash: "ah".into(),
                blob: None,
                inline: Some("audio".into()),
                produced_by: "AudioProducer".into(),
                status: ArtefactStatus::Succeeded,
                diagnostics: None,
                created_at: "2024-01-01T00:00:00Z".into(),
            },
        );
        let manual_edit = ArtefactEvent {
            artefact_id: "Artifact:NarrationScript".into(),
            revision: "rev-0002".into(),
            inputs_hash: MANUAL_EDIT_INPUTS_HASH.into(),
            output: ArtefactOutput { blob: None, inline: Some("hand-edited narration".into()) },
            status: ArtefactStatus::Succeeded,
            produced_by: "manual".into(),
            diagnostics: None,
            created_at: "2024-01-02T00:00:00Z".into(),
        };
        let clock = FixedClock::epoch();
        let result = plan(&manifest, Some("ptrhash"), &graph, "rev-0002", &[], &[manual_edit], &clock).unwrap();

        let ids: Vec<&str> = result.layers.iter().flatten().map(|j| j.job_id.as_str()).collect();
        assert_eq!(ids, vec!["AudioProducer"], "only the consumer reruns, never the edited artefact's own producer");
    }

    #[test]
    fn out_of_band_edit_with_no_consumer_yields_empty_plan() {
        // A leaf artefact manually edited with no downstream job at all:
        // nothing should run, since there is no producer to dirty and no
        // consumer to propagate to.
        let mut nodes = BTreeMap::new();
        nodes.insert(
            "ScriptProducer".to_string(),
            node("ScriptProducer", &["Input:InquiryPrompt"], &["Artifact:NarrationScript"]),
        );
        let graph = ProducerGraph { nodes, edges: vec![] };
        let mut manifest = empty_manifest();
        manifest.inputs.insert(
            "Input:InquiryPrompt".to_string(),
            ManifestInputEntry {
                hash: "h1".into(),
                payload_digest: "h1".into(),
                created_at: "2024-01-01T00:00:00Z".into(),
            },
        );
        manifest.artefacts.insert(
            "Artifact:NarrationScript".to_string(),
            ManifestArtefactEntry {
                hash: "sh".into(),
                blob: None,
                inline: Some("script".into()),
                produced_by: "ScriptProducer".into(),
                status: ArtefactStatus::Succeeded,
                diagnostics: None,
                created_at: "2024-01-01T00:00:00Z".into(),
            },
        );
        let manual_edit = ArtefactEvent {
            artefact_id: "Artifact:NarrationScript".into(),
            revision: "rev-0002".into(),
            inputs_hash: MANUAL_EDIT_INPUTS_HASH.into(),
            output: ArtefactOutput { blob: None, inline: Some("hand-edited narration".into()) },
            status: ArtefactStatus::Succeeded,
            produced_by: "manual".into(),
            diagnostics: None,
            created_at: "2024-01-02T00:00:00Z".into(),
        };
        let clock = FixedClock::epoch();
        let result = plan(&manifest, Some("ptrhash"), &graph, "rev-0002", &[], &[manual_edit], &clock).unwrap();
        assert!(result.layers.is_empty());
    }

    #[test]
    fn cyclic_graph_is_rejected() {
        let mut nodes = BTreeMap::new();
        nodes.insert("A".to_string(), node("A", &["Artifact:B"], &["Artifact:A"]));
        nodes.insert("B".to_string(), node("B", &["Artifact:A"], &["Artifact:B"]));
        let graph = ProducerGraph {
            nodes,
            edges: vec![("A".to_string(), "B".to_string()), ("B".to_string(), "A".to_string())],
        };
        let manifest = empty_manifest();
        let clock = FixedClock::epoch();
        assert!(plan(&manifest, None, &graph, "rev-0001", &[], &[], &clock).is_err());
    }
}
