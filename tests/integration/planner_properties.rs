use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use serde_json::{json, Value};

use reelforge_core::clock::FixedClock;
use reelforge_core::determinism::hashing::{hash_inputs, hash_payload};
use reelforge_core::ids::RevisionId;
use reelforge_core::model::events::ArtefactStatus;
use reelforge_core::model::manifest::Manifest;
use reelforge_core::model::producer_graph::{JobContext, ProducerGraph, ProducerGraphNode};
use reelforge_core::planner::plan;

/// A random-ish linear chain `J0 -> J1 -> ... -> J(n-1)`, each job
/// consuming the previous job's sole artefact and producing its own.
fn chain_graph(len: usize) -> ProducerGraph {
    let mut nodes = BTreeMap::new();
    let mut edges = Vec::new();
    for i in 0..len {
        let inputs: Vec<String> = if i == 0 {
            vec!["Input:Seed".to_string()]
        } else {
            vec![format!("Artifact:A{}", i - 1)]
        };
        let produces = vec![format!("Artifact:A{i}")];
        let job_id = format!("J{i}");
        nodes.insert(
            job_id.clone(),
            ProducerGraphNode {
                job_id: job_id.clone(),
                producer: job_id.clone(),
                inputs: inputs.clone(),
                produces,
                provider: "stub".into(),
                provider_model: "v1".into(),
                rate_key: "default".into(),
                context: JobContext::default(),
            },
        );
        if i > 0 {
            edges.push((format!("J{}", i - 1), job_id));
        }
    }
    ProducerGraph { nodes, edges }
}

proptest! {
    /// Every job in every layer of a planned chain must appear strictly
    /// after the layer containing the job that produces one of its inputs
    /// — layering must never violate the graph's edges, for any chain
    /// length from 1 to 12.
    #[test]
    fn layers_respect_topological_order(len in 1usize..12) {
        let graph = chain_graph(len);
        let manifest = Manifest::empty_at("rev-0000", FixedClock::epoch().now());
        let clock = FixedClock::epoch();
        let result = plan(&manifest, None, &graph, "rev-0001", &[], &[], &clock).unwrap();

        let mut seen: BTreeSet<String> = BTreeSet::new();
        for layer in &result.layers {
            for job in layer {
                for input in &job.inputs {
                    if let Some(producer_job) = graph
                        .nodes
                        .values()
                        .find(|n| n.produces.iter().any(|p| p == input))
                    {
                        if producer_job.job_id != job.job_id {
                            prop_assert!(
                                seen.contains(&producer_job.job_id),
                                "job {} scheduled before its input producer {}",
                                job.job_id,
                                producer_job.job_id
                            );
                        }
                    }
                }
            }
            for job in layer {
                seen.insert(job.job_id.clone());
            }
        }
    }

    /// `nextRevisionId` is strictly monotonic under repeated application,
    /// for any non-negative starting point.
    #[test]
    fn next_revision_id_is_monotonic(start in 0u64..100_000) {
        let rev = RevisionId::from_number(start);
        let next = rev.next();
        prop_assert!(next > rev);
        prop_assert_eq!(next.as_str(), format!("rev-{:04}", start + 1));
    }

    /// Hashing a JSON object is invariant to the order its keys were built
    /// in — `hash_payload` must canonicalize before hashing.
    #[test]
    fn hash_payload_is_key_order_invariant(
        a in any::<u8>(), b in any::<u8>(), c in any::<u8>()
    ) {
        let forward = json!({ "a": a, "b": b, "c": c });
        let mut backward = serde_json::Map::new();
        backward.insert("c".to_string(), json!(c));
        backward.insert("b".to_string(), json!(b));
        backward.insert("a".to_string(), json!(a));
        let backward = Value::Object(backward);

        let h1 = hash_payload(&forward).unwrap();
        let h2 = hash_payload(&backward).unwrap();
        prop_assert_eq!(h1.hash, h2.hash);
    }

    /// `hash_inputs` sorts before hashing, so any permutation of the same
    /// id set hashes identically.
    #[test]
    fn hash_inputs_is_permutation_invariant(mut ids in prop::collection::vec("[a-zA-Z]{1,8}", 1..8)) {
        let original = hash_inputs(&ids).unwrap();
        ids.reverse();
        let reversed = hash_inputs(&ids).unwrap();
        prop_assert_eq!(original, reversed);
    }

    /// Re-running the planner against a manifest that already has every
    /// produced output, with no pending edits, always yields an empty plan
    /// — idempotency of a fully-satisfied run (§8 testable property).
    #[test]
    fn fully_satisfied_manifest_yields_empty_plan(len in 1usize..8) {
        let graph = chain_graph(len);
        let mut manifest = Manifest::empty_at("rev-0001", FixedClock::epoch().now());
        for i in 0..len {
            manifest.artefacts.insert(
                format!("Artifact:A{i}"),
                reelforge_core::model::manifest::ManifestArtefactEntry {
                    hash: format!("h{i}"),
                    blob: None,
                    inline: Some(format!("v{i}")),
                    produced_by: format!("J{i}"),
                    status: ArtefactStatus::Succeeded,
                    diagnostics: None,
                    created_at: "2024-01-01T00:00:00Z".into(),
                },
            );
        }
        let clock = FixedClock::epoch();
        let result = plan(&manifest, None, &graph, "rev-0002", &[], &[], &clock).unwrap();
        let job_count: usize = result.layers.iter().map(Vec::len).sum();
        prop_assert_eq!(job_count, 0);
    }
}
