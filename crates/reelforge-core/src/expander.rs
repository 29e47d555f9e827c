//! The dimension expander (§4.6): turns a canonical graph plus a map of
//! input values into the fully concrete [`ProducerGraph`] (§3.4).

use std::collections::BTreeMap;

use serde_json::Value;

use crate::errors::CoreResult;
use crate::model::graph::{BlueprintGraph, DimensionSymbol, GraphNode, NodeKind};
use crate::model::producer_graph::{JobContext, ProducerGraph, ProducerGraphNode};

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// The conventional name of the counting input for a root dimension, e.g.
/// `segment` -> `NumOfSegments`. Used when no explicit override is given in
/// `dimension_counters`.
fn conventional_counter_name(raw: &str) -> String {
    let plural = if raw.ends_with('s') {
        raw.to_string()
    } else {
        format!("{raw}s")
    };
    format!("NumOf{}", capitalize(&plural))
}

fn find_input_node_by_name<'a>(graph: &'a BlueprintGraph, name: &str) -> Option<&'a GraphNode> {
    graph
        .nodes
        .values()
        .find(|n| n.kind == NodeKind::InputSource && n.name == name)
}

fn read_count(value: &Value) -> Option<usize> {
    value.as_u64().map(|n| n as usize)
}

/// Resolve every dimension's cardinality. `dimension_counters` lets a
/// caller override the naming convention with an explicit `countInput`
/// declared on an artefact spec (§3.2); entries not present fall back to
/// `NumOf<Plural>`.
fn resolve_cardinalities(
    graph: &BlueprintGraph,
    input_values: &BTreeMap<String, Value>,
    dimension_counters: &BTreeMap<String, String>,
) -> CoreResult<BTreeMap<String, usize>> {
    let mut cardinalities: BTreeMap<String, usize> = BTreeMap::new();
    let all_syms: BTreeMap<String, DimensionSymbol> = graph
        .nodes
        .values()
        .flat_map(|n| n.dimensions.iter().cloned())
        .map(|s| (s.qualified(), s))
        .collect();

    let root_cardinality = |sym: &DimensionSymbol| -> usize {
        if let Some(input_id) = dimension_counters.get(&sym.qualified()) {
            if let Some(v) = input_values.get(input_id).and_then(read_count) {
                return v;
            }
        }
        let candidate = conventional_counter_name(&sym.raw);
        if let Some(node) = find_input_node_by_name(graph, &candidate) {
            let canonical = node.canonical_base_id();
            if let Some(v) = input_values.get(&canonical).and_then(read_count) {
                return v;
            }
        }
        1
    };

    let mut remaining: Vec<String> = graph.dimension_lineage.keys().cloned().collect();
    let max_passes = remaining.len() + 1;
    for _ in 0..max_passes {
        if remaining.is_empty() {
            break;
        }
        let mut still_remaining = Vec::new();
        for qualified in remaining {
            if cardinalities.contains_key(&qualified) {
                continue;
            }
            let parent = graph.dimension_lineage.get(&qualified).cloned().flatten();
            match parent {
                None => {
                    let sym = all_syms
                        .get(&qualified)
                        .cloned()
                        .unwrap_or_else(|| DimensionSymbol::new("", 0, qualified.clone()));
                    cardinalities.insert(qualified, root_cardinality(&sym));
                }
                Some(p) => {
                    if let Some(&c) = cardinalities.get(&p) {
                        cardinalities.insert(qualified, c);
                    } else {
                        still_remaining.push(qualified);
                    }
                }
            }
        }
        remaining = still_remaining;
    }
    // Anything left has an unresolved or cyclic parent chain; default to 1
    // rather than fail the whole expansion over a single stray dimension.
    for qualified in remaining {
        cardinalities.insert(qualified, 1);
    }
    Ok(cardinalities)
}

fn cartesian_coords(sizes: &[usize]) -> Vec<Vec<usize>> {
    if sizes.is_empty() {
        return vec![vec![]];
    }
    let mut out = vec![vec![]];
    for &size in sizes {
        let mut next = Vec::with_capacity(out.len() * size.max(1));
        for coord in &out {
            for i in 0..size.max(1) {
                let mut c = coord.clone();
                c.push(i);
                next.push(c);
            }
        }
        out = next;
    }
    out
}

fn instance_suffix(dims: &[DimensionSymbol], coord: &[usize]) -> String {
    dims.iter()
        .zip(coord.iter())
        .map(|(d, i)| format!("{}={}", d.raw, i))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Debug, Clone)]
struct NodeInstance {
    coord: Vec<usize>,
    canonical_id: String,
}

fn build_instances(
    graph: &BlueprintGraph,
    cardinalities: &BTreeMap<String, usize>,
) -> BTreeMap<String, Vec<NodeInstance>> {
    let mut instances = BTreeMap::new();
    for node in graph.nodes.values() {
        let sizes: Vec<usize> = node
            .dimensions
            .iter()
            .map(|d| *cardinalities.get(&d.qualified()).unwrap_or(&1))
            .collect();
        let coords = cartesian_coords(&sizes);
        let base = node.canonical_base_id();
        let node_instances = coords
            .into_iter()
            .map(|coord| {
                let canonical_id = if node.dimensions.is_empty() {
                    base.clone()
                } else {
                    format!("{base}[{}]", instance_suffix(&node.dimensions, &coord))
                };
                NodeInstance { coord, canonical_id }
            })
            .collect();
        instances.insert(node.id.clone(), node_instances);
    }
    instances
}

/// Find every instance of `node_id` whose coordinate agrees with `coord` on
/// their first `common_len` positions.
fn matching_instances<'a>(
    instances: &'a BTreeMap<String, Vec<NodeInstance>>,
    node_id: &str,
    coord: &[usize],
    common_len: usize,
) -> Vec<&'a NodeInstance> {
    instances
        .get(node_id)
        .into_iter()
        .flatten()
        .filter(|inst| inst.coord[..common_len.min(inst.coord.len())] == coord[..common_len.min(coord.len())])
        .collect()
}

/// Expand the canonical graph into a concrete producer graph, using
/// `input_values` to size every dimension and `dimension_counters` to
/// override the `NumOf<Plural>` naming convention where a blueprint
/// declares an explicit `countInput` (§3.2).
pub fn expand(
    graph: &BlueprintGraph,
    input_values: &BTreeMap<String, Value>,
    dimension_counters: &BTreeMap<String, String>,
) -> CoreResult<ProducerGraph> {
    let cardinalities = resolve_cardinalities(graph, input_values, dimension_counters)?;
    let instances = build_instances(graph, &cardinalities);

    let mut nodes = BTreeMap::new();
    let mut edges = Vec::new();

    for node in graph.nodes.values().filter(|n| n.kind == NodeKind::Producer) {
        let node_instances = instances.get(&node.id).cloned().unwrap_or_default();
        for inst in &node_instances {
            let job_id = if node.dimensions.is_empty() {
                node.id.clone()
            } else {
                format!("{}[{}]", node.id, instance_suffix(&node.dimensions, &inst.coord))
            };

            let mut inputs = Vec::new();
            for edge in graph.edges.iter().filter(|e| e.to.node_id == node.id) {
                let common_len = edge.from.dimensions.len().min(edge.to.dimensions.len());
                for src in matching_instances(&instances, &edge.from.node_id, &inst.coord, common_len) {
                    inputs.push(src.canonical_id.clone());
                }
            }

            let mut produces = Vec::new();
            for edge in graph.edges.iter().filter(|e| e.from.node_id == node.id) {
                let common_len = edge.from.dimensions.len().min(edge.to.dimensions.len());
                for dst in matching_instances(&instances, &edge.to.node_id, &inst.coord, common_len) {
                    produces.push(dst.canonical_id.clone());
                }
            }
            produces.sort();
            produces.dedup();

            // Collectors (§4.6): fold every "from" instance matching this
            // instance's coordinate on the shared prefix into a single
            // ordered list, bound under the collector's name. Source
            // instances are ordered by their folded-dimension coordinate —
            // the structural proxy for `orderBy`, since the expander has no
            // access to resolved artefact content to order by at this
            // stage.
            let mut collector_bindings: BTreeMap<String, Vec<String>> = BTreeMap::new();
            let collectors_into_this_node = node.fan_in
                .then(|| graph.collectors.iter().filter(|c| c.into.node_id == node.id))
                .into_iter()
                .flatten();
            for collector in collectors_into_this_node {
                let common_len = collector.from.dimensions.len().min(collector.into.dimensions.len());
                let mut matches = matching_instances(&instances, &collector.from.node_id, &inst.coord, common_len);
                matches.sort_by(|a, b| a.coord[common_len..].cmp(&b.coord[common_len..]));
                let ids: Vec<String> = matches.into_iter().map(|m| m.canonical_id.clone()).collect();
                for id in &ids {
                    inputs.push(id.clone());
                }
                collector_bindings.insert(collector.name.clone(), ids);
            }
            inputs.sort();
            inputs.dedup();

            for from_id in &inputs {
                if let Some(src_job) = producer_job_id_for_canonical(graph, &instances, from_id) {
                    edges.push((src_job, job_id.clone()));
                }
            }

            let mut indices = BTreeMap::new();
            for (d, i) in node.dimensions.iter().zip(inst.coord.iter()) {
                indices.insert(d.raw.clone(), *i);
            }

            let context = JobContext {
                namespace_path: node.namespace_path.clone(),
                indices,
                qualified_name: job_id.clone(),
                input_bindings: BTreeMap::new(),
                collector_bindings,
            };

            let rate_key = format!(
                "{}:{}",
                node.provider.clone().unwrap_or_default(),
                node.provider_model.clone().unwrap_or_default()
            );

            nodes.insert(
                job_id.clone(),
                ProducerGraphNode {
                    job_id,
                    producer: node.name.clone(),
                    inputs,
                    produces,
                    provider: node.provider.clone().unwrap_or_default(),
                    provider_model: node.provider_model.clone().unwrap_or_default(),
                    rate_key,
                    context,
                },
            );
        }
    }

    edges.sort();
    edges.dedup();
    Ok(ProducerGraph { nodes, edges })
}

/// Given a canonical artefact id, find the job id of the producer instance
/// whose `produces` would include it — used to wire producer-to-producer
/// edges transitively through artefact nodes.
fn producer_job_id_for_canonical(
    graph: &BlueprintGraph,
    instances: &BTreeMap<String, Vec<NodeInstance>>,
    canonical_id: &str,
) -> Option<String> {
    if !canonical_id.starts_with("Artifact:") {
        return None;
    }
    let artefact_node = graph
        .nodes
        .values()
        .find(|n| n.kind == NodeKind::Artifact && instances.get(&n.id).into_iter().flatten().any(|i| i.canonical_id == canonical_id))?;
    let inst = instances
        .get(&artefact_node.id)?
        .iter()
        .find(|i| i.canonical_id == canonical_id)?;
    let incoming = graph.edges.iter().find(|e| e.to.node_id == artefact_node.id)?;
    let common_len = incoming.from.dimensions.len().min(incoming.to.dimensions.len());
    let producer_node = graph.nodes.get(&incoming.from.node_id)?;
    if producer_node.kind != NodeKind::Producer {
        return None;
    }
    let src_inst = matching_instances(instances, &incoming.from.node_id, &inst.coord, common_len)
        .into_iter()
        .next()?;
    Some(if producer_node.dimensions.is_empty() {
        producer_node.id.clone()
    } else {
        format!(
            "{}[{}]",
            producer_node.id,
            instance_suffix(&producer_node.dimensions, &src_inst.coord)
        )
    })
}
