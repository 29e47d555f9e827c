//! The canonical graph builder (§4.5): flattens a resolved blueprint tree
//! into a [`BlueprintGraph`] of nodes, edges, collectors, and dimension
//! lineage. No I/O — the caller has already resolved every sub-blueprint
//! reference into a [`ResolvedBlueprint`].

use std::collections::BTreeMap;

use crate::errors::{CoreError, CoreResult};
use crate::model::blueprint::{BlueprintDoc, NodeRef, ResolvedBlueprint};
use crate::model::graph::{
    BlueprintGraph, DimensionSymbol, EdgeEndpoint, GraphCollector, GraphEdge, GraphNode, NodeKind,
};

/// Split a dotted endpoint reference into its path segments, each parsed
/// for its own bracketed dimension list, e.g. `Narrative[segment].Script`
/// splits into `[{name: Narrative, dims: [segment]}, {name: Script, dims:
/// []}]`. At most two segments are supported: a bare local reference, or a
/// one-hop reference into a direct sub-blueprint.
fn parse_endpoint_path(raw: &str) -> CoreResult<Vec<NodeRef>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let chars: Vec<char> = raw.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                segments.push(NodeRef::parse(&raw[start..i])?);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(NodeRef::parse(&raw[start..])?);
    if segments.len() > 2 {
        return Err(CoreError::graph(format!(
            "endpoint reference nests more than one sub-blueprint hop: {raw}"
        )));
    }
    Ok(segments)
}

/// Merge a newly-observed dimension sequence into a registry keyed by
/// scope, accepting any sequence that is a prefix (in either direction) of
/// what is already registered, and keeping the longer of the two as
/// canonical. Anything else is a fatal conflict (§4.5 step 1).
fn merge_dims(
    registry: &mut BTreeMap<String, Vec<String>>,
    scope: &str,
    observed: &[String],
) -> CoreResult<()> {
    if observed.is_empty() {
        return Ok(());
    }
    match registry.get(scope) {
        None => {
            registry.insert(scope.to_string(), observed.to_vec());
        }
        Some(existing) => {
            let shorter_len = existing.len().min(observed.len());
            if existing[..shorter_len] != observed[..shorter_len] {
                return Err(CoreError::graph(format!(
                    "conflicting dimension declarations for '{scope}': {existing:?} vs {observed:?}"
                )));
            }
            if observed.len() > existing.len() {
                registry.insert(scope.to_string(), observed.to_vec());
            }
        }
    }
    Ok(())
}

#[derive(Default)]
struct BuilderState {
    nodes: BTreeMap<String, GraphNode>,
    edges: Vec<GraphEdge>,
    collectors: Vec<GraphCollector>,
    /// scope (node id, or `<parent>.<childNamespace>`) -> declared raw dims.
    dims_by_scope: BTreeMap<String, Vec<String>>,
}

impl BuilderState {
    fn symbols_for_scope(&self, scope: &str) -> Vec<DimensionSymbol> {
        self.dims_by_scope
            .get(scope)
            .map(|raws| {
                raws.iter()
                    .enumerate()
                    .map(|(ordinal, raw)| DimensionSymbol::new(scope, ordinal, raw.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn register_endpoint(state: &mut BuilderState, ns_path: &str, raw: &str) -> CoreResult<()> {
    let segments = parse_endpoint_path(raw)?;
    match segments.len() {
        1 => {
            let node_id = format!("{ns_path}.{}", segments[0].name);
            merge_dims(&mut state.dims_by_scope, &node_id, &segments[0].dims)?;
        }
        2 => {
            let child_ns = format!("{ns_path}.{}", segments[0].name);
            merge_dims(&mut state.dims_by_scope, &child_ns, &segments[0].dims)?;
            let node_id = format!("{child_ns}.{}", segments[1].name);
            merge_dims(&mut state.dims_by_scope, &node_id, &segments[1].dims)?;
        }
        _ => unreachable!("parse_endpoint_path caps at two segments"),
    }
    Ok(())
}

fn register_doc_endpoints(state: &mut BuilderState, ns_path: &str, doc: &BlueprintDoc) -> CoreResult<()> {
    for edge in &doc.edges {
        register_endpoint(state, ns_path, &edge.from)?;
        register_endpoint(state, ns_path, &edge.to)?;
    }
    for collector in &doc.collectors {
        register_endpoint(state, ns_path, &collector.from)?;
        register_endpoint(state, ns_path, &collector.into)?;
    }
    Ok(())
}

fn pass1_register(state: &mut BuilderState, ns_path: &str, rb: &ResolvedBlueprint) -> CoreResult<()> {
    register_doc_endpoints(state, ns_path, &rb.doc)?;
    for subref in &rb.doc.sub_blueprints {
        let child = rb.children.get(&subref.namespace).ok_or_else(|| {
            CoreError::graph(format!(
                "sub-blueprint reference '{}' under '{ns_path}' has no resolved child",
                subref.namespace
            ))
        })?;
        pass1_register(state, &format!("{ns_path}.{}", subref.namespace), child)?;
    }
    Ok(())
}

fn emit_node(
    state: &mut BuilderState,
    ns_path: &str,
    ancestor_dims: &[DimensionSymbol],
    kind: NodeKind,
    name: &str,
    producer_provider_model: Option<(&str, &str)>,
) -> CoreResult<()> {
    let node_id = format!("{ns_path}.{name}");
    let local_syms = state.symbols_for_scope(&node_id);
    let mut dimensions = ancestor_dims.to_vec();
    dimensions.extend(local_syms);
    let node = GraphNode {
        id: node_id.clone(),
        kind,
        namespace_path: ns_path.to_string(),
        name: name.to_string(),
        dimensions,
        fan_in: false,
        provider: producer_provider_model.map(|(p, _)| p.to_string()),
        provider_model: producer_provider_model.map(|(_, m)| m.to_string()),
    };
    if state.nodes.insert(node_id.clone(), node).is_some() {
        return Err(CoreError::graph(format!("duplicate node id: {node_id}")));
    }
    Ok(())
}

fn pass2_emit_nodes(
    state: &mut BuilderState,
    ns_path: &str,
    rb: &ResolvedBlueprint,
    ancestor_dims: &[DimensionSymbol],
) -> CoreResult<()> {
    for input in &rb.doc.inputs {
        emit_node(state, ns_path, ancestor_dims, NodeKind::InputSource, &input.name, None)?;
    }
    for artefact in &rb.doc.artefacts {
        emit_node(state, ns_path, ancestor_dims, NodeKind::Artifact, &artefact.name, None)?;
    }
    for producer in &rb.doc.producers {
        emit_node(
            state,
            ns_path,
            ancestor_dims,
            NodeKind::Producer,
            &producer.name,
            Some((&producer.provider, &producer.model)),
        )?;
    }
    for subref in &rb.doc.sub_blueprints {
        let child_ns = format!("{ns_path}.{}", subref.namespace);
        let child_namespace_syms = state.symbols_for_scope(&child_ns);
        let mut child_ancestor = ancestor_dims.to_vec();
        child_ancestor.extend(child_namespace_syms);
        let child = rb
            .children
            .get(&subref.namespace)
            .expect("validated present in pass1");
        pass2_emit_nodes(state, &child_ns, child, &child_ancestor)?;
    }
    Ok(())
}

/// Resolve a (possibly dotted) endpoint reference against already-emitted
/// nodes, projecting onto the dimensions actually written at this
/// reference (a genuine prefix of the node's full dimension list, per
/// §3.3: "Endpoint dimensions are always a prefix of the node's
/// dimensions").
fn resolve_endpoint(state: &BuilderState, ns_path: &str, raw: &str) -> CoreResult<EdgeEndpoint> {
    let segments = parse_endpoint_path(raw)?;
    let (node_id, written_len) = match segments.len() {
        1 => (format!("{ns_path}.{}", segments[0].name), segments[0].dims.len()),
        2 => {
            let child_ns = format!("{ns_path}.{}", segments[0].name);
            (
                format!("{child_ns}.{}", segments[1].name),
                segments[1].dims.len(),
            )
        }
        _ => unreachable!(),
    };
    let node = state
        .nodes
        .get(&node_id)
        .ok_or_else(|| CoreError::graph(format!("reference to undeclared node: {node_id} (from {raw})")))?;
    let canonical_local_len = state.dims_by_scope.get(&node_id).map(Vec::len).unwrap_or(0);
    if written_len > canonical_local_len {
        return Err(CoreError::graph(format!(
            "reference '{raw}' writes more local dimensions than declared for {node_id}"
        )));
    }
    let ancestor_len = node.dimensions.len() - canonical_local_len;
    let projected = node.dimensions[..ancestor_len + written_len].to_vec();
    Ok(EdgeEndpoint::new(node_id, projected))
}

fn pass3_emit_edges(state: &mut BuilderState, ns_path: &str, rb: &ResolvedBlueprint) -> CoreResult<()> {
    let mut new_edges = Vec::new();
    for edge in &rb.doc.edges {
        let from = resolve_endpoint(state, ns_path, &edge.from)?;
        let to = resolve_endpoint(state, ns_path, &edge.to)?;
        new_edges.push(GraphEdge {
            from,
            to,
            note: edge.note.clone(),
        });
    }
    let mut new_collectors = Vec::new();
    for collector in &rb.doc.collectors {
        let from = resolve_endpoint(state, ns_path, &collector.from)?;
        let into = resolve_endpoint(state, ns_path, &collector.into)?;
        let group_by = collector
            .group_by
            .iter()
            .map(|raw| {
                from.dimensions
                    .iter()
                    .find(|d| &d.raw == raw)
                    .cloned()
                    .ok_or_else(|| {
                        CoreError::graph(format!(
                            "collector '{}' groupBy references unknown dimension '{raw}'",
                            collector.name
                        ))
                    })
            })
            .collect::<CoreResult<Vec<_>>>()?;
        if let Some(node) = state.nodes.get_mut(&into.node_id) {
            node.fan_in = true;
        }
        new_collectors.push(GraphCollector {
            name: collector.name.clone(),
            from,
            into,
            group_by,
            order_by: collector.order_by.clone(),
        });
    }
    state.edges.extend(new_edges);
    state.collectors.extend(new_collectors);
    for subref in &rb.doc.sub_blueprints {
        let child = rb.children.get(&subref.namespace).expect("validated in pass1");
        pass3_emit_edges(state, &format!("{ns_path}.{}", subref.namespace), child)?;
    }
    Ok(())
}

/// Walk edges to fill `dimensionLineage` (§4.5 step 6): for each edge,
/// zip source and target dimensions positionally; wherever the scopes
/// differ, the source's symbol at that position is the target's parent.
fn compute_lineage(state: &BuilderState) -> CoreResult<BTreeMap<String, Option<String>>> {
    let mut lineage: BTreeMap<String, Option<String>> = BTreeMap::new();
    for node in state.nodes.values() {
        for sym in &node.dimensions {
            lineage.entry(sym.qualified()).or_insert(None);
        }
    }
    for edge in &state.edges {
        let len = edge.from.dimensions.len().min(edge.to.dimensions.len());
        for i in 0..len {
            let src = &edge.from.dimensions[i];
            let dst = &edge.to.dimensions[i];
            if src.scope == dst.scope {
                continue;
            }
            let key = dst.qualified();
            let parent = src.qualified();
            match lineage.get(&key) {
                Some(Some(existing)) if *existing != parent => {
                    return Err(CoreError::graph(format!(
                        "conflicting dimension lineage for '{key}': '{existing}' vs '{parent}'"
                    )));
                }
                _ => {
                    lineage.insert(key, Some(parent));
                }
            }
        }
    }
    Ok(lineage)
}

/// Build the canonical graph from a fully resolved blueprint tree.
pub fn build_graph(root: &ResolvedBlueprint) -> CoreResult<BlueprintGraph> {
    root.validate()?;
    let mut state = BuilderState::default();
    pass1_register(&mut state, "root", root)?;
    pass2_emit_nodes(&mut state, "root", root, &[])?;
    pass3_emit_edges(&mut state, "root", root)?;
    let dimension_lineage = compute_lineage(&state)?;
    Ok(BlueprintGraph {
        nodes: state.nodes,
        edges: state.edges,
        collectors: state.collectors,
        dimension_lineage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::blueprint::{ArtefactSpec, EdgeSpec, InputSpec, Meta, ProducerSpec};

    fn single_producer_doc() -> BlueprintDoc {
        BlueprintDoc {
            meta: Meta {
                id: "movie".into(),
                name: "movie".into(),
                version: None,
                description: None,
                author: None,
                license: None,
            },
            inputs: vec![InputSpec {
                name: "InquiryPrompt".into(),
                type_name: "string".into(),
                required: true,
                description: None,
                default_value: None,
            }],
            artefacts: vec![ArtefactSpec {
                name: "NarrationScript".into(),
                type_name: "text".into(),
                description: None,
                item_type: None,
                count_input: None,
                required: true,
            }],
            sub_blueprints: vec![],
            producers: vec![ProducerSpec {
                name: "ScriptProducer".into(),
                provider: "stub".into(),
                model: "v1".into(),
                settings: None,
                system_prompt: None,
                user_prompt: None,
                json_schema: None,
                text_format: None,
                variables: None,
                sdk_mapping: None,
                outputs: None,
                config: None,
                extra_fields: Default::default(),
            }],
            edges: vec![
                EdgeSpec {
                    from: "InquiryPrompt".into(),
                    to: "ScriptProducer".into(),
                    note: None,
                },
                EdgeSpec {
                    from: "ScriptProducer".into(),
                    to: "NarrationScript".into(),
                    note: None,
                },
            ],
            collectors: vec![],
        }
    }

    #[test]
    fn builds_flat_graph_for_single_producer_blueprint() {
        let rb = ResolvedBlueprint::leaf(single_producer_doc());
        let graph = build_graph(&rb).unwrap();
        assert!(graph.nodes.contains_key("root.InquiryPrompt"));
        assert!(graph.nodes.contains_key("root.ScriptProducer"));
        assert!(graph.nodes.contains_key("root.NarrationScript"));
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.nodes["root.ScriptProducer"].dimensions.is_empty());
    }

    #[test]
    fn dimensioned_edge_registers_local_dims() {
        let mut doc = single_producer_doc();
        doc.producers.push(ProducerSpec {
            name: "AudioProducer".into(),
            provider: "stub".into(),
            model: "v1".into(),
            settings: None,
            system_prompt: None,
            user_prompt: None,
            json_schema: None,
            text_format: None,
            variables: None,
            sdk_mapping: None,
            outputs: None,
            config: None,
            extra_fields: Default::default(),
        });
        doc.edges.push(EdgeSpec {
            from: "ScriptProducer".into(),
            to: "AudioProducer[segment]".into(),
            note: None,
        });
        let rb = ResolvedBlueprint::leaf(doc);
        let graph = build_graph(&rb).unwrap();
        let node = &graph.nodes["root.AudioProducer"];
        assert_eq!(node.dimensions.len(), 1);
        assert_eq!(node.dimensions[0].raw, "segment");
    }

    #[test]
    fn undeclared_reference_is_an_error() {
        let mut doc = single_producer_doc();
        doc.edges.push(EdgeSpec {
            from: "NoSuchNode".into(),
            to: "ScriptProducer".into(),
            note: None,
        });
        let rb = ResolvedBlueprint::leaf(doc);
        assert!(build_graph(&rb).is_err());
    }
}
