//! The canonical (flattened) graph emitted by the graph builder (§4.5):
//! nodes, edges, collectors, and dimension lineage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A fully-qualified dimension slot. `scope` is the namespace key the
/// dimension was declared against (e.g. `root.Narrative`), `ordinal` is its
/// position among that namespace's declared dims, and `raw` is the symbol
/// name as written in the blueprint (e.g. `segment`). Qualifying by scope
/// and ordinal keeps two independently declared `segment` dimensions at
/// different nesting levels from aliasing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DimensionSymbol {
    pub scope: String,
    pub ordinal: usize,
    pub raw: String,
}

impl DimensionSymbol {
    pub fn new(scope: impl Into<String>, ordinal: usize, raw: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            ordinal,
            raw: raw.into(),
        }
    }

    /// A stable string key suitable for use in maps like
    /// [`super::graph::DimensionLineage`] or as a proto-instance key before
    /// expansion assigns concrete coordinates.
    pub fn qualified(&self) -> String {
        format!("{}#{}:{}", self.scope, self.ordinal, self.raw)
    }
}

/// The kind of a canonical graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum NodeKind {
    InputSource,
    Producer,
    Artifact,
}

/// A flattened node: one per declared input, artefact, or producer across
/// the whole resolved blueprint tree, still unexpanded (dimensions carry
/// symbols, not concrete coordinates).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub namespace_path: String,
    pub name: String,
    pub dimensions: Vec<DimensionSymbol>,
    /// Set by the graph builder when this node is the target of a
    /// collector (§4.5 step 5); consumed by the expander to know it should
    /// receive a folded, rather than a direct, value.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fan_in: bool,
    /// Carried alongside `Producer` nodes only, so the expander can emit
    /// `provider`/`providerModel` on each concrete `ProducerGraphNode`
    /// without a second lookup against the blueprint document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_model: Option<String>,
}

impl GraphNode {
    /// The canonical id this node's instances are built from (§3.1): bare
    /// `Input:<Name>` at the root, dotted `Input:<NsPath>.<Name>` when
    /// namespaced; artefacts drop the namespace path entirely, matching
    /// the spec's `Artifact:<Name>[dim=i&…]` examples.
    pub fn canonical_base_id(&self) -> String {
        match self.kind {
            NodeKind::InputSource => {
                if self.namespace_path == "root" {
                    format!("Input:{}", self.name)
                } else {
                    let ns = self.namespace_path.strip_prefix("root.").unwrap_or(&self.namespace_path);
                    format!("Input:{ns}.{}", self.name)
                }
            }
            NodeKind::Artifact => format!("Artifact:{}", self.name),
            NodeKind::Producer => format!("{}.{}", self.namespace_path, self.name),
        }
    }
}

/// A typed endpoint on an edge: a node id plus the prefix of that node's
/// dimensions the endpoint is actually projected over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeEndpoint {
    pub node_id: String,
    pub dimensions: Vec<DimensionSymbol>,
}

impl EdgeEndpoint {
    pub fn new(node_id: impl Into<String>, dimensions: Vec<DimensionSymbol>) -> Self {
        Self {
            node_id: node_id.into(),
            dimensions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub from: EdgeEndpoint,
    pub to: EdgeEndpoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A collector: folds a dimensioned producer output back into a
/// lower-dimensional input, ordered by `orderBy` and grouped by `groupBy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphCollector {
    pub name: String,
    pub from: EdgeEndpoint,
    pub into: EdgeEndpoint,
    pub group_by: Vec<DimensionSymbol>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

/// Map from a qualified dimension symbol to its parent symbol (the symbol
/// it is counted by), or `None` if it is a root dimension.
pub type DimensionLineage = BTreeMap<String, Option<String>>;

/// The canonical, flattened, but still unexpanded blueprint graph (§3.3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintGraph {
    pub nodes: BTreeMap<String, GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub collectors: Vec<GraphCollector>,
    pub dimension_lineage: DimensionLineage,
}

impl BlueprintGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }
}
