//! The user-authored blueprint document tree (§3.2), prior to graph
//! building. Loading sub-blueprints from disk is an I/O concern that lives
//! above this crate; here a blueprint is already a resolved tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl InputSpec {
    /// Every optional input must declare a default (§3.2 invariants).
    pub fn validate(&self) -> CoreResult<()> {
        if !self.required && self.default_value.is_none() {
            return Err(CoreError::graph(format!(
                "optional input '{}' has no defaultValue",
                self.name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtefactSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_input: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// A child reference instantiated under a namespace segment; `source` is
/// resolved by the loader above this crate (a path, a URL, or an inline
/// identifier) into a fully loaded [`BlueprintDoc`] before the document
/// reaches the graph builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubBlueprintRef {
    pub namespace: String,
    pub source: String,
}

/// `{name, provider, model, settings?, systemPrompt?, userPrompt?,
/// jsonSchema?, textFormat?, variables?, sdkMapping?, outputs?, config?}`
/// plus arbitrary additional fields preserved verbatim in `extra_fields`
/// (§9 design notes: dynamic/passthrough blueprint fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerSpec {
    pub name: String,
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdk_mapping: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(flatten)]
    pub extra_fields: BTreeMap<String, Value>,
}

/// A parsed endpoint reference, e.g. `ImagePromptProducer[segment][image]`
/// parses to `{ name: "ImagePromptProducer", dims: ["segment", "image"] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub name: String,
    #[serde(default)]
    pub dims: Vec<String>,
}

impl NodeRef {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let bracket_start = raw.find('[');
        let name = match bracket_start {
            Some(idx) => raw[..idx].to_string(),
            None => raw.to_string(),
        };
        if name.is_empty() {
            return Err(CoreError::graph(format!("empty node reference: {raw}")));
        }
        let mut dims = Vec::new();
        if let Some(idx) = bracket_start {
            let mut rest = &raw[idx..];
            while let Some(open) = rest.strip_prefix('[') {
                let close = open.find(']').ok_or_else(|| {
                    CoreError::graph(format!("unterminated dimension bracket in: {raw}"))
                })?;
                let sym = &open[..close];
                if sym.is_empty() {
                    return Err(CoreError::graph(format!(
                        "empty dimension symbol in: {raw}"
                    )));
                }
                dims.push(sym.to_string());
                rest = &open[close + 1..];
            }
            if !rest.is_empty() {
                return Err(CoreError::graph(format!(
                    "trailing garbage after dimension brackets in: {raw}"
                )));
            }
        }
        Ok(NodeRef { name, dims })
    }

    pub fn raw(&self) -> String {
        let mut s = self.name.clone();
        for d in &self.dims {
            s.push('[');
            s.push_str(d);
            s.push(']');
        }
        s
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl EdgeSpec {
    pub fn from_ref(&self) -> CoreResult<NodeRef> {
        NodeRef::parse(&self.from)
    }

    pub fn to_ref(&self) -> CoreResult<NodeRef> {
        NodeRef::parse(&self.to)
    }
}

/// Folds a dimensioned producer output back into a lower-dimensional input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorSpec {
    pub name: String,
    pub from: String,
    pub into: String,
    pub group_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
}

/// A blueprint document tree node. Sub-blueprints are listed as references
/// only (`sub_blueprints`); a loader above this crate is responsible for
/// resolving each reference into a [`ResolvedBlueprint`] before the graph
/// builder walks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintDoc {
    pub meta: Meta,
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    #[serde(default)]
    pub artefacts: Vec<ArtefactSpec>,
    #[serde(default)]
    pub sub_blueprints: Vec<SubBlueprintRef>,
    #[serde(default)]
    pub producers: Vec<ProducerSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    #[serde(default)]
    pub collectors: Vec<CollectorSpec>,
}

impl BlueprintDoc {
    pub fn validate(&self) -> CoreResult<()> {
        for input in &self.inputs {
            input.validate()?;
        }
        Ok(())
    }
}

/// A blueprint document with every `sub_blueprints` reference already
/// resolved into its own resolved subtree, keyed by namespace segment. This
/// is the shape the graph builder (§4.5) actually walks.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBlueprint {
    pub doc: BlueprintDoc,
    pub children: BTreeMap<String, ResolvedBlueprint>,
}

impl ResolvedBlueprint {
    pub fn leaf(doc: BlueprintDoc) -> Self {
        Self {
            doc,
            children: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        self.doc.validate()?;
        for (namespace, child) in &self.children {
            let declared = self
                .doc
                .sub_blueprints
                .iter()
                .any(|r| &r.namespace == namespace);
            if !declared {
                return Err(CoreError::graph(format!(
                    "resolved child '{namespace}' has no matching sub_blueprints reference"
                )));
            }
            child.validate()?;
        }
        Ok(())
    }
}
