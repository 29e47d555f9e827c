//! YAML blueprint parsing and recursive sub-blueprint resolution (§3.2).
//!
//! Determinism rules mirror the built-in workflow YAML support this is
//! grounded on: parse into a typed document, validate eagerly, and never
//! touch the filesystem here — `BlueprintSource` is the caller's seam for
//! turning a `sub_blueprints[].source` string into YAML text, whether that
//! means a local file, an embedded map (tests), or a remote fetch.

use std::collections::{BTreeMap, BTreeSet};

use reelforge_core::model::blueprint::{BlueprintDoc, ResolvedBlueprint};

use crate::errors::{PlannerError, PlannerResult};

/// Resolves a `sub_blueprints[].source` string to raw YAML text.
pub trait BlueprintSource: Send + Sync {
    fn load(&self, source: &str) -> PlannerResult<String>;
}

/// A `BlueprintSource` backed by an in-memory map, keyed by source string.
/// Used in tests and anywhere blueprints are assembled programmatically
/// rather than read from disk.
#[derive(Default)]
pub struct InMemoryBlueprintSource {
    docs: BTreeMap<String, String>,
}

impl InMemoryBlueprintSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, yaml: impl Into<String>) -> &mut Self {
        self.docs.insert(source.into(), yaml.into());
        self
    }
}

impl BlueprintSource for InMemoryBlueprintSource {
    fn load(&self, source: &str) -> PlannerResult<String> {
        self.docs
            .get(source)
            .cloned()
            .ok_or_else(|| PlannerError::SourceNotFound(source.to_string()))
    }
}

/// Parses blueprint YAML and recursively resolves every `sub_blueprints`
/// reference through a `BlueprintSource`, producing the fully resolved tree
/// the canonical graph builder walks.
pub struct BlueprintLoader<'a> {
    source: &'a dyn BlueprintSource,
}

impl<'a> BlueprintLoader<'a> {
    pub fn new(source: &'a dyn BlueprintSource) -> Self {
        Self { source }
    }

    /// Load and fully resolve a blueprint tree given the root document's raw
    /// YAML text.
    pub fn load_root(&self, root_yaml: &str) -> PlannerResult<ResolvedBlueprint> {
        let doc = self.parse_doc(root_yaml)?;
        let mut visiting = BTreeSet::new();
        self.resolve(doc, &mut visiting)
    }

    fn parse_doc(&self, yaml_text: &str) -> PlannerResult<BlueprintDoc> {
        let doc: BlueprintDoc = serde_yaml::from_str(yaml_text)
            .map_err(|e| PlannerError::BlueprintParse(e.to_string()))?;
        doc.validate()?;
        Ok(doc)
    }

    fn resolve(
        &self,
        doc: BlueprintDoc,
        visiting: &mut BTreeSet<String>,
    ) -> PlannerResult<ResolvedBlueprint> {
        let mut children = BTreeMap::new();
        for sub in &doc.sub_blueprints {
            if !visiting.insert(sub.source.clone()) {
                return Err(PlannerError::SourceCycle(sub.source.clone()));
            }
            let text = self.source.load(&sub.source)?;
            let child_doc = self.parse_doc(&text)?;
            let child = self.resolve(child_doc, visiting)?;
            visiting.remove(&sub.source);
            children.insert(sub.namespace.clone(), child);
        }
        let resolved = ResolvedBlueprint { doc, children };
        resolved.validate()?;
        Ok(resolved)
    }
}
