use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;

use reelforge_core::clock::Clock;
use reelforge_core::model::events::EditedBy;
use reelforge_planner::{
    BlueprintLoader, GeneratePlanArgs, PendingInputEdit, PlanningService,
};
use reelforge_store::{StoreConfig, SystemClock};

use crate::blueprint_source::FsBlueprintSource;
use crate::output;

#[derive(Debug, Serialize)]
pub struct PlanOut {
    pub target_revision: String,
    pub plan_path: String,
    pub job_count: usize,
    pub layer_count: usize,
}

fn parse_pair(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{raw}'"))?;
    Ok((key.to_string(), value.to_string()))
}

fn parse_input_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub async fn run(
    store_root: &str,
    movie_id: &str,
    blueprint_path: &str,
    inputs: &[String],
    counts: &[String],
) -> Result<()> {
    let path = Path::new(blueprint_path);
    let root_yaml = std::fs::read_to_string(path)
        .with_context(|| format!("reading blueprint file {blueprint_path}"))?;
    let source_root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(".").to_path_buf());
    let source = FsBlueprintSource::new(source_root);
    let blueprint = BlueprintLoader::new(&source).load_root(&root_yaml)?;

    let mut input_edits = Vec::with_capacity(inputs.len());
    for raw in inputs {
        let (id, value) = parse_pair(raw)?;
        input_edits.push(PendingInputEdit {
            id,
            value: parse_input_value(&value),
            edited_by: EditedBy::User,
        });
    }

    let mut dimension_counters = BTreeMap::new();
    for raw in counts {
        let (symbol, value) = parse_pair(raw)?;
        dimension_counters.insert(symbol, value);
    }

    let ctx = StoreConfig::local_dev(store_root).open();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = PlanningService::new(ctx, clock);

    let result = service.generate_plan(GeneratePlanArgs {
        movie_id: movie_id.to_string(),
        blueprint,
        input_edits,
        pending_artefacts: vec![],
        dimension_counters,
    })?;

    output::print(&PlanOut {
        target_revision: result.target_revision,
        plan_path: result.plan_path,
        job_count: result.plan.all_jobs().count(),
        layer_count: result.plan.layers.len(),
    })?;
    Ok(())
}
