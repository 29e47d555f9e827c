use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use reelforge_core::clock::Clock;
use reelforge_core::model::plan::ExecutionPlan;
use reelforge_producers::ProducerResolver;
use reelforge_runner::{CancellationToken, JobOutcome, RunContext, Runner};
use reelforge_store::storage_context::resolve as resolve_path;
use reelforge_store::{EventLog, ManifestService, StoreConfig, StoreError, SystemClock};

use crate::output;

#[derive(Debug, Serialize)]
pub struct RunOut {
    pub manifest_revision: String,
    pub manifest_hash: String,
    pub cancelled_before_completion: bool,
    pub jobs: Vec<JobOutcomeOut>,
}

#[derive(Debug, Serialize)]
pub struct JobOutcomeOut {
    pub job_id: String,
    pub status: String,
    pub produced_artefact_ids: Vec<String>,
}

impl From<&JobOutcome> for JobOutcomeOut {
    fn from(outcome: &JobOutcome) -> Self {
        Self {
            job_id: outcome.job_id.clone(),
            status: format!("{:?}", outcome.status).to_lowercase(),
            produced_artefact_ids: outcome.produced_artefact_ids.clone(),
        }
    }
}

pub async fn run(
    store_root: &str,
    movie_id: &str,
    revision: &str,
    concurrency: usize,
) -> Result<()> {
    let ctx = StoreConfig::local_dev(store_root).open();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let event_log = EventLog::new(ctx.clone());
    let manifest_service = ManifestService::new(ctx.clone());

    let plan_path = resolve_path(movie_id, &["runs", &format!("{revision}-plan.json")])?;
    let plan_bytes = ctx
        .read_to_buffer(&plan_path)
        .with_context(|| format!("reading plan at {plan_path}"))?;
    let plan: ExecutionPlan = serde_json::from_slice(&plan_bytes)?;

    let (base_revision, previous_hash) = match manifest_service.load_current(movie_id) {
        Ok(loaded) => (Some(loaded.manifest.revision), Some(loaded.hash)),
        Err(StoreError::ManifestNotFound(_)) => (None, None),
        Err(other) => return Err(other.into()),
    };

    let mut resolved_inputs = BTreeMap::new();
    for event in event_log.stream_inputs(movie_id, None)? {
        resolved_inputs.insert(event.id, event.payload);
    }

    let resolver = Arc::new(ProducerResolver::new(Arc::new(reelforge_producers::builtin_registry())));
    let runner = Runner::new(ctx.clone(), resolver, clock.clone(), concurrency);
    let run_context = RunContext {
        movie_id: movie_id.to_string(),
        base_revision,
        resolved_inputs,
        cancellation: CancellationToken::new(),
    };

    let run_result = runner.execute(&plan, run_context).await;
    let manifest = run_result.build_manifest()?;
    let manifest_hash =
        manifest_service.save_manifest(movie_id, &manifest, previous_hash.as_deref(), clock.as_ref())?;

    output::print(&RunOut {
        manifest_revision: manifest.revision,
        manifest_hash,
        cancelled_before_completion: run_result.cancelled_before_completion,
        jobs: run_result.job_outcomes.iter().map(JobOutcomeOut::from).collect(),
    })?;
    Ok(())
}
