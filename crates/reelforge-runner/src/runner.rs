//! The concurrent runner (§4.8, §5): executes an `ExecutionPlan` layer by
//! layer, bounding concurrency within a layer with a semaphore the way
//! `the-dagwood`'s level-by-level executor bounds concurrent processors,
//! adapted to this system's job/artefact shape and cooperative
//! cancellation instead of that executor's canonical-payload model.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Semaphore;

use reelforge_core::clock::Clock;
use reelforge_core::determinism::hashing::hash_inputs;
use reelforge_core::ids::CanonicalId;
use reelforge_core::model::events::{ArtefactEvent, ArtefactOutput, ArtefactStatus, BlobRef};
use reelforge_core::model::manifest::Manifest;
use reelforge_core::model::plan::{ExecutionPlan, Job};
use reelforge_core::producer::{ProduceRequest, ResolvedInput};
use reelforge_store::{blob_store, EventLog, ManifestService, StorageContext};

use reelforge_producers::ProducerResolver;

use crate::cancellation::CancellationToken;

/// Caller-supplied context for one `execute` call: which movie, which
/// plain input values resolved inputs should read from, and the
/// cancellation token honored between layers (§5).
pub struct RunContext {
    pub movie_id: String,
    pub base_revision: Option<String>,
    pub resolved_inputs: BTreeMap<String, Value>,
    pub cancellation: CancellationToken,
}

/// Terminal outcome of a single job (§4.8 "job status derivation").
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job_id: String,
    pub status: ArtefactStatus,
    pub produced_artefact_ids: Vec<String>,
    pub diagnostics: Option<Value>,
}

/// `RunResult` (§6.3): the runner's full record of one `execute` call. Does
/// not itself touch storage beyond what's needed to rebuild the manifest
/// snapshot — every event was already durably appended during `execute`.
pub struct RunResult {
    movie_id: String,
    target_revision: String,
    base_revision: Option<String>,
    ctx: Arc<dyn StorageContext>,
    clock: Arc<dyn Clock>,
    pub job_outcomes: Vec<JobOutcome>,
    pub cancelled_before_completion: bool,
}

impl RunResult {
    /// `runResult.buildManifest()` (§4.8): rebuild the snapshot from the
    /// logs at the target revision.
    pub fn build_manifest(&self) -> Result<Manifest, reelforge_store::StoreError> {
        let event_log = EventLog::new(self.ctx.clone());
        ManifestService::new(self.ctx.clone()).build_from_events(
            &self.movie_id,
            &self.target_revision,
            self.base_revision.as_deref(),
            &event_log,
            self.clock.as_ref(),
        )
    }
}

/// Executes `ExecutionPlan`s layer by layer with a bounded per-layer
/// concurrency, against the storage context and producer registry it was
/// constructed with.
#[derive(Clone)]
pub struct Runner {
    storage_ctx: Arc<dyn StorageContext>,
    resolver: Arc<ProducerResolver>,
    clock: Arc<dyn Clock>,
    concurrency: usize,
}

impl Runner {
    pub fn new(
        storage_ctx: Arc<dyn StorageContext>,
        resolver: Arc<ProducerResolver>,
        clock: Arc<dyn Clock>,
        concurrency: usize,
    ) -> Self {
        Self {
            storage_ctx,
            resolver,
            clock,
            concurrency: concurrency.max(1),
        }
    }

    /// `Runner.execute(plan, ctx)` (§4.8, §6.3). Honors `ctx.cancellation`
    /// between layers; in-flight jobs in a layer always run to completion.
    pub async fn execute(&self, plan: &ExecutionPlan, ctx: RunContext) -> RunResult {
        let mut job_outcomes = Vec::new();
        let mut live_artefacts: BTreeMap<String, ArtefactOutput> = BTreeMap::new();
        let mut cancelled_before_completion = false;

        for (layer_index, layer) in plan.layers.iter().enumerate() {
            if ctx.cancellation.is_cancelled() {
                cancelled_before_completion = true;
                break;
            }
            if layer.is_empty() {
                continue;
            }

            let semaphore = Arc::new(Semaphore::new(self.concurrency));
            let mut tasks = Vec::with_capacity(layer.len());
            for job in layer {
                let runner = self.clone();
                let movie_id = ctx.movie_id.clone();
                let revision = plan.revision.clone();
                let resolved_inputs = ctx.resolved_inputs.clone();
                let live_snapshot = live_artefacts.clone();
                let job = job.clone();
                let permit_source = semaphore.clone();
                tasks.push(tokio::spawn(async move {
                    let _permit = permit_source
                        .acquire_owned()
                        .await
                        .expect("semaphore is never closed");
                    runner
                        .run_job(&movie_id, &revision, layer_index, job, &resolved_inputs, &live_snapshot)
                        .await
                }));
            }

            for task in tasks {
                let (outcome, produced) = task.await.expect("job task panicked");
                for (id, output) in produced {
                    live_artefacts.insert(id, output);
                }
                job_outcomes.push(outcome);
            }
        }

        RunResult {
            movie_id: ctx.movie_id,
            target_revision: plan.revision.clone(),
            base_revision: ctx.base_revision,
            ctx: self.storage_ctx.clone(),
            clock: self.clock.clone(),
            job_outcomes,
            cancelled_before_completion,
        }
    }

    /// Runs one job to completion: resolve inputs, invoke the producer,
    /// persist any blob outputs, append an `ArtefactEvent` per returned
    /// artefact, and derive the job's terminal status (§4.8 steps 1-5).
    async fn run_job(
        &self,
        movie_id: &str,
        revision: &str,
        layer_index: usize,
        job: Job,
        resolved_inputs: &BTreeMap<String, Value>,
        live_artefacts: &BTreeMap<String, ArtefactOutput>,
    ) -> (JobOutcome, Vec<(String, ArtefactOutput)>) {
        let event_log = EventLog::new(self.storage_ctx.clone());

        let inputs_hash = match hash_inputs(&job.inputs) {
            Ok(h) => h,
            Err(e) => {
                return (
                    JobOutcome {
                        job_id: job.job_id.clone(),
                        status: ArtefactStatus::Failed,
                        produced_artefact_ids: Vec::new(),
                        diagnostics: Some(serde_json::json!({ "error": e.to_string() })),
                    },
                    Vec::new(),
                )
            }
        };

        let mut request_inputs = BTreeMap::new();
        for id in &job.inputs {
            match self.resolve_input(movie_id, id, resolved_inputs, live_artefacts) {
                Ok(resolved) => {
                    request_inputs.insert(id.clone(), resolved);
                }
                Err(e) => {
                    return (
                        JobOutcome {
                            job_id: job.job_id.clone(),
                            status: ArtefactStatus::Failed,
                            produced_artefact_ids: Vec::new(),
                            diagnostics: Some(serde_json::json!({ "error": e.to_string() })),
                        },
                        Vec::new(),
                    )
                }
            }
        }

        let handler = match self.resolver.resolve(&job.producer) {
            Ok(h) => h,
            Err(e) => {
                return (
                    JobOutcome {
                        job_id: job.job_id.clone(),
                        status: ArtefactStatus::Failed,
                        produced_artefact_ids: Vec::new(),
                        diagnostics: Some(serde_json::json!({ "error": e.to_string() })),
                    },
                    Vec::new(),
                )
            }
        };

        let request = ProduceRequest {
            movie_id: movie_id.to_string(),
            job: job.clone(),
            layer_index,
            attempt: 1,
            revision: revision.to_string(),
            resolved_inputs: request_inputs,
        };

        let outcome = match handler.produce(request).await {
            Ok(result) => result,
            Err(e) => {
                return (
                    JobOutcome {
                        job_id: job.job_id.clone(),
                        status: ArtefactStatus::Failed,
                        produced_artefact_ids: Vec::new(),
                        diagnostics: Some(serde_json::json!({ "error": e.to_string() })),
                    },
                    Vec::new(),
                )
            }
        };

        let mut produced_ids = Vec::new();
        let mut produced_outputs = Vec::new();
        let mut any_failed = false;
        let mut all_skipped = true;

        for artefact in outcome.artefacts {
            any_failed |= artefact.status == ArtefactStatus::Failed;
            all_skipped &= artefact.status == ArtefactStatus::Skipped;

            let output = match (&artefact.status, artefact.blob, artefact.inline) {
                (ArtefactStatus::Succeeded, Some(raw), _) => {
                    let hash = match blob_store::put_blob(self.storage_ctx.as_ref(), movie_id, &raw.data) {
                        Ok(h) => h,
                        Err(e) => {
                            any_failed = true;
                            tracing::warn!(error = %e, artefact_id = %artefact.artefact_id, "failed to persist blob");
                            continue;
                        }
                    };
                    ArtefactOutput {
                        blob: Some(BlobRef {
                            hash,
                            size: raw.data.len() as u64,
                            mime_type: raw.mime_type,
                        }),
                        inline: None,
                    }
                }
                (_, _, Some(text)) => ArtefactOutput {
                    blob: None,
                    inline: Some(text),
                },
                _ => ArtefactOutput::default(),
            };

            let event = ArtefactEvent {
                artefact_id: artefact.artefact_id.clone(),
                revision: revision.to_string(),
                inputs_hash: inputs_hash.clone(),
                output: output.clone(),
                status: artefact.status,
                produced_by: job.job_id.clone(),
                diagnostics: artefact.diagnostics,
                created_at: self.clock.now(),
            };
            if let Err(e) = event_log.append_artefact(movie_id, &event) {
                tracing::error!(error = %e, artefact_id = %artefact.artefact_id, "failed to append artefact event");
            }

            produced_ids.push(artefact.artefact_id.clone());
            if artefact.status == ArtefactStatus::Succeeded {
                produced_outputs.push((artefact.artefact_id, output));
            }
        }

        let status = if any_failed {
            ArtefactStatus::Failed
        } else if all_skipped && !produced_ids.is_empty() {
            ArtefactStatus::Skipped
        } else {
            ArtefactStatus::Succeeded
        };

        (
            JobOutcome {
                job_id: job.job_id,
                status,
                produced_artefact_ids: produced_ids,
                diagnostics: outcome.diagnostics,
            },
            produced_outputs,
        )
    }

    /// Resolves one job input id: a plain value from `resolved_inputs`, an
    /// upstream artefact produced earlier in this same run, or — for
    /// artefacts this plan left untouched — the latest succeeded event
    /// already on disk (§4.8 step 2).
    fn resolve_input(
        &self,
        movie_id: &str,
        id: &str,
        resolved_inputs: &BTreeMap<String, Value>,
        live_artefacts: &BTreeMap<String, ArtefactOutput>,
    ) -> anyhow::Result<ResolvedInput> {
        if CanonicalId::is_input(id) {
            let value = resolved_inputs
                .get(id)
                .ok_or_else(|| anyhow::anyhow!("no resolved value for input '{id}'"))?;
            return Ok(ResolvedInput::Value { value: value.clone() });
        }

        if let Some(output) = live_artefacts.get(id) {
            return self.artefact_output_to_resolved_input(movie_id, output);
        }

        let event_log = EventLog::new(self.storage_ctx.clone());
        let events = event_log.stream_artefacts(movie_id, None)?;
        let latest = events
            .iter()
            .filter(|e| e.artefact_id == id && e.status == ArtefactStatus::Succeeded)
            .last()
            .ok_or_else(|| anyhow::anyhow!("no succeeded artefact event found for '{id}'"))?;
        self.artefact_output_to_resolved_input(movie_id, &latest.output)
    }

    fn artefact_output_to_resolved_input(
        &self,
        movie_id: &str,
        output: &ArtefactOutput,
    ) -> anyhow::Result<ResolvedInput> {
        if let Some(blob) = &output.blob {
            let data = blob_store::get_blob(self.storage_ctx.as_ref(), movie_id, &blob.hash)?;
            return Ok(ResolvedInput::ArtefactBlob {
                data,
                mime_type: blob.mime_type.clone(),
            });
        }
        if let Some(text) = &output.inline {
            return Ok(ResolvedInput::ArtefactInline { text: text.clone() });
        }
        anyhow::bail!("artefact output carries neither inline nor blob")
    }
}
