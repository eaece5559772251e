//! Run orchestration: flatten the selection, load the catalog, resolve the
//! target collection, drive the queue, and report one terminal outcome.

use crate::config::RelinkConfig;
use crate::context::RunContext;
use crate::error::RelinkError;
use crate::flatten::flatten;
use crate::host::VariableHost;
use crate::pipeline;
use crate::queue::RequestQueue;
use crate::scene::SceneNode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Terminal outcome of a run; exactly one per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The selection contained no nodes.
    EmptySelection,
    /// No usable source catalog; no node was processed.
    EmptyCatalog,
    /// The batch ran to completion. Individual node failures are contained
    /// and counted in the summary.
    Completed(RunSummary),
    /// The top-level sequence failed before or during the batch.
    Failed(String),
}

/// Accounting for a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub nodes: usize,
    pub chunks: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed_ms: u128,
}

pub struct Orchestrator {
    host: Arc<dyn VariableHost>,
    config: RelinkConfig,
}

impl Orchestrator {
    pub fn new(host: Arc<dyn VariableHost>, config: RelinkConfig) -> Self {
        Self { host, config }
    }

    /// Run the rebinding batch over `selection`.
    ///
    /// Any unhandled failure in the top-level sequence is caught once and
    /// folded into `RunOutcome::Failed`; the caller always receives exactly
    /// one terminal outcome.
    pub async fn run(&self, selection: &[Arc<SceneNode>]) -> RunOutcome {
        match self.run_inner(selection).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "run failed");
                RunOutcome::Failed(err.to_string())
            }
        }
    }

    async fn run_inner(&self, selection: &[Arc<SceneNode>]) -> Result<RunOutcome, RelinkError> {
        self.config.validate()?;
        let started = Instant::now();

        let nodes = flatten(selection);
        if nodes.is_empty() {
            info!("selection is empty, nothing to rebind");
            return Ok(RunOutcome::EmptySelection);
        }

        let ctx = Arc::new(RunContext::new(
            Arc::clone(&self.host),
            self.config.clone(),
        ));

        if ctx.catalog().await?.is_empty() {
            info!(
                library = %self.config.source_library,
                "source catalog is empty, aborting run"
            );
            return Ok(RunOutcome::EmptyCatalog);
        }

        self.resolve_target_collection(&ctx).await?;

        let queue = RequestQueue::new(self.config.max_concurrency);
        let mut chunks = 0usize;
        for chunk in nodes.chunks(self.config.chunk_size) {
            chunks += 1;
            debug!(chunk = chunks, nodes = chunk.len(), "submitting chunk");
            for node in chunk {
                let ctx = Arc::clone(&ctx);
                let node = Arc::clone(node);
                queue.enqueue(node.id().to_string(), async move {
                    pipeline::process_node(&ctx, &node).await
                });
            }
        }

        queue.wait_until_empty().await;

        let stats = queue.stats();
        let summary = RunSummary {
            nodes: nodes.len(),
            chunks,
            succeeded: stats.succeeded,
            failed: stats.failed,
            elapsed_ms: started.elapsed().as_millis(),
        };
        info!(
            nodes = summary.nodes,
            chunks = summary.chunks,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = summary.elapsed_ms as u64,
            "run completed"
        );
        Ok(RunOutcome::Completed(summary))
    }

    /// First-available heuristic: import the first catalog entry in fetched
    /// order and read the collection it lands in. Order-sensitive when the
    /// catalog spans multiple collections.
    async fn resolve_target_collection(&self, ctx: &RunContext) -> Result<(), RelinkError> {
        let probe = match ctx.catalog().await?.first() {
            Some(descriptor) => descriptor.clone(),
            None => return Ok(()),
        };
        let imported = ctx.import_variable(&probe.key).await?;
        let resolved = ctx
            .retry()
            .run(|| ctx.host().collection_by_id(&imported.collection_id))
            .await?;
        match resolved {
            Some(collection) => {
                info!(
                    collection = %collection.id,
                    name = %collection.name,
                    "target collection resolved"
                );
                ctx.set_target_collection(Some(collection));
            }
            None => {
                warn!(
                    collection = %imported.collection_id,
                    "target collection not resolvable, mode overrides will only be cleared"
                );
                ctx.set_target_collection(None);
            }
        }
        Ok(())
    }
}
