//! src/executors/parallel.rs
use crate::counters::Counters;
use crate::error::JobError;
use crate::executors::{ExecutionPlan, ExecutionResult, Executor, drain_queue, reduce_partition, shuffle};
use crate::reducers::Adder;
use crate::worker::{Worker, WorkerOutput};
use anyhow::Context;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::task::JoinSet;

/// Runs `plan.workers` map workers and one reduce task per partition on tokio's
/// blocking pool. Workers share nothing but the split queue; each one is
/// single-threaded.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParallelExecutor;

impl ParallelExecutor {
    async fn map_phase(&self, plan: &ExecutionPlan) -> Result<Vec<WorkerOutput>, JobError> {
        let queue = Arc::new(plan.queue());
        let abort = Arc::new(AtomicBool::new(false));
        let worker_count = plan.workers.clamp(1, plan.splits.len().max(1));

        let parent = tracing::Span::current();
        let mut handles = JoinSet::new();
        for _ in 0..worker_count {
            let parent = parent.clone();
            let queue = Arc::clone(&queue);
            let abort = Arc::clone(&abort);
            let context = plan.worker.clone();
            let max_attempts = plan.max_attempts;
            handles.spawn_blocking(move || {
                let mut worker = Worker::new(context);
                let span = tracing::info_span!(parent: &parent, "Map worker", worker = %worker.id().id());
                let _guard = span.enter();
                drain_queue(&mut worker, &queue, max_attempts, &abort)?;
                tracing::debug!(splits = worker.completed_splits(), "Map worker finished");
                Ok::<_, JobError>(worker.finish())
            });
        }

        let mut outputs = Vec::with_capacity(worker_count);
        while let Some(joined) = handles.join_next().await {
            let output = joined.context("Map worker panicked")??;
            outputs.push(output);
        }
        Ok(outputs)
    }
}

impl Executor for ParallelExecutor {
    #[tracing::instrument(
        name = "Parallel execution",
        skip_all,
        fields(splits = plan.splits.len(), workers = plan.workers)
    )]
    async fn run(&self, plan: ExecutionPlan) -> Result<ExecutionResult, JobError> {
        let outputs = self.map_phase(&plan).await?;
        let (buckets, mut counters) = shuffle(outputs, plan.partitions());

        let parent = tracing::Span::current();
        let mut handles = JoinSet::new();
        for (index, records) in buckets.into_iter().enumerate() {
            let parent = parent.clone();
            handles.spawn_blocking(move || {
                let span = tracing::info_span!(parent: &parent, "Reduce partition", partition = index);
                let _guard = span.enter();
                let mut counters = Counters::new();
                let reduced = reduce_partition(&Adder, records, &mut counters);
                (index, reduced, counters)
            });
        }

        let mut partitions = vec![Vec::new(); plan.partitions()];
        while let Some(joined) = handles.join_next().await {
            let (index, reduced, reduce_counters) = joined.context("Reduce task panicked")?;
            counters.merge(&reduce_counters);
            partitions[index] = reduced;
        }

        Ok(ExecutionResult {
            partitions,
            counters,
        })
    }
}
