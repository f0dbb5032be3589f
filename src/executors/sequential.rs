//! src/executors/sequential.rs
use crate::error::JobError;
use crate::executors::{ExecutionPlan, ExecutionResult, Executor, drain_queue, reduce_partition, shuffle};
use crate::reducers::Adder;
use crate::worker::Worker;
use std::sync::atomic::AtomicBool;

/// Runs the whole job on the calling task with a single worker and one reducer at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    #[tracing::instrument(name = "Sequential execution", skip_all, fields(splits = plan.splits.len()))]
    async fn run(&self, plan: ExecutionPlan) -> Result<ExecutionResult, JobError> {
        let queue = plan.queue();
        let abort = AtomicBool::new(false);
        let mut worker = Worker::new(plan.worker.clone());
        drain_queue(&mut worker, &queue, plan.max_attempts, &abort)?;

        let (buckets, mut counters) = shuffle(vec![worker.finish()], plan.partitions());
        let partitions = buckets
            .into_iter()
            .map(|records| reduce_partition(&Adder, records, &mut counters))
            .collect();

        Ok(ExecutionResult {
            partitions,
            counters,
        })
    }
}
