//! src/executors/mod.rs
use crate::counters::{Counter, Counters};
use crate::error::JobError;
use crate::file_splitter::InputSplit;
use crate::functions::{Count, CountRecord, Key, Reducer};
use crate::worker::{Worker, WorkerContext, WorkerOutput};
use crossbeam_queue::SegQueue;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

mod parallel;
pub use parallel::ParallelExecutor;

mod sequential;
pub use sequential::SequentialExecutor;

/// The map work of one run and what each worker starts with.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub splits: Vec<InputSplit>,
    pub worker: WorkerContext,
    pub workers: usize,
    pub max_attempts: u32,
}

impl ExecutionPlan {
    pub fn partitions(&self) -> usize {
        self.worker.partitions.max(1)
    }

    fn queue(&self) -> SegQueue<SplitTask> {
        let queue = SegQueue::new();
        for split in &self.splits {
            queue.push(SplitTask {
                split: split.clone(),
                attempt: 0,
            });
        }
        queue
    }
}

/// Final reduce output, one sorted record list per partition.
#[derive(Debug)]
pub struct ExecutionResult {
    pub partitions: Vec<Vec<CountRecord>>,
    pub counters: Counters,
}

pub trait Executor {
    fn run(
        &self,
        plan: ExecutionPlan,
    ) -> impl Future<Output = Result<ExecutionResult, JobError>> + Send;
}

#[derive(Debug)]
struct SplitTask {
    split: InputSplit,
    attempt: u32,
}

/// What the split queue drives: map one split, or note that an attempt failed.
trait SplitRunner {
    fn run_split(&mut self, split: &InputSplit) -> Result<(), anyhow::Error>;
    fn record_failed_attempt(&mut self);
}

impl SplitRunner for Worker {
    fn run_split(&mut self, split: &InputSplit) -> Result<(), anyhow::Error> {
        Worker::run_split(self, split)
    }

    fn record_failed_attempt(&mut self) {
        Worker::record_failed_attempt(self)
    }
}

/// Pulls splits until the queue is empty. A failed split goes back on the queue
/// until it has used up `max_attempts`, at which point the whole job is aborted.
fn drain_queue<W: SplitRunner>(
    worker: &mut W,
    queue: &SegQueue<SplitTask>,
    max_attempts: u32,
    abort: &AtomicBool,
) -> Result<(), JobError> {
    while let Some(task) = queue.pop() {
        if abort.load(Ordering::Relaxed) {
            break;
        }
        if let Err(e) = worker.run_split(&task.split) {
            worker.record_failed_attempt();
            let attempts = task.attempt + 1;
            if attempts >= max_attempts {
                abort.store(true, Ordering::Relaxed);
                return Err(JobError::SplitFailed {
                    split: *task.split.id(),
                    attempts,
                    source: e.into(),
                });
            }
            tracing::warn!(
                error.cause_chain = ?e,
                split = %task.split.id(),
                attempts,
                "Split failed, rescheduling"
            );
            queue.push(SplitTask {
                attempt: attempts,
                ..task
            });
        }
    }
    Ok(())
}

/// Hands partition `r` of every worker to reducer `r`.
fn shuffle(outputs: Vec<WorkerOutput>, partitions: usize) -> (Vec<Vec<CountRecord>>, Counters) {
    let mut buckets: Vec<Vec<CountRecord>> = (0..partitions).map(|_| Vec::new()).collect();
    let mut counters = Counters::new();
    for output in outputs {
        counters.merge(&output.counters);
        for (partition, records) in output.partitions.into_iter().enumerate() {
            buckets[partition].extend(records);
        }
    }
    (buckets, counters)
}

/// Groups a partition by key and reduces each group. Output is sorted by key.
pub fn reduce_partition<R: Reducer>(
    reducer: &R,
    records: Vec<CountRecord>,
    counters: &mut Counters,
) -> Vec<CountRecord> {
    let mut groups: BTreeMap<Key, Vec<Count>> = BTreeMap::new();
    for record in records {
        let (word, count) = record.into_parts();
        groups.entry(word).or_default().push(count);
    }
    counters.increment(Counter::ReduceInputGroups, groups.len() as u64);

    let reduced: Vec<CountRecord> = groups
        .into_iter()
        .map(|(word, counts)| reducer.reduce(word, counts))
        .collect();
    counters.increment(Counter::ReduceOutputRecords, reduced.len() as u64);
    reduced
}
