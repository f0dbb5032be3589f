//! src/worker.rs
use crate::configuration::JobConfig;
use crate::counters::{Counter, Counters};
use crate::emitter::PartitionedEmitter;
use crate::file_splitter::InputSplit;
use crate::filters::FilterSet;
use crate::functions::{CountRecord, Mapper};
use crate::mappers::WordCountMapper;
use crate::reducers::Adder;
use anyhow::Context;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerId(Uuid);

impl WorkerId {
    pub fn new() -> Self {
        WorkerId(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl Default for WorkerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a worker needs at startup. Shared read-only by every worker of a run.
#[derive(Clone, Debug)]
pub struct WorkerContext {
    pub filters: Arc<FilterSet>,
    pub config: JobConfig,
    pub partitions: usize,
    pub use_combiner: bool,
}

/// What a worker hands to the shuffle once all its splits are done.
#[derive(Debug)]
pub struct WorkerOutput {
    pub worker_id: WorkerId,
    pub partitions: Vec<Vec<CountRecord>>,
    pub counters: Counters,
}

pub struct Worker {
    id: WorkerId,
    context: WorkerContext,
    emitter: PartitionedEmitter<Adder>,
    counters: Counters,
    completed: usize,
}

impl Worker {
    pub fn new(context: WorkerContext) -> Self {
        let emitter = PartitionedEmitter::new(context.partitions, context.combiner());
        Worker {
            id: WorkerId::new(),
            context,
            emitter,
            counters: Counters::new(),
            completed: 0,
        }
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    pub fn completed_splits(&self) -> usize {
        self.completed
    }

    /// Maps one split. Its output and counters only reach the worker if the whole
    /// split succeeds, so re-running a failed split never double counts.
    #[tracing::instrument(
        name = "Run map split",
        skip_all,
        fields(worker = %self.id.id(), split = %split.id(), path = %split.path().display())
    )]
    pub fn run_split(&mut self, split: &InputSplit) -> Result<(), anyhow::Error> {
        let mut mapper =
            WordCountMapper::new(Arc::clone(&self.context.filters), self.context.config.clone());
        let mut emitter = PartitionedEmitter::new(self.context.partitions, self.context.combiner());

        for record in split.records()? {
            let record = record.context("Failed to read input record")?;
            mapper.map(&record, &mut emitter);
        }

        tracing::debug!(accepted_words = mapper.accepted_words(), "Split mapped");
        self.emitter.absorb(emitter);
        self.counters.merge(mapper.counters());
        self.completed += 1;
        Ok(())
    }

    pub fn record_failed_attempt(&mut self) {
        self.counters.increment(Counter::FailedSplitAttempts, 1);
    }

    pub fn finish(mut self) -> WorkerOutput {
        let partitions = self.emitter.finish(&mut self.counters);
        WorkerOutput {
            worker_id: self.id,
            partitions,
            counters: self.counters,
        }
    }
}

impl WorkerContext {
    fn combiner(&self) -> Option<Adder> {
        self.use_combiner.then_some(Adder)
    }
}
