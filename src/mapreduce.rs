//! src/mapreduce.rs
use crate::counters::{Counter, Counters};
use crate::error::JobError;
use crate::executors::{ExecutionPlan, Executor};
use crate::file_splitter::{FileSplitter, InputSplit};
use crate::filters::FilterSet;
use crate::functions::CountRecord;
use crate::output::OutputWriter;
use crate::spec::JobSpecification;
use crate::worker::WorkerContext;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Expands an input path into the files it names: the file itself, or the visible
/// regular files of a directory in name order.
fn input_files(path: &Path) -> Result<Vec<PathBuf>, JobError> {
    if !path.exists() {
        return Err(JobError::InputNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files = Vec::new();
    let entries = std::fs::read_dir(path)
        .with_context(|| format!("Failed to list input directory: {}", path.display()))?;
    for entry in entries {
        let entry = entry.context("Failed to read input directory entry")?;
        let hidden = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.') || name.starts_with('_'));
        if !hidden && entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

#[tracing::instrument(name = "Split inputs", skip(inputs))]
fn split_inputs(inputs: &[PathBuf], split_size_in_bytes: u64) -> Result<Vec<InputSplit>, JobError> {
    let mut results = Vec::new();
    for input in inputs {
        for file in input_files(input)? {
            tracing::debug!("processing input file: {}", file.display());
            let splits = FileSplitter::new(&file, split_size_in_bytes)
                .split()
                .with_context(|| format!("Failed to split input file: {}", file.display()))?;
            results.extend(splits);
        }
    }
    Ok(results)
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct JobReport {
    pub job_id: Uuid,
    pub counters: Counters,
    pub output_files: Vec<PathBuf>,
    pub partitions: Vec<Vec<CountRecord>>,
}

impl JobReport {
    pub fn accepted_words(&self) -> u64 {
        self.counters.get(Counter::InputWords)
    }

    pub fn records(&self) -> impl Iterator<Item = &CountRecord> {
        self.partitions.iter().flatten()
    }
}

#[derive(Debug)]
pub struct MapReduce {
    job_id: Uuid,
    spec: JobSpecification,
    input_splits: Vec<InputSplit>,
}

impl MapReduce {
    /// Validates the specification and cuts the inputs into splits.
    pub fn new(spec: JobSpecification) -> Result<Self, JobError> {
        let output = spec.validate()?;
        OutputWriter::new(output).ensure_absent()?;
        let input_splits = split_inputs(spec.inputs(), spec.split_size_in_bytes())?;
        Ok(MapReduce {
            job_id: Uuid::new_v4(),
            spec,
            input_splits,
        })
    }

    pub fn spec(&self) -> &JobSpecification {
        &self.spec
    }

    pub fn input_splits(&self) -> &[InputSplit] {
        &self.input_splits
    }

    pub fn job_id(&self) -> &Uuid {
        &self.job_id
    }

    /// Loads the filters once, runs map/combine/shuffle/reduce on `executor` and
    /// writes the output. Nothing is written unless every split succeeded.
    #[tracing::instrument(name = "Run word count job", skip_all, fields(job_id = %self.job_id))]
    pub async fn run<E: Executor>(self, executor: &E) -> Result<JobReport, JobError> {
        let output = self.spec.validate()?;
        let writer = OutputWriter::new(output);

        let filter_files = self.spec.filter_files();
        let filters = FilterSet::load(
            filter_files.skip_patterns.as_deref(),
            filter_files.stop_words.as_deref(),
            self.spec.config(),
        );

        let plan = ExecutionPlan {
            splits: self.input_splits.clone(),
            worker: WorkerContext {
                filters: Arc::new(filters),
                config: self.spec.config().clone(),
                partitions: output.num_tasks(),
                use_combiner: self.spec.use_combiner(),
            },
            workers: self.spec.workers(),
            max_attempts: self.spec.max_attempts(),
        };
        let result = executor.run(plan).await?;
        let output_files = writer.write(&result.partitions)?;

        tracing::info!(
            "Job {} completed successfully\nCounters:\n{}",
            self.job_id,
            result.counters
        );
        Ok(JobReport {
            job_id: self.job_id,
            counters: result.counters,
            output_files,
            partitions: result.partitions,
        })
    }
}
