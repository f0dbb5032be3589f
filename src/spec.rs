//! src/spec.rs
use crate::configuration::{FilterFiles, JobConfig, Settings};
use crate::error::JobError;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobOutput {
    base_path: PathBuf,
    num_tasks: usize,
    format: OutputFormat,
}

impl JobOutput {
    pub fn new(base_path: impl Into<PathBuf>, num_tasks: usize, format: OutputFormat) -> Self {
        JobOutput {
            base_path: base_path.into(),
            num_tasks,
            format,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Number of reduce tasks, and so of output partitions.
    pub fn num_tasks(&self) -> usize {
        self.num_tasks
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

#[derive(Debug, Clone)]
pub struct JobSpecification {
    inputs: Vec<PathBuf>,
    output: Option<JobOutput>,
    workers: usize,
    split_size_in_bytes: u64,
    max_attempts: u32,
    use_combiner: bool,
    config: JobConfig,
    filter_files: FilterFiles,
}

impl JobSpecification {
    pub fn new(workers: usize, split_size_in_bytes: u64) -> Self {
        JobSpecification {
            inputs: vec![],
            output: None,
            workers,
            split_size_in_bytes,
            max_attempts: 4,
            use_combiner: true,
            config: JobConfig::default(),
            filter_files: FilterFiles::default(),
        }
    }

    /// Builds a specification from loaded settings; inputs and output are still to be added.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut spec = Self::new(settings.cluster.workers, settings.cluster.split_size_bytes);
        spec.set_max_attempts(settings.cluster.max_attempts);
        spec.set_combiner(settings.cluster.use_combiner);
        spec.set_config(settings.job.clone());
        spec.set_filter_files(settings.filters.clone());
        spec
    }

    pub fn add_input(&mut self, path: impl Into<PathBuf>) {
        self.inputs.push(path.into());
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn set_output(&mut self, output: JobOutput) {
        self.output = Some(output);
    }

    pub fn output(&self) -> Option<&JobOutput> {
        self.output.as_ref()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn set_workers(&mut self, workers: usize) {
        self.workers = workers;
    }

    pub fn split_size_in_bytes(&self) -> u64 {
        self.split_size_in_bytes
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn set_max_attempts(&mut self, max_attempts: u32) {
        self.max_attempts = max_attempts;
    }

    pub fn use_combiner(&self) -> bool {
        self.use_combiner
    }

    pub fn set_combiner(&mut self, use_combiner: bool) {
        self.use_combiner = use_combiner;
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: JobConfig) {
        self.config = config;
    }

    pub fn filter_files(&self) -> &FilterFiles {
        &self.filter_files
    }

    pub fn set_filter_files(&mut self, filter_files: FilterFiles) {
        self.filter_files = filter_files;
    }

    pub fn validate(&self) -> Result<&JobOutput, JobError> {
        let invalid = |reason: &str| Err(JobError::InvalidSpecification(reason.to_string()));
        if self.inputs.is_empty() {
            return invalid("at least one input path is required");
        }
        if self.workers == 0 {
            return invalid("workers must be greater than zero");
        }
        if self.split_size_in_bytes == 0 {
            return invalid("split size must be greater than zero");
        }
        if self.max_attempts == 0 {
            return invalid("max attempts must be greater than zero");
        }
        match &self.output {
            None => invalid("an output location is required"),
            Some(output) if output.num_tasks() == 0 => {
                invalid("the number of reduce tasks must be greater than zero")
            }
            Some(output) => Ok(output),
        }
    }
}
