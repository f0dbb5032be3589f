//! src/main.rs
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use wordcount::configuration::{Settings, get_configuration};
use wordcount::executors::{ParallelExecutor, SequentialExecutor};
use wordcount::mapreduce::{JobReport, MapReduce};
use wordcount::spec::{JobOutput, JobSpecification, OutputFormat};
use wordcount::telemetry::init_tracing;

/// Counts words across text files with a map/combine/reduce job.
#[derive(Parser, Debug)]
#[command(name = "wordcount")]
struct Cli {
    /// Input files or directories, followed by the output directory
    #[arg(required = true, num_args = 2.., value_name = "PATH")]
    paths: Vec<PathBuf>,
    /// Skip-pattern file, one pattern per line
    #[arg(long = "skip", value_name = "FILE")]
    skip_patterns: Option<PathBuf>,
    /// Stop-word file, one word per line
    #[arg(long = "skip-stop-words", value_name = "FILE")]
    stop_words: Option<PathBuf>,
    #[arg(long)]
    case_sensitive: bool,
    #[arg(long, conflicts_with = "skip_patterns")]
    no_skip_patterns: bool,
    #[arg(long, conflicts_with = "stop_words")]
    no_stop_words: bool,
    /// Count the empty tokens produced by consecutive whitespace
    #[arg(long)]
    preserve_empty_tokens: bool,
    #[arg(short, long)]
    workers: Option<usize>,
    #[arg(short, long)]
    reducers: Option<usize>,
    #[arg(long, value_name = "text|json")]
    format: Option<OutputFormat>,
    /// Run every task on one worker
    #[arg(long)]
    sequential: bool,
}

impl Cli {
    fn into_spec(self, mut settings: Settings) -> anyhow::Result<JobSpecification> {
        if let Some(workers) = self.workers {
            settings.cluster.workers = workers;
        }
        if let Some(path) = self.skip_patterns {
            settings.filters.skip_patterns = Some(path);
            settings.job.use_skip_patterns = true;
        }
        if let Some(path) = self.stop_words {
            settings.filters.stop_words = Some(path);
        }
        settings.job.case_sensitive |= self.case_sensitive;
        settings.job.preserve_empty_tokens |= self.preserve_empty_tokens;
        if self.no_skip_patterns {
            settings.job.use_skip_patterns = false;
        }
        if self.no_stop_words {
            settings.job.use_stop_words = false;
        }

        let mut paths = self.paths;
        let output = paths.pop().context("Missing output path")?;
        let mut spec = JobSpecification::from_settings(&settings);
        for input in paths {
            spec.add_input(input);
        }
        spec.set_output(JobOutput::new(
            output,
            self.reducers.unwrap_or(settings.cluster.reducers),
            self.format.unwrap_or(settings.output.format),
        ));
        Ok(spec)
    }
}

async fn run(cli: Cli) -> anyhow::Result<JobReport> {
    let settings = get_configuration().context("Failed to read configuration.")?;
    let sequential = cli.sequential;
    let job = MapReduce::new(cli.into_spec(settings)?)?;
    tracing::info!(
        job_id = %job.job_id(),
        splits = job.input_splits().len(),
        "Submitting word count job"
    );
    let report = if sequential {
        job.run(&SequentialExecutor).await?
    } else {
        job.run(&ParallelExecutor).await?
    };
    Ok(report)
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing("wordcount") {
        eprintln!("Failed to initialise tracing: {e:?}");
    }
    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => {
            tracing::info!(
                accepted_words = report.accepted_words(),
                output_files = report.output_files.len(),
                "Word count finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "Word count job did not complete");
            ExitCode::FAILURE
        }
    }
}
