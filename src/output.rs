//! src/output.rs
use crate::error::JobError;
use crate::functions::CountRecord;
use crate::spec::{JobOutput, OutputFormat};
use anyhow::Context;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SUCCESS_MARKER: &str = "_SUCCESS";

pub fn part_file_name(partition: usize) -> String {
    format!("part-r-{partition:05}")
}

pub struct OutputWriter {
    base_path: PathBuf,
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(output: &JobOutput) -> Self {
        OutputWriter {
            base_path: output.base_path().to_path_buf(),
            format: output.format(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Fails when the directory already exists so a run never mixes with old results.
    pub fn ensure_absent(&self) -> Result<(), JobError> {
        if self.base_path.exists() {
            return Err(JobError::OutputExists(self.base_path.clone()));
        }
        Ok(())
    }

    /// Writes one part file per partition, then the success marker.
    #[tracing::instrument(name = "Write job output", skip_all, fields(path = %self.base_path.display()))]
    pub fn write(&self, partitions: &[Vec<CountRecord>]) -> Result<Vec<PathBuf>, JobError> {
        self.ensure_absent()?;
        fs::create_dir_all(&self.base_path).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.base_path.display()
            )
        })?;

        let mut files = Vec::with_capacity(partitions.len());
        for (partition, records) in partitions.iter().enumerate() {
            let path = self.base_path.join(part_file_name(partition));
            self.write_partition(&path, records)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            files.push(path);
        }

        File::create(self.base_path.join(SUCCESS_MARKER))
            .context("Failed to write success marker")?;
        Ok(files)
    }

    fn write_partition(&self, path: &Path, records: &[CountRecord]) -> Result<(), anyhow::Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        for record in records {
            match self.format {
                OutputFormat::Text => writeln!(writer, "{}\t{}", record.word(), record.count())?,
                OutputFormat::Json => {
                    serde_json::to_writer(&mut writer, record)?;
                    writeln!(writer)?;
                }
            }
        }
        writer.flush()?;
        Ok(())
    }
}
