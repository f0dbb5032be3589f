//! src/error.rs
use std::path::PathBuf;
use uuid::Uuid;

pub fn error_chain_fmt(
    f: &mut std::fmt::Formatter<'_>,
    e: &impl std::error::Error,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

#[derive(thiserror::Error)]
pub enum JobError {
    #[error("Invalid job specification: {0}")]
    InvalidSpecification(String),
    #[error("Input path does not exist: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("Output directory already exists: {}", .0.display())]
    OutputExists(PathBuf),
    #[error("Input split {split} failed after {attempts} attempt(s)")]
    SplitFailed {
        split: Uuid,
        attempts: u32,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(f, self)
    }
}
