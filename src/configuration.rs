//! src/configuration.rs
use crate::spec::OutputFormat;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Settings {
    pub cluster: ClusterSettings,
    pub job: JobConfig,
    pub filters: FilterFiles,
    pub output: OutputSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ClusterSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub workers: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub reducers: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub split_size_bytes: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_attempts: u32,
    pub use_combiner: bool,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            reducers: 1,
            split_size_bytes: 64 * 1024 * 1024,
            max_attempts: 4,
            use_combiner: true,
        }
    }
}

/// Per-run tokenization and filtering switches.
#[derive(serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct JobConfig {
    pub case_sensitive: bool,
    /// Loads the skip-pattern file. The patterns are never consulted while tokenizing.
    pub use_skip_patterns: bool,
    pub use_stop_words: bool,
    /// Split on every single whitespace character and count the resulting empty tokens.
    pub preserve_empty_tokens: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            use_skip_patterns: true,
            use_stop_words: true,
            preserve_empty_tokens: false,
        }
    }
}

/// Local paths of the auxiliary files shipped to every worker.
#[derive(serde::Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FilterFiles {
    pub skip_patterns: Option<PathBuf>,
    pub stop_words: Option<PathBuf>,
}

#[derive(serde::Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    get_configuration_from(&base_path.join("configuration"))
}

pub fn get_configuration_from(config_dir: &Path) -> Result<Settings, config::ConfigError> {
    build_settings(config_dir, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("WORDCOUNT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build_settings(
    config_dir: &Path,
    environment: config::Environment,
) -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(config_dir.join("base.yaml")).required(false))
        .add_source(environment)
        .build()?;
    settings.try_deserialize::<Settings>()
}
