//! src/filters.rs
use crate::configuration::JobConfig;
use crate::file_splitter::LossyLines;
use anyhow::Context;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Exclusion sets loaded once per worker and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    skip_patterns: HashSet<String>,
    stop_words: HashSet<String>,
}

impl FilterSet {
    pub fn new<P, S>(skip_patterns: P, stop_words: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        FilterSet {
            skip_patterns: skip_patterns.into_iter().map(Into::into).collect(),
            stop_words: stop_words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_stop_words<S>(stop_words: S) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self::new(Vec::<String>::new(), stop_words)
    }

    /// Loads the enabled filter files, one entry per line.
    ///
    /// A file that is missing or unreadable is logged and leaves its set empty; the
    /// job carries on with weaker filtering rather than failing.
    #[tracing::instrument(name = "Load filter files", skip(config))]
    pub fn load(
        skip_patterns_path: Option<&Path>,
        stop_words_path: Option<&Path>,
        config: &JobConfig,
    ) -> Self {
        let skip_patterns = if config.use_skip_patterns {
            load_or_empty("skip-pattern", skip_patterns_path)
        } else {
            HashSet::new()
        };
        let stop_words = if config.use_stop_words {
            load_or_empty("stop-word", stop_words_path)
        } else {
            HashSet::new()
        };
        FilterSet {
            skip_patterns,
            stop_words,
        }
    }

    /// Loaded but not consulted by the tokenizer.
    pub fn skip_patterns(&self) -> &HashSet<String> {
        &self.skip_patterns
    }

    pub fn stop_words(&self) -> &HashSet<String> {
        &self.stop_words
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }
}

fn load_or_empty(kind: &str, path: Option<&Path>) -> HashSet<String> {
    let Some(path) = path else {
        tracing::warn!("No {kind} file configured, continuing without it");
        return HashSet::new();
    };
    match read_entries(path) {
        Ok(entries) => {
            tracing::info!(
                entries = entries.len(),
                "Loaded {kind} file {}",
                path.display()
            );
            entries
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                "Caught exception while parsing the cached {kind} file, continuing without it"
            );
            HashSet::new()
        }
    }
}

fn read_entries(path: &Path) -> Result<HashSet<String>, anyhow::Error> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open filter file: {}", path.display()))?;
    LossyLines::new(BufReader::new(file), 0)
        .map(|line| {
            line.map(|(_, entry)| entry)
                .with_context(|| format!("Failed to read filter file: {}", path.display()))
        })
        .collect()
}
