//! src/tokenizer.rs
//!
//! Turns one input line into the words that get counted:
//!
//! 1. lower-case the line unless the job is case sensitive,
//! 2. replace every run of characters other than ASCII letters, apostrophes and
//!    whitespace with a single space,
//! 3. drop apostrophes sitting on a word boundary (`'tis'` becomes `tis`, `don't` stays),
//! 4. split on single whitespace characters,
//! 5. drop tokens whose lower-cased form is a stop word.
use crate::configuration::JobConfig;
use crate::filters::FilterSet;
use regex::Regex;
use std::sync::LazyLock;

static NON_WORD_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z'\t\n\x0B\x0C\r ]+").expect("Invalid non-word pattern")
});

static BOUNDARY_APOSTROPHE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\B'\b|\b'\B").expect("Invalid apostrophe pattern"));

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Steps 1 to 3: the line as it is about to be split.
pub fn normalize(line: &str, case_sensitive: bool) -> String {
    let line = if case_sensitive {
        line.to_string()
    } else {
        line.to_lowercase()
    };
    let line = NON_WORD_RUN.replace_all(&line, " ");
    BOUNDARY_APOSTROPHE.replace_all(&line, "").into_owned()
}

/// Tokenizes with the default contract: empty tokens are never produced.
pub fn tokenize<'f>(line: &str, filters: &'f FilterSet, case_sensitive: bool) -> Tokens<'f> {
    Tokens::new(normalize(line, case_sensitive), filters, false)
}

pub fn tokenize_with<'f>(line: &str, filters: &'f FilterSet, config: &JobConfig) -> Tokens<'f> {
    Tokens::new(
        normalize(line, config.case_sensitive),
        filters,
        config.preserve_empty_tokens,
    )
}

/// Lazy iterator over the accepted tokens of one line.
///
/// With `keep_empty` set the split follows the legacy rule: every single separator
/// ends a token, trailing empty tokens are discarded, and an empty line yields one
/// empty token.
#[derive(Debug)]
pub struct Tokens<'f> {
    line: String,
    cursor: usize,
    end: usize,
    finished: bool,
    keep_empty: bool,
    filters: &'f FilterSet,
}

impl<'f> Tokens<'f> {
    fn new(line: String, filters: &'f FilterSet, keep_empty: bool) -> Self {
        let (end, finished) = if keep_empty {
            let end = line.trim_end_matches(is_separator).len();
            (end, end == 0 && !line.is_empty())
        } else {
            (line.len(), false)
        };
        Tokens {
            line,
            cursor: 0,
            end,
            finished,
            keep_empty,
            filters,
        }
    }

    fn next_raw(&mut self) -> Option<&str> {
        if self.finished {
            return None;
        }
        let start = self.cursor;
        let rest = &self.line[start..self.end];
        match rest.find(is_separator) {
            Some(i) => {
                // separators are single-byte ASCII
                self.cursor = start + i + 1;
                Some(&self.line[start..start + i])
            }
            None => {
                self.finished = true;
                Some(&self.line[start..self.end])
            }
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let keep_empty = self.keep_empty;
        let filters = self.filters;
        while let Some(raw) = self.next_raw() {
            if raw.is_empty() && !keep_empty {
                continue;
            }
            if filters.is_stop_word(&raw.to_lowercase()) {
                continue;
            }
            return Some(raw.to_string());
        }
        None
    }
}
