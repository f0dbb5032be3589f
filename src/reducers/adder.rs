//! src/reducers/adder.rs
use crate::functions::{Count, CountRecord, Key, Reducer};

/// Sums every count received for a word.
#[derive(Debug, Default, Clone, Copy)]
pub struct Adder;

impl Adder {
    pub fn sum<I: IntoIterator<Item = Count>>(&self, word: impl Into<Key>, counts: I) -> CountRecord {
        CountRecord::new(word, counts.into_iter().sum())
    }
}

impl Reducer for Adder {
    fn reduce<I: IntoIterator<Item = Count>>(&self, key: Key, values: I) -> CountRecord {
        self.sum(key, values)
    }
}
