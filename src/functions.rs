//! src/functions.rs

pub type Key = String;
pub type Count = u64;

/// One input record: a line of text keyed by its byte offset in the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapInput {
    key: u64,
    value: String,
}

impl MapInput {
    pub fn new(key: u64, value: impl Into<String>) -> Self {
        MapInput {
            key,
            value: value.into(),
        }
    }

    pub fn key(&self) -> u64 {
        self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A (word, count) pair, either a partial sum or a final total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct CountRecord {
    word: Key,
    count: Count,
}

impl CountRecord {
    pub fn new(word: impl Into<Key>, count: Count) -> Self {
        CountRecord {
            word: word.into(),
            count,
        }
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn count(&self) -> Count {
        self.count
    }

    pub fn into_parts(self) -> (Key, Count) {
        (self.word, self.count)
    }
}

pub trait MapEmitter {
    fn emit(&mut self, key: Key, value: Count);
}

impl MapEmitter for Vec<CountRecord> {
    fn emit(&mut self, key: Key, value: Count) {
        self.push(CountRecord::new(key, value));
    }
}

pub trait Mapper {
    fn map<E: MapEmitter>(&mut self, input: &MapInput, emitter: &mut E);
}

/// Aggregation shared by the combine and reduce passes. Implementations must be
/// commutative and associative so that reducing partial results equals reducing
/// everything at once.
pub trait Reducer {
    fn reduce<I: IntoIterator<Item = Count>>(&self, key: Key, values: I) -> CountRecord;
}
