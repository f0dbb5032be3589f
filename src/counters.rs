//! src/counters.rs
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Counter {
    /// Tokens accepted by the tokenizer and emitted by a mapper.
    InputWords,
    MapInputRecords,
    MapOutputRecords,
    CombineOutputRecords,
    ReduceInputGroups,
    ReduceOutputRecords,
    FailedSplitAttempts,
}

impl Counter {
    pub fn name(&self) -> &'static str {
        match self {
            Counter::InputWords => "INPUT_WORDS",
            Counter::MapInputRecords => "MAP_INPUT_RECORDS",
            Counter::MapOutputRecords => "MAP_OUTPUT_RECORDS",
            Counter::CombineOutputRecords => "COMBINE_OUTPUT_RECORDS",
            Counter::ReduceInputGroups => "REDUCE_INPUT_GROUPS",
            Counter::ReduceOutputRecords => "REDUCE_OUTPUT_RECORDS",
            Counter::FailedSplitAttempts => "FAILED_SPLIT_ATTEMPTS",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Monotonic counters owned by one task and summed across tasks by the executor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Counters(BTreeMap<Counter, u64>);

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, counter: Counter, by: u64) {
        *self.0.entry(counter).or_default() += by;
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.0.get(&counter).copied().unwrap_or_default()
    }

    pub fn merge(&mut self, other: &Counters) {
        for (counter, value) in other.iter() {
            self.increment(counter, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Counter, u64)> + '_ {
        self.0.iter().map(|(counter, value)| (*counter, *value))
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (counter, value) in self.iter() {
            writeln!(f, "\t{counter}={value}")?;
        }
        Ok(())
    }
}
