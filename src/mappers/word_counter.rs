//! src/mappers/word_counter.rs
use crate::configuration::JobConfig;
use crate::counters::{Counter, Counters};
use crate::filters::FilterSet;
use crate::functions::{MapEmitter, MapInput, Mapper};
use crate::tokenizer::tokenize_with;
use std::sync::Arc;

/// Emits `(word, 1)` for every accepted token of a line.
pub struct WordCountMapper {
    filters: Arc<FilterSet>,
    config: JobConfig,
    counters: Counters,
}

impl WordCountMapper {
    pub fn new(filters: Arc<FilterSet>, config: JobConfig) -> Self {
        WordCountMapper {
            filters,
            config,
            counters: Counters::new(),
        }
    }

    pub fn process_record<E: MapEmitter>(&mut self, line: &str, emitter: &mut E) {
        for word in tokenize_with(line, &self.filters, &self.config) {
            emitter.emit(word, 1);
            self.counters.increment(Counter::InputWords, 1);
            self.counters.increment(Counter::MapOutputRecords, 1);
        }
    }

    /// Accepted input words seen by this mapper so far.
    pub fn accepted_words(&self) -> u64 {
        self.counters.get(Counter::InputWords)
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn into_counters(self) -> Counters {
        self.counters
    }
}

impl Mapper for WordCountMapper {
    fn map<E: MapEmitter>(&mut self, input: &MapInput, emitter: &mut E) {
        self.counters.increment(Counter::MapInputRecords, 1);
        self.process_record(input.value(), emitter);
    }
}
