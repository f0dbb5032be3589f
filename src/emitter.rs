//! src/emitter.rs
//!
//! Map output is routed to one of R partitions by key hash, so every occurrence of a
//! word ends up at the same reducer. With a combiner attached, values buffered for a
//! key are collapsed into a partial sum as they pile up and once more when the
//! emitter is finished.
use crate::counters::{Counter, Counters};
use crate::functions::{Count, CountRecord, Key, MapEmitter, Reducer};
use std::collections::HashMap;

/// Buffered values per key before the combiner collapses them.
const COMBINE_THRESHOLD: usize = 64;

/// Polynomial string hash with multiplier 31, reduced modulo the partition count.
/// A count of zero is treated as a single partition.
pub fn partition_for(key: &str, partition_count: usize) -> usize {
    let mut hash = 0usize;

    for byte in key.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(byte as usize);
    }

    hash % partition_count.max(1)
}

pub struct PartitionedEmitter<R> {
    partitions: Vec<HashMap<Key, Vec<Count>>>,
    combiner: Option<R>,
}

impl<R: Reducer> PartitionedEmitter<R> {
    pub fn new(partition_count: usize, combiner: Option<R>) -> Self {
        PartitionedEmitter {
            partitions: (0..partition_count.max(1)).map(|_| HashMap::new()).collect(),
            combiner,
        }
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    fn push(&mut self, key: Key, value: Count) {
        let partition = partition_for(&key, self.partitions.len());
        let values = self.partitions[partition].entry(key).or_default();
        values.push(value);
        if let Some(combiner) = &self.combiner {
            if values.len() >= COMBINE_THRESHOLD {
                collapse(combiner, values);
            }
        }
    }

    /// Moves everything buffered in `other` into this emitter.
    pub fn absorb(&mut self, other: PartitionedEmitter<R>) {
        for partition in other.partitions {
            for (key, values) in partition {
                for value in values {
                    self.push(key.clone(), value);
                }
            }
        }
    }

    /// Runs the final combine pass and returns the records of every partition.
    pub fn finish(self, counters: &mut Counters) -> Vec<Vec<CountRecord>> {
        let combiner = self.combiner;
        self.partitions
            .into_iter()
            .map(|partition| {
                let records: Vec<CountRecord> = match &combiner {
                    Some(combiner) => partition
                        .into_iter()
                        .map(|(key, values)| combiner.reduce(key, values))
                        .collect(),
                    None => partition
                        .into_iter()
                        .flat_map(|(key, values)| {
                            values
                                .into_iter()
                                .map(move |value| CountRecord::new(key.clone(), value))
                        })
                        .collect(),
                };
                if combiner.is_some() {
                    counters.increment(Counter::CombineOutputRecords, records.len() as u64);
                }
                records
            })
            .collect()
    }
}

fn collapse<R: Reducer>(combiner: &R, values: &mut Vec<Count>) {
    let partial = combiner.reduce(Key::new(), values.drain(..)).count();
    values.push(partial);
}

impl<R: Reducer> MapEmitter for PartitionedEmitter<R> {
    fn emit(&mut self, key: Key, value: Count) {
        self.push(key, value);
    }
}
