//! src/lib.rs
pub mod configuration;
pub mod counters;
pub mod emitter;
pub mod error;
pub mod executors;
pub mod file_splitter;
pub mod filters;
pub mod functions;
pub mod mappers;
pub mod mapreduce;
pub mod output;
pub mod reducers;
pub mod spec;
pub mod telemetry;
pub mod tokenizer;
pub mod worker;
