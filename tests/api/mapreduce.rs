//! tests/api/mapreduce.rs
use crate::helpers::{counts, init_test_tracing, read_text_output, small_test_spec, test_data_dir};
use claims::{assert_matches, assert_ok};
use std::collections::BTreeMap;
use std::fs;
use wordcount::configuration::{FilterFiles, JobConfig};
use wordcount::counters::Counter;
use wordcount::error::JobError;
use wordcount::executors::{ParallelExecutor, SequentialExecutor};
use wordcount::mapreduce::MapReduce;
use wordcount::output::SUCCESS_MARKER;
use wordcount::spec::{JobOutput, JobSpecification, OutputFormat};

fn small_test_counts() -> BTreeMap<String, u64> {
    counts([
        ("being", 1),
        ("brown", 1),
        ("chase", 1),
        ("count", 2),
        ("did", 1),
        ("dog", 3),
        ("don't", 1),
        ("fox", 4),
        ("friends", 1),
        ("it's", 1),
        ("jumps", 1),
        ("lazy", 2),
        ("not", 1),
        ("once", 1),
        ("over", 1),
        ("quick", 2),
        ("quoted", 1),
        ("still", 1),
        ("them", 1),
        ("they", 1),
        ("twice", 1),
        ("words", 1),
    ])
}

#[tokio::test]
async fn stop_words_are_excluded_from_the_final_counts() {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("input.txt");
    fs::write(&input, "the quick fox\nthe lazy fox\n").expect("Failed to write input");
    let stop_words = dir.path().join("stop_words.txt");
    fs::write(&stop_words, "the\n").expect("Failed to write stop words");
    let output = dir.path().join("out");

    let mut spec = JobSpecification::new(2, 1024);
    spec.add_input(&input);
    spec.set_output(JobOutput::new(&output, 1, OutputFormat::Text));
    spec.set_filter_files(FilterFiles {
        skip_patterns: None,
        stop_words: Some(stop_words),
    });

    let job = MapReduce::new(spec).expect("Failed to create map reduce job");
    let report = assert_ok!(job.run(&ParallelExecutor).await);

    assert_eq!(
        read_text_output(&output),
        counts([("fox", 2), ("lazy", 1), ("quick", 1)])
    );
    assert_eq!(report.accepted_words(), 4);
    assert!(output.join(SUCCESS_MARKER).exists());
}

#[tokio::test]
async fn should_count_every_accepted_word_across_splits_and_reducers() {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("out");

    let job = MapReduce::new(small_test_spec(&output, 3, 4)).expect("Failed to create job");
    assert!(job.input_splits().len() > 1);
    let report = job.run(&ParallelExecutor).await.expect("Job failed");

    assert_eq!(read_text_output(&output), small_test_counts());
    assert_eq!(report.output_files.len(), 4);
    assert_eq!(report.counters.get(Counter::MapInputRecords), 5);
    assert_eq!(report.counters.get(Counter::InputWords), 30);
    assert_eq!(report.counters.get(Counter::MapOutputRecords), 30);
    assert_eq!(report.counters.get(Counter::ReduceOutputRecords), 22);
    assert_eq!(
        report.records().map(|record| record.count()).sum::<u64>(),
        report.accepted_words()
    );
}

#[tokio::test]
async fn worker_and_reducer_counts_do_not_change_the_result() {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    let sequential_out = dir.path().join("sequential");
    MapReduce::new(small_test_spec(&sequential_out, 1, 1))
        .expect("Failed to create job")
        .run(&SequentialExecutor)
        .await
        .expect("Sequential job failed");

    for (workers, reducers) in [(1, 3), (2, 1), (8, 5)] {
        let output = dir.path().join(format!("parallel-{workers}-{reducers}"));
        let mut spec = small_test_spec(&output, workers, reducers);
        spec.set_combiner(workers % 2 == 0);
        MapReduce::new(spec)
            .expect("Failed to create job")
            .run(&ParallelExecutor)
            .await
            .expect("Parallel job failed");

        assert_eq!(
            read_text_output(&output),
            read_text_output(&sequential_out),
            "{workers} workers, {reducers} reducers"
        );
    }
}

#[tokio::test]
async fn case_sensitive_jobs_keep_the_original_spelling() {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("out");
    let mut spec = small_test_spec(&output, 2, 2);
    spec.set_config(JobConfig {
        case_sensitive: true,
        ..JobConfig::default()
    });

    MapReduce::new(spec)
        .expect("Failed to create job")
        .run(&ParallelExecutor)
        .await
        .expect("Job failed");

    let result = read_text_output(&output);
    assert_eq!(result.get("Don't"), Some(&1));
    assert_eq!(result.get("It's"), Some(&1));
    assert_eq!(result.get("don't"), None);
    // capitalised stop words are still dropped
    assert_eq!(result.get("The"), None);
    assert_eq!(result.get("A"), None);
}

#[tokio::test]
async fn disabling_stop_words_counts_everything() {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("out");
    let mut spec = small_test_spec(&output, 2, 2);
    spec.set_config(JobConfig {
        use_stop_words: false,
        ..JobConfig::default()
    });

    let report = MapReduce::new(spec)
        .expect("Failed to create job")
        .run(&SequentialExecutor)
        .await
        .expect("Job failed");

    let result = read_text_output(&output);
    assert_eq!(result.get("the"), Some(&5));
    assert_eq!(result.get("and"), Some(&2));
    assert_eq!(report.accepted_words(), 43);
}

#[tokio::test]
async fn missing_stop_word_file_degrades_to_no_filtering() {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("out");
    let mut spec = small_test_spec(&output, 2, 1);
    spec.set_filter_files(FilterFiles {
        skip_patterns: None,
        stop_words: Some(dir.path().join("no_such_file.txt")),
    });

    let report = MapReduce::new(spec)
        .expect("Failed to create job")
        .run(&ParallelExecutor)
        .await
        .expect("Job should still succeed");

    assert_eq!(read_text_output(&output).get("the"), Some(&5));
    assert_eq!(report.accepted_words(), 43);
}

#[tokio::test]
async fn skip_patterns_do_not_change_the_counts() {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("out");
    let mut spec = small_test_spec(&output, 2, 2);
    spec.set_filter_files(FilterFiles {
        skip_patterns: Some(test_data_dir().join("skip_patterns.txt")),
        stop_words: Some(test_data_dir().join("stop_words.txt")),
    });

    MapReduce::new(spec)
        .expect("Failed to create job")
        .run(&ParallelExecutor)
        .await
        .expect("Job failed");

    assert_eq!(read_text_output(&output), small_test_counts());
}

#[tokio::test]
async fn json_output_holds_one_record_per_line() {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("out");
    let mut spec = small_test_spec(&output, 2, 1);
    spec.set_output(JobOutput::new(&output, 1, OutputFormat::Json));

    MapReduce::new(spec)
        .expect("Failed to create job")
        .run(&ParallelExecutor)
        .await
        .expect("Job failed");

    let contents =
        fs::read_to_string(output.join("part-r-00000")).expect("Failed to read part file");
    let result: BTreeMap<String, u64> = contents
        .lines()
        .map(|line| {
            let value: serde_json::Value = serde_json::from_str(line).expect("Invalid JSON line");
            let word = value["word"].as_str().expect("Missing word").to_string();
            let count = value["count"].as_u64().expect("Missing count");
            (word, count)
        })
        .collect();
    assert_eq!(result, small_test_counts());
}

#[tokio::test]
async fn directory_inputs_skip_hidden_and_underscore_files() {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let output = dir.path().join("out");
    let mut spec = JobSpecification::new(2, 1024);
    spec.add_input(test_data_dir().join("corpus"));
    spec.set_output(JobOutput::new(&output, 2, OutputFormat::Text));

    MapReduce::new(spec)
        .expect("Failed to create job")
        .run(&ParallelExecutor)
        .await
        .expect("Job failed");

    assert_eq!(
        read_text_output(&output),
        counts([("fox", 2), ("lazy", 1), ("quick", 1)])
    );
}

#[test]
fn should_refuse_an_existing_output_directory() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let spec = small_test_spec(dir.path(), 1, 1);

    assert_matches!(MapReduce::new(spec), Err(JobError::OutputExists(_)));
}

#[tokio::test]
async fn empty_input_writes_empty_part_files() {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("empty.txt");
    fs::write(&input, "").expect("Failed to write input");
    let output = dir.path().join("out");
    let mut spec = JobSpecification::new(3, 1024);
    spec.add_input(&input);
    spec.set_output(JobOutput::new(&output, 2, OutputFormat::Text));

    let report = MapReduce::new(spec)
        .expect("Failed to create job")
        .run(&ParallelExecutor)
        .await
        .expect("Job failed");

    assert_eq!(report.output_files.len(), 2);
    assert!(read_text_output(&output).is_empty());
    assert!(output.join(SUCCESS_MARKER).exists());
}
