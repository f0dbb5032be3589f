//! tests/api/spec.rs
use claims::{assert_matches, assert_none, assert_ok, assert_some};
use wordcount::configuration::{ClusterSettings, Settings};
use wordcount::error::JobError;
use wordcount::spec::{JobOutput, JobSpecification, OutputFormat};

#[test]
fn you_should_be_able_to_create_a_word_count_spec() {
    let spec = JobSpecification::new(2, 1024);
    assert_eq!(spec.workers(), 2);
    assert_eq!(spec.split_size_in_bytes(), 1024);
    assert_eq!(spec.max_attempts(), 4);
    assert!(spec.use_combiner());
}

#[test]
fn you_should_be_able_to_add_input_to_a_word_count_spec() {
    let mut spec = JobSpecification::new(2, 1024);

    for i in 0..5 {
        spec.add_input(format!("input_{i}.txt"));
    }

    assert_eq!(spec.inputs().len(), 5);
    for (i, input) in spec.inputs().iter().enumerate() {
        assert_eq!(input.to_str(), Some(format!("input_{i}.txt").as_str()));
    }
}

#[test]
fn you_should_be_able_to_define_an_output_on_a_spec() {
    let mut spec = JobSpecification::new(2, 1024);
    spec.add_input("input.txt");

    assert_none!(spec.output());
    assert_matches!(spec.validate(), Err(JobError::InvalidSpecification(_)));

    spec.set_output(JobOutput::new("/root/home/word_counts", 10, OutputFormat::Json));

    let output = assert_some!(spec.output());
    assert_eq!(output.base_path().to_str(), Some("/root/home/word_counts"));
    assert_eq!(output.num_tasks(), 10);
    assert_eq!(output.format(), OutputFormat::Json);
    assert_ok!(spec.validate());
}

#[test]
fn a_spec_without_inputs_is_invalid() {
    let mut spec = JobSpecification::new(2, 1024);
    spec.set_output(JobOutput::new("/tmp/word_counts", 1, OutputFormat::Text));

    assert_matches!(spec.validate(), Err(JobError::InvalidSpecification(_)));
}

#[test]
fn settings_carry_over_into_the_spec() {
    let settings = Settings {
        cluster: ClusterSettings {
            workers: 6,
            reducers: 3,
            split_size_bytes: 4096,
            max_attempts: 2,
            use_combiner: false,
        },
        ..Settings::default()
    };

    let spec = JobSpecification::from_settings(&settings);

    assert_eq!(spec.workers(), 6);
    assert_eq!(spec.split_size_in_bytes(), 4096);
    assert_eq!(spec.max_attempts(), 2);
    assert!(!spec.use_combiner());
    assert_eq!(spec.config(), &settings.job);
}
