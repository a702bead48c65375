//! Integration tests for EventShape.

use std::io::Write;
use tempfile::NamedTempFile;

use indexmap::IndexMap;
use serde_json::{json, Value};

use eventshape::validation::RealmPathValidator;
use eventshape::validation::Validate;
use eventshape::{
    EventShape, InferredType, MemorySource, ParameterStatus, ReportBuilder, ReportThresholds,
    RuleGenerator, RuleSet, ShapeConfig, TypeAnalyzer, ValidationEngine, ValidationRule,
};

/// Helper to create a temporary file with given content and suffix.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn jsonl(events: &[Value]) -> String {
    events.iter().map(|e| format!("{}\n", e)).collect()
}

// =============================================================================
// End-to-End Scenarios
// =============================================================================

#[test]
fn test_iso_timestamp_rule_rejects_garbage() {
    let sample = vec![json!("2024-01-15T10:00:00Z"), json!("2024-01-16T11:30:00+00:00")];
    let profile = TypeAnalyzer::new().analyze("created_at", &sample);
    assert_eq!(profile.inferred_type, InferredType::TimestampIso);

    let rule = RuleGenerator::new().generate(&profile);
    assert!(!rule.validate(&json!("not-a-date")));
    assert!(sample.iter().all(|v| rule.validate(v)));
}

#[test]
fn test_small_integer_sample_is_fixed_set() {
    let config = ShapeConfig::default().with_fixed_set_max_distinct(5);
    let sample = vec![json!(1), json!(2), json!(2), json!(3), json!(1)];
    let profile = TypeAnalyzer::with_config(&config).analyze("tier", &sample);

    assert_eq!(profile.inferred_type, InferredType::FixedSet);
    assert_eq!(
        profile.constraints.allowed_values,
        Some(vec!["1".to_string(), "2".to_string(), "3".to_string()])
    );

    let rule = RuleGenerator::with_config(&config).generate(&profile);
    assert!(!rule.validate(&json!(4)));
    assert!(rule.validate(&json!(2)));
}

#[test]
fn test_large_pass_rate_drop_is_broken() {
    let rule = ValidationRule::new(
        "level",
        eventshape::Validator::Range(eventshape::validation::RangeValidator::new(
            Some(0.0),
            Some(100.0),
            false,
        )),
    );
    let rules: RuleSet = vec![rule].into_iter().collect();

    let old_events: Vec<Value> = (0..100)
        .map(|i| json!({"level": if i < 98 { json!(i) } else { json!("bad") }}))
        .collect();
    let new_events: Vec<Value> = (0..100)
        .map(|i| json!({"level": if i < 40 { json!(i) } else { json!(-1) }}))
        .collect();

    let engine = ValidationEngine::new();
    let old = engine
        .validate_source(&rules, &MemorySource::from_json(old_events, 16))
        .unwrap();
    let new = engine
        .validate_source(&rules, &MemorySource::from_json(new_events, 16))
        .unwrap();
    assert!((old["level"].pass_rate - 0.98).abs() < 1e-12);
    assert!((new["level"].pass_rate - 0.40).abs() < 1e-12);

    let thresholds = ReportThresholds {
        acceptance_pass_rate: 0.95,
        degraded_cutoff: 0.70,
        pass_rate_tolerance: 0.05,
    };
    let report = ReportBuilder::new(thresholds).build(&old, &new);
    assert_eq!(report.status("level"), Some(ParameterStatus::Broken));
}

#[test]
fn test_parameter_only_in_new_version() {
    let old = create_test_file(&jsonl(&[json!({"a": 1}), json!({"a": 2})]), ".jsonl");
    let new = create_test_file(
        &jsonl(&[json!({"a": 1, "foo": "x"}), json!({"a": 3, "foo": "y"})]),
        ".jsonl",
    );

    let shape = EventShape::new();
    let report = shape
        .compare(
            shape.open(old.path()).unwrap().as_ref(),
            shape.open(new.path()).unwrap().as_ref(),
        )
        .expect("Comparison failed");

    let foo = report.get("foo").expect("foo is reported");
    assert_eq!(foo.status, ParameterStatus::NewParameter);
    assert_eq!(foo.old.total, 0);
    assert_eq!(report.summary.new_parameters, 1);
}

#[test]
fn test_realm_path_suffix_is_required() {
    let validator = RealmPathValidator {};
    let path = "/data/user/0/com.example.app/files/mongodb-realm/abcdef0123456789abcdef01/abcdef0123456789abcdef02/default.realm";
    assert!(validator.validate(&json!(path)));
    assert!(!validator.validate(&json!(path.trim_end_matches(".realm"))));
}

// =============================================================================
// File Sources
// =============================================================================

#[test]
fn test_csv_versions_compare_consistent() {
    let mut content = String::from("event_id,platform,score,created_at\n");
    for i in 0..100 {
        content.push_str(&format!(
            "EVT-{:05},{},{},2024-03-{:02}T12:00:00Z\n",
            i,
            ["ios", "android", "web"][i % 3],
            i % 40,
            (i % 28) + 1
        ));
    }
    let old = create_test_file(&content, ".csv");
    let new = create_test_file(&content, ".csv");

    let shape = EventShape::new();
    let report = shape
        .compare(
            shape.open(old.path()).unwrap().as_ref(),
            shape.open(new.path()).unwrap().as_ref(),
        )
        .expect("Comparison failed");

    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.consistent, 4);
    assert!(!report.has_broken());
}

#[test]
fn test_tsv_profiles() {
    let content = "session\tduration\n\
                   a1b2c3d4e5f60718293a4b5c6d7e8f90\t12.5\n\
                   0f1e2d3c4b5a69788796a5b4c3d2e1f0\t3\n\
                   00112233445566778899aabbccddeeff\t\n";
    let file = create_test_file(content, ".tsv");

    let shape = EventShape::new();
    let profiles = shape
        .profile_source(shape.open(file.path()).unwrap().as_ref())
        .expect("Profiling failed");

    assert_eq!(profiles["session"].inferred_type, InferredType::FormattedString);
    assert_eq!(profiles["duration"].inferred_type, InferredType::Numeric);
    assert!(profiles["duration"].constraints.null_allowed);
}

#[test]
fn test_type_change_is_detected() {
    let old_events: Vec<Value> = (0..50)
        .map(|i| json!({"user_id": format!("U-{:04}", i), "retries": i % 5}))
        .collect();
    let new_events: Vec<Value> = (0..50)
        .map(|i| json!({"user_id": i, "retries": i % 5}))
        .collect();

    let report = EventShape::new()
        .compare(
            &MemorySource::from_json(old_events, 10),
            &MemorySource::from_json(new_events, 10),
        )
        .unwrap();

    assert_eq!(report.status("user_id"), Some(ParameterStatus::Broken));
    assert_eq!(report.status("retries"), Some(ParameterStatus::Consistent));
    assert_eq!(report.get("user_id").unwrap().validator, "format");
}

#[test]
fn test_removed_parameter() {
    let old = MemorySource::from_json(vec![json!({"a": 1, "gone": "x"})], 10);
    let new = MemorySource::from_json(vec![json!({"a": 1})], 10);

    let report = EventShape::new().compare(&old, &new).unwrap();
    assert_eq!(report.status("gone"), Some(ParameterStatus::RemovedParameter));
}

#[test]
fn test_manual_rules_override() {
    let events: Vec<Value> = (0..20)
        .map(|i| json!({"order_id": format!("ord_{:06}", i)}))
        .collect();
    let source = MemorySource::from_json(events, 8);

    let shape = EventShape::new();
    let mut rules = shape.generate_rules(&shape.profile_source(&source).unwrap());
    let manual = create_test_file(
        r#"{"rules": {"order_id": {"validator": {"kind": "transaction_id", "min_length": 12}}}}"#,
        ".json",
    );
    rules.merge(RuleSet::load(manual.path()).unwrap());

    let report = shape.compare_with_rules(&rules, &source, &source).unwrap();
    let order = report.get("order_id").unwrap();
    assert_eq!(order.validator, "transaction_id");
    assert_eq!(order.old.passed, 0);
    assert_eq!(order.status, ParameterStatus::Broken);
}

#[test]
fn test_config_file_drives_thresholds() {
    let config_file = create_test_file(
        "acceptance_pass_rate = 0.5\ndegraded_cutoff = 0.2\nchunk_size = 7\n",
        ".toml",
    );
    let config = ShapeConfig::from_toml_file(config_file.path()).unwrap();
    assert_eq!(config.chunk_size, 7);
    assert_eq!(config.confidence_threshold, 0.8);

    let shape = EventShape::with_config(config).unwrap();
    let mut old = IndexMap::new();
    let mut new = IndexMap::new();
    let rule = ValidationRule::new(
        "p",
        eventshape::Validator::NonEmptyString(eventshape::validation::NonEmptyStringValidator {}),
    );
    let rules: RuleSet = vec![rule].into_iter().collect();
    let engine = ValidationEngine::new();
    old.extend(engine.validate_batches(
        &rules,
        vec![[("p".to_string(), vec![json!("a"), json!("b")])].into_iter().collect()],
    ));
    new.extend(engine.validate_batches(
        &rules,
        vec![[("p".to_string(), vec![json!("a"), json!(1)])].into_iter().collect()],
    ));

    // 0.5 meets the relaxed acceptance rate but is far below the old rate.
    let report = shape.build_report(&old, &new);
    assert_eq!(report.status("p"), Some(ParameterStatus::Degraded));
}

#[test]
fn test_missing_file_is_an_error() {
    let shape = EventShape::new();
    let source = shape.open("/nonexistent/events.jsonl").unwrap();
    assert!(shape.profile_source(source.as_ref()).is_err());
}
