//! Fuzz target for type inference and rule generation.
//!
//! This fuzzer tests that the analyzer and generator:
//! 1. Never panic on any mix of numbers, text and nulls
//! 2. Report a confidence in [0, 1]
//! 3. Generate the same rule set twice for the same sample

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use eventshape::{RuleGenerator, RuleSet, TypeAnalyzer};
use serde_json::Value;

#[derive(Debug, Arbitrary)]
enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    fn into_value(self) -> Value {
        match self {
            RawValue::Null => Value::Null,
            RawValue::Bool(b) => Value::Bool(b),
            RawValue::Integer(n) => Value::from(n),
            RawValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            // Text is also tried as JSON so nested shapes get exercised.
            RawValue::Text(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct AnalyzerInput {
    name: String,
    values: Vec<RawValue>,
}

fuzz_target!(|input: AnalyzerInput| {
    if input.values.len() > 2_000 {
        return;
    }

    let sample: Vec<Value> = input.values.into_iter().map(RawValue::into_value).collect();

    let analyzer = TypeAnalyzer::new();
    let generator = RuleGenerator::new();

    let profile = analyzer.analyze(&input.name, &sample);
    assert!((0.0..=1.0).contains(&profile.confidence));

    let rule = generator.generate(&profile);
    for value in &sample {
        let _ = rule.validate(value);
    }

    let first: RuleSet = vec![rule].into_iter().collect();
    let second: RuleSet = vec![generator.generate(&analyzer.analyze(&input.name, &sample))]
        .into_iter()
        .collect();
    assert_eq!(first.fingerprint().ok(), second.fingerprint().ok());
});
