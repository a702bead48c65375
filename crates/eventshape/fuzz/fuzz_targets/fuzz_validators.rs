//! Fuzz target for the validator catalog.
//!
//! This fuzzer tests that every validator:
//! 1. Never panics on any raw value, structured or not
//! 2. Returns the same verdict twice for the same value

#![no_main]

use libfuzzer_sys::fuzz_target;
use eventshape::schema::TimestampFormat;
use eventshape::validation::{
    FixedSetValidator, FormatValidator, JsonSchemaValidator, ListValidator,
    NonEmptyStringValidator, RangeValidator, RealmPathValidator, TimestampValidator,
    TransactionIdValidator, Validate, Validator, VersionHashValidator,
};
use serde_json::Value;

fn catalog() -> Vec<Validator> {
    vec![
        Validator::Range(RangeValidator::new(Some(-1.0), Some(1.0), false)),
        Validator::FixedSet(FixedSetValidator::new(["a", "b"])),
        Validator::List(ListValidator::new(
            Some(Validator::NonEmptyString(NonEmptyStringValidator {})),
            None,
        )),
        Validator::JsonSchema(
            JsonSchemaValidator::new(vec!["id".to_string()])
                .with_nested("ctx", JsonSchemaValidator::new(vec!["os".to_string()])),
        ),
        Validator::Timestamp(TimestampValidator::new(TimestampFormat::Iso8601, None, None)),
        Validator::Timestamp(TimestampValidator::new(TimestampFormat::UnixSeconds, None, None)),
        Validator::Timestamp(TimestampValidator::new(TimestampFormat::UnixMillis, None, None)),
        Validator::Format(FormatValidator::new(r"[a-z]+\d{2,4}").expect("valid pattern")),
        Validator::NonEmptyString(NonEmptyStringValidator {}),
        Validator::TransactionId(TransactionIdValidator::default()),
        Validator::RealmPath(RealmPathValidator {}),
        Validator::VersionHash(VersionHashValidator {}),
    ]
}

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Both the raw string and, when it decodes, the structured value.
    let mut values = vec![Value::String(text.to_string())];
    if let Ok(decoded) = serde_json::from_str::<Value>(text) {
        values.push(decoded);
    }

    for validator in catalog() {
        for value in &values {
            let first = validator.validate(value);
            let second = validator.validate(value);
            assert_eq!(first, second, "{} is not deterministic", validator.kind());
        }
    }
});
