//! Validators, rules, rule generation and the validation engine.

mod cache;
mod engine;
mod generator;
mod rule;
mod validators;

pub use cache::VerdictCache;
pub use engine::{ValidationEngine, ValidationResult};
pub use generator::RuleGenerator;
pub use rule::{RuleSet, ValidationRule};
pub use validators::{
    FixedSetValidator, FormatValidator, JsonSchemaValidator, ListValidator,
    NonEmptyStringValidator, Pattern, RangeValidator, RealmPathValidator, TimestampValidator,
    TransactionIdValidator, Validate, Validator, VersionHashValidator,
};
