//! Declarative per-field validation.
//!
//! Each request type declares a [`Schema`]: an ordered list of field rules.
//! Validation never mutates the request and never aborts mid-batch; a rule
//! that panics is converted into an error on its field so one bad validator
//! cannot take down the rest.

use std::panic::{AssertUnwindSafe, catch_unwind};

/// One structured validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// All failures reported against one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    pub field: &'static str,
    pub errors: Vec<ValidationError>,
}

/// A field rule: reads the whole request (sibling fields included, which are
/// always populated before validation runs) and reports zero or more errors.
pub type Validator<R> = fn(&R) -> Vec<ValidationError>;

/// Ordered validation rules for one request type.
pub struct Schema<R> {
    rules: Vec<(&'static str, Validator<R>)>,
}

impl<R> Schema<R> {
    /// An empty schema; validates every request successfully.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule for `field`. Rules run in declaration order.
    pub fn rule(mut self, field: &'static str, validator: Validator<R>) -> Self {
        self.rules.push((field, validator));
        self
    }

    /// Run every rule, aggregating non-empty results per field. An empty
    /// result means the request is valid.
    pub fn validate(&self, request: &R) -> Vec<FieldErrors> {
        self.run(request, None)
    }

    /// Run only the rules declared for `field`.
    pub fn validate_field(&self, request: &R, field: &str) -> Vec<FieldErrors> {
        self.run(request, Some(field))
    }

    fn run(&self, request: &R, only: Option<&str>) -> Vec<FieldErrors> {
        let mut failures = Vec::new();
        for (field, validator) in &self.rules {
            if only.is_some_and(|f| f != *field) {
                continue;
            }
            let errors = match catch_unwind(AssertUnwindSafe(|| validator(request))) {
                Ok(errors) => errors,
                Err(panic) => vec![ValidationError::new("validator_panicked", panic_message(&panic))],
            };
            if !errors.is_empty() {
                failures.push(FieldErrors { field, errors });
            }
        }
        failures
    }
}

impl<R> Default for Schema<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "validator panicked".to_string()
    }
}
