//! Validation Pipeline
//!
//! A list of rule stages run against a command before it reaches the
//! engine. Every rule runs; all failures are collected into one
//! `DomainError::Validation`. Rules only look at the request and, for
//! time-based checks, the clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::domain::ports::Clock;
use crate::error::{DomainError, FieldViolation, ValidationErrors};

/// A single business-rule check over a request
pub trait Rule<R>: Send + Sync {
    fn check(&self, request: &R) -> Vec<FieldViolation>;
}

/// Predicate rule: reports `message` on `field` when the predicate is false
pub struct Check<R> {
    field: &'static str,
    message: String,
    predicate: Box<dyn Fn(&R) -> bool + Send + Sync>,
}

impl<R> Check<R> {
    pub fn new<F>(field: &'static str, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        Self {
            field,
            message: message.into(),
            predicate: Box::new(predicate),
        }
    }
}

impl<R> Rule<R> for Check<R> {
    fn check(&self, request: &R) -> Vec<FieldViolation> {
        if (self.predicate)(request) {
            Vec::new()
        } else {
            vec![FieldViolation::new(self.field, self.message.clone())]
        }
    }
}

/// Runs the `#[validate(...)]` attributes declared on the request type
pub struct DeclaredConstraints;

impl<R> Rule<R> for DeclaredConstraints
where
    R: Validate,
{
    fn check(&self, request: &R) -> Vec<FieldViolation> {
        let Err(errors) = request.validate() else {
            return Vec::new();
        };

        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldViolation::new(field.clone(), message)
                })
            })
            .collect();
        // field_errors() is a HashMap
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        violations
    }
}

/// Rejects a request whose instant lies before the clock's current time
pub struct NotInPast<R> {
    field: &'static str,
    clock: Arc<dyn Clock>,
    instant: fn(&R) -> DateTime<Utc>,
}

impl<R> NotInPast<R> {
    pub fn new(field: &'static str, clock: Arc<dyn Clock>, instant: fn(&R) -> DateTime<Utc>) -> Self {
        Self {
            field,
            clock,
            instant,
        }
    }
}

impl<R> Rule<R> for NotInPast<R> {
    fn check(&self, request: &R) -> Vec<FieldViolation> {
        if (self.instant)(request) < self.clock.now() {
            vec![FieldViolation::new(self.field, "must not be in the past")]
        } else {
            Vec::new()
        }
    }
}

/// Ordered rule stages for one request type
pub struct ValidationPipeline<R> {
    rules: Vec<Box<dyn Rule<R>>>,
}

impl<R> Default for ValidationPipeline<R> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<R> ValidationPipeline<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule stage
    pub fn rule(mut self, rule: impl Rule<R> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Register a predicate rule
    pub fn check<F>(self, field: &'static str, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
        R: 'static,
    {
        self.rule(Check::new(field, message, predicate))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule; fail with all collected violations
    pub fn validate(&self, request: &R) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::default();
        for rule in &self.rules {
            for violation in rule.check(request) {
                errors.push(violation);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(violations = errors.len(), "Request rejected by validation");
            Err(DomainError::Validation(errors))
        }
    }
}
