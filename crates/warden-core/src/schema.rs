//! The declarative permission schema.
//!
//! An [`AccessSchema`] declares which resources and actions exist and
//! attaches an optional [`Validator`] and/or attribute filter to each
//! action. It is built once at startup via [`AccessSchemaBuilder`] and is
//! immutable afterwards; evaluation resolves rules through an explicit
//! `(resource, action)` registry, never by reflecting on dynamic names.
//!
//! Referencing an undeclared resource or action at check time is not a
//! schema error. [`AccessSchema::rule`] simply returns `None` and the
//! evaluator treats the pair as fail-closed.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A schema-declared predicate gating a conditional action grant.
///
/// The function must be total and side-effect free: given the check-time
/// `data` and the grant-time `conditions`, it answers whether the grant
/// applies. The `error` message is surfaced when no grant satisfies it.
///
/// # Example
///
/// ```
/// use warden_core::Validator;
/// use serde_json::json;
///
/// let validator = Validator::new("amount exceeds limit", |data, conditions| {
///     match (data.get("amount"), conditions.get("limit")) {
///         (Some(amount), Some(limit)) => amount.as_f64() <= limit.as_f64(),
///         _ => false,
///     }
/// });
///
/// assert!(validator.validate(&json!({ "amount": 100 }), &json!({ "limit": 500 })));
/// assert!(!validator.validate(&json!({ "amount": 900 }), &json!({ "limit": 500 })));
/// ```
#[derive(Clone)]
pub struct Validator {
    error: String,
    validate: Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>,
}

impl Validator {
    /// Creates a validator from a denial message and a pure predicate.
    pub fn new<F>(error: impl Into<String>, validate: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        Self {
            error: error.into(),
            validate: Arc::new(validate),
        }
    }

    /// The human-readable denial message for this validator.
    #[must_use]
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Runs the predicate over check-time data and grant-time conditions.
    #[must_use]
    pub fn validate(&self, data: &Value, conditions: &Value) -> bool {
        (self.validate)(data, conditions)
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// The declared rule for one action: optional validator, optional filter.
///
/// An action declared with neither is a plain boolean gate.
#[derive(Debug, Clone, Default)]
pub struct ActionRule {
    validator: Option<Validator>,
    filter: Option<Vec<String>>,
}

impl ActionRule {
    /// Creates an empty rule (boolean gate).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a validator to this rule.
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Attaches a schema-level attribute filter to this rule.
    ///
    /// Attribute paths use dot notation (`"profile.email"`).
    #[must_use]
    pub fn with_filter<I, S>(mut self, filter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = Some(filter.into_iter().map(Into::into).collect());
        self
    }

    /// The validator declared for this action, if any.
    #[must_use]
    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// The schema-level filter declared for this action, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&[String]> {
        self.filter.as_deref()
    }
}

/// The immutable resource/action registry.
///
/// # Example
///
/// ```
/// use warden_core::{AccessSchema, ActionRule, Validator};
///
/// let schema = AccessSchema::builder()
///     .allow("account", "read")
///     .action(
///         "account",
///         "transfer",
///         ActionRule::new()
///             .with_validator(Validator::new("over limit", |d, c| {
///                 d.get("amount").and_then(|v| v.as_f64())
///                     <= c.get("limit").and_then(|v| v.as_f64())
///             }))
///             .with_filter(["id", "amount"]),
///     )
///     .build();
///
/// assert!(schema.rule("account", "read").is_some());
/// assert!(schema.rule("account", "close").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AccessSchema {
    resources: BTreeMap<String, BTreeMap<String, ActionRule>>,
}

impl AccessSchema {
    /// Starts building a schema.
    #[must_use]
    pub fn builder() -> AccessSchemaBuilder {
        AccessSchemaBuilder::default()
    }

    /// Looks up the declared rule for a resource/action pair.
    ///
    /// Returns `None` for undeclared pairs; callers treat that as
    /// fail-closed, never as an error.
    #[must_use]
    pub fn rule(&self, resource: &str, action: &str) -> Option<&ActionRule> {
        self.resources.get(resource)?.get(action)
    }

    /// Returns `true` if the resource/action pair is declared.
    #[must_use]
    pub fn declares(&self, resource: &str, action: &str) -> bool {
        self.rule(resource, action).is_some()
    }
}

/// Builder for [`AccessSchema`], consumed by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct AccessSchemaBuilder {
    resources: BTreeMap<String, BTreeMap<String, ActionRule>>,
}

impl AccessSchemaBuilder {
    /// Declares a plain boolean-gate action (no validator, no filter).
    #[must_use]
    pub fn allow(self, resource: impl Into<String>, action: impl Into<String>) -> Self {
        self.action(resource, action, ActionRule::new())
    }

    /// Declares an action with an explicit rule.
    ///
    /// Re-declaring the same resource/action replaces the earlier rule.
    #[must_use]
    pub fn action(
        mut self,
        resource: impl Into<String>,
        action: impl Into<String>,
        rule: ActionRule,
    ) -> Self {
        self.resources
            .entry(resource.into())
            .or_default()
            .insert(action.into(), rule);
        self
    }

    /// Finalizes the schema.
    #[must_use]
    pub fn build(self) -> AccessSchema {
        AccessSchema {
            resources: self.resources,
        }
    }
}
