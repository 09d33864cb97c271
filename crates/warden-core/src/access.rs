//! The request-scoped access evaluator.
//!
//! An [`Access`] holds the schema and the entity's merged role grants for
//! the lifetime of one resolved session. Evaluation is synchronous, pure,
//! and reentrant: `has`/`check` take `&self`, touch no shared mutable
//! state, and are safe to call from arbitrarily many parallel callers.
//!
//! # Evaluation
//!
//! `has(resource, action, data)`:
//!
//! 1. No role carries an entry for the pair → `false` (fail closed; no
//!    denial message, just absence)
//! 2. Any role's entry is a bare `Always` → `true` (short-circuit OR
//!    across roles; order does not matter)
//! 3. When the schema declares no validator for the action, any entry is
//!    satisfied by its presence alone (filter-only actions with no
//!    dynamic rule). With a validator declared, each entry carrying
//!    conditions runs it over `(data, conditions)` and the first success
//!    wins; an entry without conditions cannot satisfy a declared
//!    validator
//! 4. Nothing satisfied → `false`

use crate::grant::Grant;
use crate::permission::Permission;
use crate::role::Role;
use crate::schema::AccessSchema;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// Fallback denial message when the schema declares no validator error.
const GENERIC_DENIAL: &str = "access denied";

/// Evaluates an entity's merged role grants against the schema.
///
/// Construction is cheap and per-request: the role set has already been
/// loaded (and entity-assignment overrides merged in) by the repository.
/// The evaluator is immutable after construction.
///
/// # Example
///
/// ```
/// use warden_core::{Access, AccessSchema, Grant, Role};
/// use warden_types::{RoleId, TenantId};
/// use std::sync::Arc;
///
/// let schema = Arc::new(AccessSchema::builder().allow("account", "read").build());
///
/// let mut reader = Role::new(RoleId::new(), TenantId::new(), "reader");
/// reader.permissions
///     .entry("account".to_string())
///     .or_default()
///     .insert("read".to_string(), Grant::Always);
/// let empty = Role::new(RoleId::new(), TenantId::new(), "empty");
///
/// // OR semantics across roles: one grant is enough.
/// let access = Access::new(schema, vec![empty, reader]);
/// assert!(access.check("account", "read", None).is_granted());
/// assert!(!access.check("account", "create", None).is_granted());
/// ```
#[derive(Debug, Clone)]
pub struct Access {
    schema: Arc<AccessSchema>,
    assignments: Vec<Role>,
}

impl Access {
    /// Creates an evaluator over an entity's resolved role set.
    #[must_use]
    pub fn new(schema: Arc<AccessSchema>, assignments: Vec<Role>) -> Self {
        Self {
            schema,
            assignments,
        }
    }

    /// The roles this evaluator was constructed over.
    #[must_use]
    pub fn assignments(&self) -> &[Role] {
        &self.assignments
    }

    /// Answers whether the entity may perform `action` on `resource`.
    ///
    /// `data` is the check-time payload handed to schema validators; pass
    /// `None` for actions with no dynamic rule.
    #[must_use]
    pub fn has(&self, resource: &str, action: &str, data: Option<&Value>) -> bool {
        let entries: Vec<&Grant> = self
            .assignments
            .iter()
            .filter_map(|role| role.grant_for(resource, action))
            .collect();

        if entries.is_empty() {
            debug!(resource, action, "no grant for pair, denying");
            return false;
        }

        if entries.iter().any(|grant| grant.is_always()) {
            trace!(resource, action, "unconditional grant");
            return true;
        }

        let Some(validator) = self
            .schema
            .rule(resource, action)
            .and_then(|rule| rule.validator())
        else {
            // No validator declared for the action: presence of an entry
            // is the only gate (filter-only actions).
            trace!(resource, action, "no validator declared, entry grants");
            return true;
        };

        // A declared validator gates every conditional entry. Entries
        // without conditions give it nothing to check and cannot grant.
        for grant in &entries {
            if let Some(conditions) = grant.conditions() {
                if validator.validate(data.unwrap_or(&Value::Null), conditions) {
                    trace!(resource, action, "validator satisfied");
                    return true;
                }
            }
        }

        debug!(resource, action, "no assignment satisfied the validator");
        false
    }

    /// Resolves the pair to a full [`Permission`] verdict.
    ///
    /// On denial the message is the schema validator's error for the
    /// action, falling back to a generic message. On grant the verdict
    /// carries the merged attribute filter, if any applies.
    #[must_use]
    pub fn check(&self, resource: &str, action: &str, data: Option<&Value>) -> Permission {
        if !self.has(resource, action, data) {
            let message = self
                .schema
                .rule(resource, action)
                .and_then(|rule| rule.validator())
                .map_or(GENERIC_DENIAL, |validator| validator.error());
            return Permission::denied(message);
        }
        Permission::granted(self.merged_filter(resource, action))
    }

    /// Merges the applicable attribute filter for a granted pair.
    ///
    /// Any role carrying an explicit filter override contributes its
    /// attributes to a cumulative **union** and disables the schema-level
    /// fallback: an entity holding two roles sees the union of what
    /// either permits, never the intersection. With no override, the
    /// schema-level filter (if declared) is used unmodified. `None` means
    /// no projection — the full object passes through.
    fn merged_filter(&self, resource: &str, action: &str) -> Option<Vec<String>> {
        let mut union: BTreeSet<String> = BTreeSet::new();
        let mut overridden = false;

        for role in &self.assignments {
            if let Some(filter) = role.grant_for(resource, action).and_then(Grant::filter) {
                overridden = true;
                union.extend(filter.iter().cloned());
            }
        }

        if overridden {
            return Some(union.into_iter().collect());
        }

        self.schema
            .rule(resource, action)
            .and_then(|rule| rule.filter())
            .map(<[String]>::to_vec)
    }
}
