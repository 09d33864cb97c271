//! Per-entity role overrides.
//!
//! An [`EntityAssignment`] links one role to one entity and may narrow or
//! widen that role's conditions and filters for that entity only. The
//! repository owns assignments; a [`Role`] never embeds them. They are
//! joined in at query time: `get_roles` applies each assignment's
//! overrides to a copy of the role *before* the `Access` evaluator is
//! constructed, so the evaluator never knows about the override source.
//!
//! Override keys use `"resource.action"` notation and only retarget
//! entries the role actually grants — an assignment cannot grant an
//! action the role does not hold.

use crate::role::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use warden_types::{EntityId, RoleId};

/// Optional overrides supplied when an entity is added to a role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentOverrides {
    /// Condition overrides keyed by `"resource.action"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<BTreeMap<String, Value>>,
    /// Filter overrides keyed by `"resource.action"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<BTreeMap<String, Vec<String>>>,
}

impl AssignmentOverrides {
    /// Returns `true` if no override is carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_none() && self.filters.is_none()
    }
}

/// Links one role to one entity, with optional per-entity overrides.
///
/// # Lifecycle
///
/// Created when an entity is added to a role, mutated via the
/// repository's `set_conditions`/`set_filters`, deleted when the entity
/// is removed from the role.
///
/// # Example
///
/// ```
/// use warden_core::{EntityAssignment, Grant, Role};
/// use warden_types::{EntityId, RoleId, TenantId};
///
/// let mut role = Role::new(RoleId::new(), TenantId::new(), "viewer");
/// role.permissions
///     .entry("account".to_string())
///     .or_default()
///     .insert("read".to_string(), Grant::Always);
///
/// let mut assignment = EntityAssignment::new(role.role_id, EntityId::new());
/// assignment.set_filter("account.read", ["id", "balance"]);
///
/// let merged = assignment.apply(&role);
/// let grant = merged.grant_for("account", "read").unwrap();
/// assert_eq!(grant.filter(), Some(&["id".to_string(), "balance".to_string()][..]));
///
/// // The original role is untouched; other entities holding it are unaffected.
/// assert!(role.grant_for("account", "read").unwrap().is_always());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAssignment {
    /// The role being assigned.
    pub role_id: RoleId,
    /// The entity holding it.
    pub entity_id: EntityId,
    /// Condition overrides keyed by `"resource.action"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<BTreeMap<String, Value>>,
    /// Filter overrides keyed by `"resource.action"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<BTreeMap<String, Vec<String>>>,
}

impl EntityAssignment {
    /// Creates an assignment with no overrides.
    #[must_use]
    pub fn new(role_id: RoleId, entity_id: EntityId) -> Self {
        Self {
            role_id,
            entity_id,
            conditions: None,
            filters: None,
        }
    }

    /// Creates an assignment carrying the given overrides.
    #[must_use]
    pub fn with_overrides(
        role_id: RoleId,
        entity_id: EntityId,
        overrides: AssignmentOverrides,
    ) -> Self {
        Self {
            role_id,
            entity_id,
            conditions: overrides.conditions,
            filters: overrides.filters,
        }
    }

    /// Sets the condition override for one `"resource.action"` key.
    pub fn set_condition(&mut self, key: impl Into<String>, conditions: Value) {
        self.conditions
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), conditions);
    }

    /// Sets the filter override for one `"resource.action"` key.
    pub fn set_filter<I, S>(&mut self, key: impl Into<String>, filter: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.get_or_insert_with(BTreeMap::new).insert(
            key.into(),
            filter.into_iter().map(Into::into).collect(),
        );
    }

    /// Applies this assignment's overrides to a copy of the role.
    ///
    /// Each `"resource.action"` override replaces the conditions/filter
    /// on the matching grant entry. Keys that do not resolve to an
    /// existing grant are ignored: an assignment adjusts what a role
    /// grants, it never extends it.
    #[must_use]
    pub fn apply(&self, role: &Role) -> Role {
        let mut merged = role.clone();

        if let Some(conditions) = &self.conditions {
            for (key, value) in conditions {
                if let Some((resource, action)) = key.split_once('.') {
                    if let Some(grant) = merged
                        .permissions
                        .get_mut(resource)
                        .and_then(|actions| actions.get_mut(action))
                    {
                        *grant = grant.clone().override_conditions(value.clone());
                    }
                }
            }
        }

        if let Some(filters) = &self.filters {
            for (key, filter) in filters {
                if let Some((resource, action)) = key.split_once('.') {
                    if let Some(grant) = merged
                        .permissions
                        .get_mut(resource)
                        .and_then(|actions| actions.get_mut(action))
                    {
                        *grant = grant.clone().override_filter(filter.clone());
                    }
                }
            }
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::Grant;
    use serde_json::json;
    use warden_types::TenantId;

    fn role_granting(entries: &[(&str, &str, Grant)]) -> Role {
        let mut role = Role::new(RoleId::new(), TenantId::new(), "test");
        for (resource, action, grant) in entries {
            role.permissions
                .entry((*resource).to_string())
                .or_default()
                .insert((*action).to_string(), grant.clone());
        }
        role
    }

    #[test]
    fn condition_override_replaces_role_conditions() {
        let role = role_granting(&[(
            "account",
            "transfer",
            Grant::with_conditions(json!({ "limit": 100 })),
        )]);
        let mut assignment = EntityAssignment::new(role.role_id, EntityId::new());
        assignment.set_condition("account.transfer", json!({ "limit": 900 }));

        let merged = assignment.apply(&role);
        assert_eq!(
            merged.grant_for("account", "transfer").unwrap().conditions(),
            Some(&json!({ "limit": 900 }))
        );
    }

    #[test]
    fn filter_override_preserves_conditions() {
        let role = role_granting(&[(
            "account",
            "read",
            Grant::with_conditions(json!({ "own": true })),
        )]);
        let mut assignment = EntityAssignment::new(role.role_id, EntityId::new());
        assignment.set_filter("account.read", ["id"]);

        let merged = assignment.apply(&role);
        let grant = merged.grant_for("account", "read").unwrap();
        assert_eq!(grant.conditions(), Some(&json!({ "own": true })));
        assert_eq!(grant.filter(), Some(&["id".to_string()][..]));
    }

    #[test]
    fn override_cannot_grant_new_actions() {
        let role = role_granting(&[("account", "read", Grant::Always)]);
        let mut assignment = EntityAssignment::new(role.role_id, EntityId::new());
        assignment.set_condition("account.delete", json!({}));
        assignment.set_filter("ledger.read", ["id"]);

        let merged = assignment.apply(&role);
        assert!(merged.grant_for("account", "delete").is_none());
        assert!(merged.grant_for("ledger", "read").is_none());
    }

    #[test]
    fn apply_leaves_original_role_untouched() {
        let role = role_granting(&[("account", "read", Grant::Always)]);
        let mut assignment = EntityAssignment::new(role.role_id, EntityId::new());
        assignment.set_filter("account.read", ["id"]);

        let _ = assignment.apply(&role);
        assert!(role.grant_for("account", "read").unwrap().is_always());
    }

    #[test]
    fn empty_overrides_report_empty() {
        assert!(AssignmentOverrides::default().is_empty());
        let overrides = AssignmentOverrides {
            filters: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert!(!overrides.is_empty());
    }
}
