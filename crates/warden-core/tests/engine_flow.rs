//! End-to-end engine flow: repository → roles → Access → projection.

use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use warden_core::{
    Access, AccessSchema, ActionRule, AssignmentOverrides, Grant, MemoryRoleRepository, NewRole,
    RoleRepository, Validator,
};
use warden_types::{EntityId, TenantId};

fn banking_schema() -> Arc<AccessSchema> {
    Arc::new(
        AccessSchema::builder()
            .allow("account", "read")
            .allow("account", "create")
            .action(
                "account",
                "transfer",
                ActionRule::new().with_validator(Validator::new(
                    "transfer exceeds the granted limit",
                    |data, conditions| {
                        let amount = data.get("amount").and_then(serde_json::Value::as_f64);
                        let limit = conditions.get("limit").and_then(serde_json::Value::as_f64);
                        matches!((amount, limit), (Some(a), Some(l)) if a <= l)
                    },
                )),
            )
            .build(),
    )
}

#[tokio::test]
async fn two_roles_or_semantics() {
    let schema = banking_schema();
    let tenant = TenantId::new();
    let repo = MemoryRoleRepository::new();

    let reader = repo
        .add_role(NewRole::new(tenant, "reader"))
        .await
        .unwrap()
        .update()
        .grant("account", "read")
        .commit(&repo)
        .await
        .unwrap();
    let ledger_only = repo
        .add_role(NewRole::new(tenant, "ledger-only"))
        .await
        .unwrap()
        .update()
        .grant("ledger", "read")
        .commit(&repo)
        .await
        .unwrap();

    let entity = EntityId::new();
    repo.add_entity(&reader.role_id, &entity, AssignmentOverrides::default())
        .await
        .unwrap();
    repo.add_entity(&ledger_only.role_id, &entity, AssignmentOverrides::default())
        .await
        .unwrap();

    let roles = repo.get_roles(&tenant, &entity).await.unwrap();
    let access = Access::new(schema, roles);

    assert!(access.check("account", "read", None).is_granted());
    assert!(!access.check("account", "create", None).is_granted());
    assert!(access.has("ledger", "read", None));
}

#[tokio::test]
async fn entity_override_changes_one_entity_only() {
    let schema = banking_schema();
    let tenant = TenantId::new();
    let repo = MemoryRoleRepository::new();

    let role = repo
        .add_role(NewRole::new(tenant, "teller"))
        .await
        .unwrap()
        .update()
        .grant_with(
            "account",
            "transfer",
            Grant::with_conditions(json!({ "limit": 100 })),
        )
        .commit(&repo)
        .await
        .unwrap();

    let junior = EntityId::new();
    let senior = EntityId::new();
    repo.add_entity(&role.role_id, &junior, AssignmentOverrides::default())
        .await
        .unwrap();
    repo.add_entity(&role.role_id, &senior, AssignmentOverrides::default())
        .await
        .unwrap();
    repo.set_conditions(
        &role.role_id,
        &senior,
        BTreeMap::from([("account.transfer".to_string(), json!({ "limit": 10_000 }))]),
    )
    .await
    .unwrap();

    let payment = json!({ "amount": 5_000 });

    let junior_access = Access::new(
        Arc::clone(&schema),
        repo.get_roles(&tenant, &junior).await.unwrap(),
    );
    assert!(!junior_access.has("account", "transfer", Some(&payment)));

    let senior_access = Access::new(schema, repo.get_roles(&tenant, &senior).await.unwrap());
    assert!(senior_access.has("account", "transfer", Some(&payment)));
}

#[tokio::test]
async fn union_filter_law_with_projection() {
    let schema = Arc::new(
        AccessSchema::builder()
            .action("account", "read", ActionRule::new().with_filter(["a", "b", "c"]))
            .build(),
    );
    let tenant = TenantId::new();
    let repo = MemoryRoleRepository::new();
    let entity = EntityId::new();

    for filter in [vec!["a".to_string()], vec!["a".to_string(), "b".to_string()]] {
        let role = repo
            .add_role(NewRole::new(tenant, "partial"))
            .await
            .unwrap()
            .update()
            .grant("account", "read")
            .commit(&repo)
            .await
            .unwrap();
        repo.add_entity(&role.role_id, &entity, AssignmentOverrides::default())
            .await
            .unwrap();
        repo.set_filters(
            &role.role_id,
            &entity,
            BTreeMap::from([("account.read".to_string(), filter)]),
        )
        .await
        .unwrap();
    }

    let access = Access::new(schema, repo.get_roles(&tenant, &entity).await.unwrap());
    let permission = access.check("account", "read", None);
    assert!(permission.is_granted());

    let mut attributes = permission.attributes().unwrap().to_vec();
    attributes.sort();
    assert_eq!(attributes, vec!["a".to_string(), "b".to_string()]);

    let projected = permission.filter(&json!({ "a": 1, "b": 2, "c": 3 }));
    assert_eq!(projected, json!({ "a": 1, "b": 2 }));
}
