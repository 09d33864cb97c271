//! Permission grant variants.
//!
//! A [`Grant`] records what a role holds for one resource/action pair.
//! Persisted role rows use a compact wire shape — `true` for an
//! unconditional grant, an object for a conditional one — and the custom
//! serde implementations here keep that shape stable:
//!
//! ```text
//! { "account": { "read": true,
//!                "transfer": { "conditions": {"limit": 500},
//!                              "filter": ["id", "amount"] } } }
//! ```

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// What a role grants, keyed resource → action → [`Grant`].
///
/// `BTreeMap` keeps serialization deterministic, so persisted rows and
/// test fixtures compare byte-for-byte.
pub type RolePermissions = BTreeMap<String, BTreeMap<String, Grant>>;

/// A single resource/action grant held by a role.
///
/// # Variants
///
/// - [`Always`](Self::Always): unconditional grant; wire shape `true`
/// - [`Conditional`](Self::Conditional): the schema-level validator and/or
///   filter for the action must be consulted at evaluation time; wire
///   shape is an object with optional `conditions` and `filter` keys
///
/// Absence of an entry means no grant — there is no `false` variant; a
/// persisted `false` is rejected at deserialization.
///
/// # Example
///
/// ```
/// use warden_core::Grant;
/// use serde_json::json;
///
/// let always: Grant = serde_json::from_value(json!(true)).unwrap();
/// assert!(always.is_always());
///
/// let conditional: Grant =
///     serde_json::from_value(json!({ "conditions": { "limit": 500 } })).unwrap();
/// assert_eq!(
///     conditional.conditions(),
///     Some(&json!({ "limit": 500 }))
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// Unconditional grant.
    Always,
    /// Grant subject to the schema-level validator and/or filter.
    Conditional {
        /// Conditions handed to the schema validator at check time.
        conditions: Option<Value>,
        /// Attribute allowlist overriding the schema-level filter.
        filter: Option<Vec<String>>,
    },
}

impl Grant {
    /// Creates a conditional grant carrying only conditions.
    #[must_use]
    pub fn with_conditions(conditions: Value) -> Self {
        Self::Conditional {
            conditions: Some(conditions),
            filter: None,
        }
    }

    /// Creates a conditional grant carrying only a filter override.
    #[must_use]
    pub fn with_filter<I, S>(filter: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Conditional {
            conditions: None,
            filter: Some(filter.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns `true` for an unconditional grant.
    #[must_use]
    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }

    /// Returns the stored conditions, if any.
    #[must_use]
    pub fn conditions(&self) -> Option<&Value> {
        match self {
            Self::Always => None,
            Self::Conditional { conditions, .. } => conditions.as_ref(),
        }
    }

    /// Returns the stored filter override, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&[String]> {
        match self {
            Self::Always => None,
            Self::Conditional { filter, .. } => filter.as_deref(),
        }
    }

    /// Returns this grant with its conditions replaced.
    ///
    /// An [`Always`](Self::Always) grant becomes conditional; an existing
    /// filter is preserved. Used when merging entity-assignment overrides
    /// onto role-level grants.
    #[must_use]
    pub fn override_conditions(self, conditions: Value) -> Self {
        let filter = match self {
            Self::Always => None,
            Self::Conditional { filter, .. } => filter,
        };
        Self::Conditional {
            conditions: Some(conditions),
            filter,
        }
    }

    /// Returns this grant with its filter replaced.
    ///
    /// An [`Always`](Self::Always) grant becomes conditional; existing
    /// conditions are preserved.
    #[must_use]
    pub fn override_filter(self, filter: Vec<String>) -> Self {
        let conditions = match self {
            Self::Always => None,
            Self::Conditional { conditions, .. } => conditions,
        };
        Self::Conditional {
            conditions,
            filter: Some(filter),
        }
    }
}

impl Serialize for Grant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Always => serializer.serialize_bool(true),
            Self::Conditional { conditions, filter } => {
                let len = usize::from(conditions.is_some()) + usize::from(filter.is_some());
                let mut map = serializer.serialize_map(Some(len))?;
                if let Some(conditions) = conditions {
                    map.serialize_entry("conditions", conditions)?;
                }
                if let Some(filter) = filter {
                    map.serialize_entry("filter", filter)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Grant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GrantVisitor;

        impl<'de> Visitor<'de> for GrantVisitor {
            type Value = Grant;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("`true` or an object with optional `conditions`/`filter`")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Grant, E> {
                if value {
                    Ok(Grant::Always)
                } else {
                    Err(E::custom("a `false` grant is invalid; remove the entry"))
                }
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Grant, A::Error> {
                let mut conditions: Option<Value> = None;
                let mut filter: Option<Vec<String>> = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "conditions" => {
                            if conditions.is_some() {
                                return Err(de::Error::duplicate_field("conditions"));
                            }
                            conditions = Some(map.next_value()?);
                        }
                        "filter" => {
                            if filter.is_some() {
                                return Err(de::Error::duplicate_field("filter"));
                            }
                            filter = Some(map.next_value()?);
                        }
                        other => {
                            return Err(de::Error::unknown_field(
                                other,
                                &["conditions", "filter"],
                            ));
                        }
                    }
                }
                Ok(Grant::Conditional { conditions, filter })
            }
        }

        deserializer.deserialize_any(GrantVisitor)
    }
}
