//! Named, schema-validated authorization guards.
//!
//! A [`Guard`] handles one-off authorization decisions that do not fit
//! the resource/action model — "does this entity manage that entity",
//! "is this invite still open". Each guard pairs an input-schema
//! predicate over untrusted input with an arbitrary async predicate
//! consulting external state.
//!
//! Guards never error outward. Validation failure, an unknown guard
//! name, and a panicking predicate all normalize to `false`; detail goes
//! to the log, never to the caller.

use futures_util::FutureExt as _;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

type ValidateFn = dyn Fn(&Value) -> bool + Send + Sync;
type CheckFn = dyn Fn(Value) -> futures_util::future::BoxFuture<'static, bool> + Send + Sync;

/// A named predicate over schema-validated untrusted input.
///
/// # Example
///
/// ```
/// use warden_session::Guard;
/// use serde_json::{json, Value};
///
/// let current = "entity-7".to_string();
/// let guard = Guard::new(
///     "entity:own",
///     |input: &Value| input.get("id").is_some_and(Value::is_string),
///     move |input: Value| {
///         let current = current.clone();
///         async move { input["id"] == json!(current) }
///     },
/// );
/// assert_eq!(guard.name(), "entity:own");
/// ```
pub struct Guard {
    name: String,
    validate: Arc<ValidateFn>,
    check: Arc<CheckFn>,
}

impl Guard {
    /// Creates a guard from a name, an input-schema predicate, and an
    /// async check predicate.
    ///
    /// `validate` gates untrusted input; `check` only ever sees input
    /// that passed it. `check` should be side-effect free; its errors
    /// are its own to swallow — a panic is caught and treated as `false`.
    pub fn new<V, C, F>(name: impl Into<String>, validate: V, check: C) -> Self
    where
        V: Fn(&Value) -> bool + Send + Sync + 'static,
        C: Fn(Value) -> F + Send + Sync + 'static,
        F: Future<Output = bool> + Send + 'static,
    {
        Self {
            name: name.into(),
            validate: Arc::new(validate),
            check: Arc::new(move |input| check(input).boxed()),
        }
    }

    /// The name this guard is registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, raw: &Value) -> bool {
        if !(self.validate)(raw) {
            warn!(guard = %self.name, "input failed schema validation");
            return false;
        }
        match AssertUnwindSafe((self.check)(raw.clone()))
            .catch_unwind()
            .await
        {
            Ok(verdict) => verdict,
            Err(_) => {
                error!(guard = %self.name, "guard predicate panicked, treating as denial");
                false
            }
        }
    }
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A fixed, name-keyed set of guards built once at construction.
///
/// Lookup is by exact name; an unknown name resolves to `false`, never
/// an error.
///
/// # Example
///
/// ```
/// use warden_session::{Guard, GuardRegistry};
/// use serde_json::{json, Value};
///
/// # async fn demo() {
/// let registry = GuardRegistry::new([Guard::new(
///     "invite:open",
///     |input: &Value| input.get("code").is_some(),
///     |input: Value| async move { input["code"] == json!("friends") },
/// )]);
///
/// assert!(registry.check("invite:open", &json!({ "code": "friends" })).await);
/// assert!(!registry.check("invite:open", &json!({})).await);
/// assert!(!registry.check("no:such:guard", &json!({})).await);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct GuardRegistry {
    guards: HashMap<String, Guard>,
}

impl GuardRegistry {
    /// Builds a registry from a fixed guard list.
    ///
    /// A duplicate name keeps the later guard.
    #[must_use]
    pub fn new(guards: impl IntoIterator<Item = Guard>) -> Self {
        Self {
            guards: guards
                .into_iter()
                .map(|guard| (guard.name.clone(), guard))
                .collect(),
        }
    }

    /// Returns `true` if a guard is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.guards.contains_key(name)
    }

    /// The number of registered guards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Returns `true` if no guards are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Runs the named guard over untrusted input.
    ///
    /// All failure modes — unknown name, input failing the guard's
    /// schema, the predicate returning `false` or panicking — produce
    /// `false`. Nothing is surfaced to the caller beyond the verdict.
    pub async fn check(&self, name: &str, raw: &Value) -> bool {
        match self.guards.get(name) {
            Some(guard) => guard.run(raw).await,
            None => {
                debug!(guard = name, "unknown guard name, denying");
                false
            }
        }
    }
}
