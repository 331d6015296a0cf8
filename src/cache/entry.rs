//! Cache entries and their identity

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable identity of a query + variables pair
///
/// Components may name their own key; otherwise it is derived from the
/// operation text and the variables, so re-rendering the same tree yields
/// the same key regardless of render order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryKey(String);

impl QueryKey {
    /// Use a component-declared key verbatim
    pub fn named(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive a key from the operation text and its variables
    ///
    /// `serde_json::Map` keeps keys sorted, so two maps with the same
    /// contents always serialize identically.
    pub fn derive(query: &str, variables: &Map<String, Value>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(query.trim().as_bytes());
        hasher.update([0u8]);
        hasher.update(Value::Object(variables.clone()).to_string().as_bytes());

        let hash = hex::encode(hasher.finalize());
        Self(format!("q-{}", &hash[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolution state of a cache entry
///
/// Entries only ever move from `Pending` to one of the two processed
/// states, never back.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryState {
    /// Discovered during render, not fetched yet
    Pending,
    /// Fetched and classified successfully
    Resolved(Value),
    /// Given up on; renders as a perpetual loading placeholder
    Abandoned,
}

/// One data dependency discovered during rendering
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: QueryKey,
    pub query: String,
    pub variables: Map<String, Value>,
    pub state: EntryState,
}

impl CacheEntry {
    pub fn new(key: QueryKey, query: impl Into<String>, variables: Map<String, Value>) -> Self {
        Self {
            key,
            query: query.into(),
            variables,
            state: EntryState::Pending,
        }
    }

    /// True once the entry was resolved or abandoned
    pub fn has_processed(&self) -> bool {
        !matches!(self.state, EntryState::Pending)
    }

    /// True when the entry should render in a loading state forever
    pub fn render_loading(&self) -> bool {
        matches!(self.state, EntryState::Abandoned)
    }

    /// Resolved payload, if any
    pub fn data(&self) -> Option<&Value> {
        match &self.state {
            EntryState::Resolved(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn derived_key_is_stable_across_variable_order() {
        let query = "query GetPost($id: Int!) { post(id: $id) { id } }";
        let a = QueryKey::derive(query, &vars(json!({"id": 1, "draft": false})));
        let b = QueryKey::derive(query, &vars(json!({"draft": false, "id": 1})));
        assert_eq!(a, b);
    }

    #[test]
    fn derived_key_differs_by_variables() {
        let query = "query GetPost($id: Int!) { post(id: $id) { id } }";
        let a = QueryKey::derive(query, &vars(json!({"id": 1})));
        let b = QueryKey::derive(query, &vars(json!({"id": 2})));
        assert_ne!(a, b);
    }

    #[test]
    fn derived_key_ignores_surrounding_whitespace() {
        let a = QueryKey::derive("  { posts { id } }\n", &Map::new());
        let b = QueryKey::derive("{ posts { id } }", &Map::new());
        assert_eq!(a, b);
    }

    #[test]
    fn flags_follow_state() {
        let mut entry = CacheEntry::new(QueryKey::named("a"), "{ a }", Map::new());
        assert!(!entry.has_processed());
        assert!(!entry.render_loading());
        assert!(entry.data().is_none());

        entry.state = EntryState::Resolved(json!({"a": 1}));
        assert!(entry.has_processed());
        assert!(!entry.render_loading());
        assert_eq!(entry.data(), Some(&json!({"a": 1})));

        entry.state = EntryState::Abandoned;
        assert!(entry.has_processed());
        assert!(entry.render_loading());
        assert!(entry.data().is_none());
    }
}
