//! Rendering of component trees to markup
//!
//! Rendering is synchronous. Components declare data needs through
//! [`RenderContext::use_query`]; unknown needs land in the query cache as
//! pending entries and the component renders its loading state until a
//! later pass has the data.

pub mod head;
pub mod page;
pub mod router;

pub use head::{HeadState, HeadTag, HeadTagKind};
pub use page::PageNode;
pub use router::{RoutePattern, RoutedPage};

use crate::cache::{EntryState, QueryCache, QueryKey};
use crate::error::PrerenderResult;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The path being prerendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub pathname: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
        }
    }
}

/// Settings handed to every component through the render context
#[derive(Debug, Clone, Serialize)]
pub struct RenderOptions {
    /// True while producing static output
    pub prerendering: bool,
    /// Values exposed to pages as `env.*`
    pub vars: BTreeMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            prerendering: true,
            vars: BTreeMap::new(),
        }
    }
}

/// A data need declared by a component
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub key: Option<QueryKey>,
    pub query: String,
    pub variables: Map<String, Value>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            key: None,
            query: query.into(),
            variables: Map::new(),
        }
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(QueryKey::named(key));
        self
    }

    /// Declared key, or one derived from the operation and variables
    pub fn cache_key(&self) -> QueryKey {
        self.key
            .clone()
            .unwrap_or_else(|| QueryKey::derive(&self.query, &self.variables))
    }
}

/// What a component sees for one of its queries
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState {
    /// Not fetched yet
    Loading,
    /// Fetched payload
    Ready(Value),
    /// Will never resolve during this prerender
    Unavailable,
}

/// Per-pass rendering state
pub struct RenderContext<'a> {
    location: &'a Location,
    options: &'a RenderOptions,
    cache: &'a mut QueryCache,
    head: &'a mut HeadState,
    pass: usize,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        location: &'a Location,
        options: &'a RenderOptions,
        cache: &'a mut QueryCache,
        head: &'a mut HeadState,
        pass: usize,
    ) -> Self {
        Self {
            location,
            options,
            cache,
            head,
            pass,
        }
    }

    pub fn location(&self) -> &Location {
        self.location
    }

    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    /// 1-based index of the current render pass
    pub fn pass(&self) -> usize {
        self.pass
    }

    pub fn head(&mut self) -> &mut HeadState {
        &mut *self.head
    }

    /// Declare a data need and get its current state
    pub fn use_query(&mut self, request: QueryRequest) -> QueryState {
        let key = request.cache_key();
        let entry = self
            .cache
            .get_or_insert(key, &request.query, request.variables);
        match &entry.state {
            EntryState::Pending => QueryState::Loading,
            EntryState::Resolved(data) => QueryState::Ready(data.clone()),
            EntryState::Abandoned => QueryState::Unavailable,
        }
    }
}

/// Something that renders to markup
pub trait Component: Send + Sync {
    fn render(&self, cx: &mut RenderContext<'_>) -> PrerenderResult<String>;
}

impl<F> Component for F
where
    F: Fn(&mut RenderContext<'_>) -> PrerenderResult<String> + Send + Sync,
{
    fn render(&self, cx: &mut RenderContext<'_>) -> PrerenderResult<String> {
        self(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn use_query_registers_pending_entry() {
        let location = Location::new("/");
        let options = RenderOptions::default();
        let mut cache = QueryCache::new();
        let mut head = HeadState::new();
        let mut cx = RenderContext::new(&location, &options, &mut cache, &mut head, 1);

        let state = cx.use_query(QueryRequest::new("{ posts { id } }"));
        assert_eq!(state, QueryState::Loading);
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_settled());
    }

    #[test]
    fn use_query_sees_resolved_and_abandoned() {
        let location = Location::new("/");
        let options = RenderOptions::default();
        let mut cache = QueryCache::new();
        let mut head = HeadState::new();

        let a = QueryRequest::new("{ a }").with_key("a");
        let b = QueryRequest::new("{ b }").with_key("b");
        cache.get_or_insert(a.cache_key(), "{ a }", Map::new());
        cache.get_or_insert(b.cache_key(), "{ b }", Map::new());
        cache.resolve(&a.cache_key(), json!({"a": 1}));
        cache.abandon(&b.cache_key());

        let mut cx = RenderContext::new(&location, &options, &mut cache, &mut head, 2);
        assert_eq!(cx.use_query(a), QueryState::Ready(json!({"a": 1})));
        assert_eq!(cx.use_query(b), QueryState::Unavailable);
        assert_eq!(cx.pass(), 2);
    }

    #[test]
    fn derived_keys_match_for_equal_requests() {
        let vars = json!({"id": 1}).as_object().cloned().unwrap();
        let a = QueryRequest::new("query P($id: Int) { p(id: $id) }").with_variables(vars.clone());
        let b = QueryRequest::new("query P($id: Int) { p(id: $id) }").with_variables(vars);
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn closures_are_components() {
        let component = |cx: &mut RenderContext<'_>| -> PrerenderResult<String> {
            cx.head().set_title("Home");
            Ok(format!("<p>{}</p>", cx.location().pathname))
        };

        let location = Location::new("/about");
        let options = RenderOptions::default();
        let mut cache = QueryCache::new();
        let mut head = HeadState::new();
        let mut cx = RenderContext::new(&location, &options, &mut cache, &mut head, 1);

        assert_eq!(component.render(&mut cx).unwrap(), "<p>/about</p>");
        assert_eq!(head.title(), Some("Home"));
    }
}
