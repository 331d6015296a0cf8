//! Declarative page trees
//!
//! Pages listed in a route manifest are described as JSON trees of
//! [`PageNode`]s. String fields may contain `{{ path }}` placeholders
//! resolved against the render scope (`params`, `location`, `env` and any
//! data bound by an enclosing `query` or `each` node).

use crate::error::{PrerenderError, PrerenderResult};
use crate::render::head::{escape_attr, escape_text, HeadTag, HeadTagKind};
use crate::render::{Component, QueryRequest, QueryState, RenderContext};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

fn default_data_binding() -> String {
    "data".to_string()
}

fn default_item_binding() -> String {
    "item".to_string()
}

/// One node of a declarative page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageNode {
    /// Interpolated, escaped text
    Text { value: String },

    /// Markup emitted as-is
    Raw { html: String },

    Element {
        tag: String,
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<PageNode>,
    },

    Fragment {
        #[serde(default)]
        children: Vec<PageNode>,
    },

    /// Data cell backed by a GraphQL query
    Query {
        #[serde(default)]
        key: Option<String>,
        query: String,
        #[serde(default)]
        variables: Map<String, Value>,
        #[serde(rename = "as", default = "default_data_binding")]
        binding: String,
        #[serde(default)]
        loading: Vec<PageNode>,
        #[serde(default)]
        empty: Option<Vec<PageNode>>,
        #[serde(default)]
        children: Vec<PageNode>,
    },

    /// Repeat children for every element of an array in scope
    Each {
        items: String,
        #[serde(rename = "as", default = "default_item_binding")]
        binding: String,
        #[serde(default)]
        children: Vec<PageNode>,
    },

    Title { value: String },

    Meta { attrs: BTreeMap<String, String> },

    Link { attrs: BTreeMap<String, String> },

    Script {
        #[serde(default)]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        content: Option<String>,
    },

    Noscript { content: String },
}

impl PageNode {
    /// Render with route params bound under `params`
    pub fn render_with_params(
        &self,
        cx: &mut RenderContext<'_>,
        params: Map<String, Value>,
    ) -> PrerenderResult<String> {
        let scope = json!({
            "params": params,
            "location": cx.location(),
            "env": cx.options().vars,
        });
        self.render_with_scope(cx, &scope)
    }

    pub fn render_with_scope(
        &self,
        cx: &mut RenderContext<'_>,
        scope: &Value,
    ) -> PrerenderResult<String> {
        match self {
            Self::Text { value } => Ok(escape_text(&interpolate(value, scope))),
            Self::Raw { html } => Ok(html.clone()),
            Self::Element {
                tag,
                attrs,
                children,
            } => {
                check_name(cx, "tag", tag)?;
                let mut html = format!("<{}", tag);
                for (name, value) in attrs {
                    check_name(cx, "attribute", name)?;
                    html.push_str(&format!(
                        " {}=\"{}\"",
                        name,
                        escape_attr(&interpolate(value, scope))
                    ));
                }
                if VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str()) {
                    html.push_str(" />");
                    return Ok(html);
                }
                html.push('>');
                html.push_str(&render_all(children, cx, scope)?);
                html.push_str(&format!("</{}>", tag));
                Ok(html)
            }
            Self::Fragment { children } => render_all(children, cx, scope),
            Self::Query {
                key,
                query,
                variables,
                binding,
                loading,
                empty,
                children,
            } => {
                let mut request = QueryRequest::new(query.as_str())
                    .with_variables(bind_variables(variables, scope));
                if let Some(key) = key {
                    request = request.with_key(interpolate(key, scope));
                }

                match cx.use_query(request) {
                    QueryState::Loading | QueryState::Unavailable => {
                        render_all(loading, cx, scope)
                    }
                    QueryState::Ready(data) => match empty {
                        Some(empty) if is_empty_result(&data) => render_all(empty, cx, scope),
                        _ => render_all(children, cx, &bind(scope, binding, data)),
                    },
                }
            }
            Self::Each {
                items,
                binding,
                children,
            } => {
                let Some(values) = lookup(scope, items) else {
                    return Ok(String::new());
                };
                let Value::Array(values) = values else {
                    return Err(PrerenderError::Render {
                        path: cx.location().pathname.clone(),
                        reason: format!("'{}' is not a list", items),
                    });
                };
                let mut html = String::new();
                for value in values {
                    html.push_str(&render_all(children, cx, &bind(scope, binding, value.clone()))?);
                }
                Ok(html)
            }
            Self::Title { value } => {
                cx.head().set_title(interpolate(value, scope));
                Ok(String::new())
            }
            Self::Meta { attrs } => {
                check_attr_names(cx, attrs)?;
                cx.head()
                    .push(HeadTag::new(HeadTagKind::Meta, interpolate_attrs(attrs, scope)));
                Ok(String::new())
            }
            Self::Link { attrs } => {
                check_attr_names(cx, attrs)?;
                cx.head()
                    .push(HeadTag::new(HeadTagKind::Link, interpolate_attrs(attrs, scope)));
                Ok(String::new())
            }
            Self::Script { attrs, content } => {
                check_attr_names(cx, attrs)?;
                let mut tag = HeadTag::new(HeadTagKind::Script, interpolate_attrs(attrs, scope));
                if let Some(content) = content {
                    tag = tag.with_content(interpolate(content, scope));
                }
                cx.head().push(tag);
                Ok(String::new())
            }
            Self::Noscript { content } => {
                cx.head().push(
                    HeadTag::new(HeadTagKind::Noscript, BTreeMap::new())
                        .with_content(interpolate(content, scope)),
                );
                Ok(String::new())
            }
        }
    }
}

impl Component for PageNode {
    fn render(&self, cx: &mut RenderContext<'_>) -> PrerenderResult<String> {
        self.render_with_params(cx, Map::new())
    }
}

fn render_all(
    nodes: &[PageNode],
    cx: &mut RenderContext<'_>,
    scope: &Value,
) -> PrerenderResult<String> {
    let mut html = String::new();
    for node in nodes {
        html.push_str(&node.render_with_scope(cx, scope)?);
    }
    Ok(html)
}

/// Tag and attribute names must match `[A-Za-z][A-Za-z0-9-:]*`
fn is_markup_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':')
}

fn check_name(cx: &RenderContext<'_>, kind: &str, name: &str) -> PrerenderResult<()> {
    if is_markup_name(name) {
        return Ok(());
    }
    Err(PrerenderError::Render {
        path: cx.location().pathname.clone(),
        reason: format!("invalid {} name '{}'", kind, name),
    })
}

fn check_attr_names(
    cx: &RenderContext<'_>,
    attrs: &BTreeMap<String, String>,
) -> PrerenderResult<()> {
    attrs.keys().try_for_each(|name| check_name(cx, "attribute", name))
}

fn bind(scope: &Value, name: &str, value: Value) -> Value {
    let mut scope = scope.clone();
    if let Value::Object(map) = &mut scope {
        map.insert(name.to_string(), value);
    }
    scope
}

/// Null, or an object whose fields are all null or empty collections
fn is_empty_result(data: &Value) -> bool {
    let blank = |v: &Value| match v {
        Value::Null => true,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    };
    match data {
        Value::Object(fields) => fields.values().all(blank),
        other => blank(other),
    }
}

/// Look up a dotted path such as `data.posts.0.title`
fn lookup<'v>(scope: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .try_fold(scope, |value, segment| match value {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replace every `{{ path }}` with its scope value; missing paths render empty
pub fn interpolate(template: &str, scope: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        out.push_str(&rest[..start]);
        let path = &rest[start + 2..start + 2 + len];
        if let Some(value) = lookup(scope, path) {
            out.push_str(&to_text(value));
        }
        rest = &rest[start + 2 + len + 2..];
    }
    out.push_str(rest);
    out
}

fn interpolate_attrs(attrs: &BTreeMap<String, String>, scope: &Value) -> BTreeMap<String, String> {
    attrs
        .iter()
        .map(|(k, v)| (k.clone(), interpolate(v, scope)))
        .collect()
}

/// Single-placeholder strings take the scope value with its JSON type
fn bind_value(value: &Value, scope: &Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            let inner = trimmed
                .strip_prefix("{{")
                .and_then(|t| t.strip_suffix("}}"))
                .filter(|inner| !inner.contains("{{") && !inner.contains("}}"));
            match inner {
                Some(path) => lookup(scope, path).cloned().unwrap_or(Value::Null),
                None => Value::String(interpolate(s, scope)),
            }
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| bind_value(v, scope)).collect()),
        Value::Object(map) => Value::Object(bind_variables(map, scope)),
        other => other.clone(),
    }
}

fn bind_variables(variables: &Map<String, Value>, scope: &Value) -> Map<String, Value> {
    variables
        .iter()
        .map(|(k, v)| (k.clone(), bind_value(v, scope)))
        .collect()
}
