//! Route patterns and routed pages
//!
//! Patterns look like `/posts/{id:Int}` or `/docs/{path...}`. Matching a
//! location yields typed params which pages can interpolate and pass as
//! query variables.

use crate::error::{PrerenderError, PrerenderResult};
use crate::render::page::PageNode;
use crate::render::{Component, RenderContext};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Declared type of a route param
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Int,
    Float,
    Boolean,
}

impl ParamType {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "String" => Some(Self::String),
            "Int" => Some(Self::Int),
            "Float" => Some(Self::Float),
            "Boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    fn convert(&self, raw: &str) -> Option<Value> {
        match self {
            Self::String => Some(Value::String(raw.to_string())),
            Self::Int => raw.parse::<i64>().ok().map(Value::from),
            Self::Float => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            Self::Boolean => match raw {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Param { name: String, ty: ParamType },
    Glob { name: String },
}

/// Parsed route pattern
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> PrerenderResult<Self> {
        let invalid = |reason: &str| PrerenderError::RoutePattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let parts: Vec<&str> = split_path(pattern).collect();
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
                if part.contains('{') || part.contains('}') {
                    return Err(invalid("params must span a whole segment"));
                }
                segments.push(Segment::Literal((*part).to_string()));
                continue;
            };

            if let Some(name) = inner.strip_suffix("...") {
                if i + 1 != parts.len() {
                    return Err(invalid("glob params must be the last segment"));
                }
                segments.push(Segment::Glob {
                    name: valid_name(name).ok_or_else(|| invalid("bad param name"))?,
                });
                continue;
            }

            let (name, ty) = match inner.split_once(':') {
                Some((name, ty)) => (
                    name,
                    ParamType::parse(ty).ok_or_else(|| invalid("unknown param type"))?,
                ),
                None => (inner, ParamType::String),
            };
            segments.push(Segment::Param {
                name: valid_name(name).ok_or_else(|| invalid("bad param name"))?,
                ty,
            });
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn has_params(&self) -> bool {
        self.segments
            .iter()
            .any(|s| !matches!(s, Segment::Literal(_)))
    }

    /// Match a pathname, returning its typed params
    pub fn matches(&self, pathname: &str) -> Option<Map<String, Value>> {
        let path = pathname.split(['?', '#']).next().unwrap_or_default();
        let parts: Vec<&str> = split_path(path).collect();
        let mut params = Map::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    if parts.get(i) != Some(&literal.as_str()) {
                        return None;
                    }
                }
                Segment::Param { name, ty } => {
                    let value = ty.convert(parts.get(i)?)?;
                    params.insert(name.clone(), value);
                }
                Segment::Glob { name } => {
                    let rest = parts.get(i..).unwrap_or_default().join("/");
                    params.insert(name.clone(), Value::String(rest));
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn valid_name(name: &str) -> Option<String> {
    let ok = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    ok.then(|| name.to_string())
}

/// A page bound to the route pattern it is served under
pub struct RoutedPage {
    pattern: RoutePattern,
    page: PageNode,
}

impl RoutedPage {
    pub fn new(pattern: RoutePattern, page: PageNode) -> Self {
        Self { pattern, page }
    }
}

impl Component for RoutedPage {
    fn render(&self, cx: &mut RenderContext<'_>) -> PrerenderResult<String> {
        let params = self
            .pattern
            .matches(&cx.location().pathname)
            .ok_or_else(|| PrerenderError::RouteNotMatched {
                pattern: self.pattern.to_string(),
                path: cx.location().pathname.clone(),
            })?;
        self.page.render_with_params(cx, params)
    }
}
