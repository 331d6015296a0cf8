//! Document head accumulator
//!
//! Components push title, meta, link, script and noscript tags while
//! rendering. Repeated tags collapse according to their identity so a
//! component rendered twice, or two components agreeing on a tag, produce
//! a single element.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kinds of head elements collected during render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadTagKind {
    Link,
    Meta,
    Script,
    Noscript,
}

impl HeadTagKind {
    pub fn tag_name(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Meta => "meta",
            Self::Script => "script",
            Self::Noscript => "noscript",
        }
    }
}

/// One head element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadTag {
    pub kind: HeadTagKind,
    pub attrs: BTreeMap<String, String>,
    /// Inner content for script and noscript, emitted unescaped
    pub content: Option<String>,
}

impl HeadTag {
    pub fn new(kind: HeadTagKind, attrs: BTreeMap<String, String>) -> Self {
        Self {
            kind,
            attrs,
            content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Identity used for dedupe; tags with equal identity replace each other
    fn identity(&self) -> String {
        let attr = |name: &str| self.attrs.get(name).map(String::as_str);
        match self.kind {
            HeadTagKind::Meta => ["charset", "name", "property", "http-equiv", "itemprop"]
                .iter()
                .find_map(|key| {
                    attr(*key).map(|value| {
                        if *key == "charset" {
                            "meta:charset".to_string()
                        } else {
                            format!("meta:{}={}", key, value.to_ascii_lowercase())
                        }
                    })
                })
                .unwrap_or_else(|| format!("meta:{:?}", self.attrs)),
            HeadTagKind::Link => format!(
                "link:{}|{}|{}",
                attr("rel").unwrap_or_default().to_ascii_lowercase(),
                attr("href").unwrap_or_default(),
                attr("hreflang").unwrap_or_default()
            ),
            HeadTagKind::Script => match attr("src") {
                Some(src) => format!("script:src={}", src),
                None => format!("script:inline={}", self.content.as_deref().unwrap_or_default()),
            },
            HeadTagKind::Noscript => {
                format!("noscript:{}", self.content.as_deref().unwrap_or_default())
            }
        }
    }

    /// Serialize to HTML
    pub fn to_html(&self) -> String {
        let name = self.kind.tag_name();
        let mut html = format!("<{}", name);
        for (key, value) in &self.attrs {
            html.push(' ');
            html.push_str(key);
            html.push_str("=\"");
            html.push_str(&escape_attr(value));
            html.push('"');
        }
        html.push('>');

        match self.kind {
            HeadTagKind::Link | HeadTagKind::Meta => {}
            HeadTagKind::Script | HeadTagKind::Noscript => {
                html.push_str(self.content.as_deref().unwrap_or_default());
                html.push_str("</");
                html.push_str(name);
                html.push('>');
            }
        }
        html
    }
}

/// Head metadata collected by one render pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadState {
    title: Option<String>,
    tags: Vec<HeadTag>,
}

impl HeadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title; the last call wins
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Title, if one was set and is not blank
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Add a tag, replacing an earlier tag with the same identity in place
    pub fn push(&mut self, tag: HeadTag) {
        let identity = tag.identity();
        match self.tags.iter_mut().find(|t| t.identity() == identity) {
            Some(existing) => *existing = tag,
            None => self.tags.push(tag),
        }
    }

    pub fn tags(&self) -> &[HeadTag] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.title().is_none() && self.tags.is_empty()
    }

    /// Serialized tags grouped link, meta, script, noscript
    pub fn serialize_tags(&self) -> Vec<String> {
        [
            HeadTagKind::Link,
            HeadTagKind::Meta,
            HeadTagKind::Script,
            HeadTagKind::Noscript,
        ]
        .iter()
        .flat_map(|kind| {
            self.tags
                .iter()
                .filter(move |tag| tag.kind == *kind)
                .map(HeadTag::to_html)
        })
        .collect()
    }
}

/// Escape text content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value for double-quoted output
pub fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
