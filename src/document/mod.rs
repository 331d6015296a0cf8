//! Document composition
//!
//! Splices rendered markup and collected head metadata into the built
//! HTML template.

pub mod template;

pub use template::DocumentTemplate;

use crate::error::{PrerenderError, PrerenderResult};
use crate::render::head::{escape_text, HeadState};
use std::ops::Range;

/// Build the final document
///
/// The marker must occur exactly once in `template`. A non-blank rendered
/// title replaces the head's title (removing any duplicates there) or is
/// inserted into the head when it has none. Head tags already present verbatim
/// in the template head are not inserted again.
pub fn compose(
    template: &str,
    markup: &str,
    head: &HeadState,
    marker: &str,
) -> PrerenderResult<String> {
    let found = template.matches(marker).count();
    if found != 1 {
        return Err(PrerenderError::TemplateMarker {
            marker: marker.to_string(),
            found,
        });
    }

    let mut doc = template.to_string();
    let mut insert = String::new();

    if let Some(title) = head.title() {
        let tag = format!("<title>{}</title>", escape_text(title));
        if !replace_titles(&mut doc, &tag) {
            insert.push_str(&tag);
        }
    }

    let existing = head_contents(&doc).unwrap_or_default().to_string();
    for tag in head.serialize_tags() {
        if !existing.contains(&tag) {
            insert.push_str(&tag);
        }
    }

    if !insert.is_empty() {
        insert_into_head(&mut doc, &insert);
    }

    Ok(doc.replacen(marker, markup, 1))
}

/// Find `<name ...>` case-insensitively, returning (start, end of open tag)
fn find_open_tag(lower: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let needle = format!("<{}", name);
    let mut cursor = from;
    while let Some(offset) = lower.get(cursor..)?.find(&needle) {
        let start = cursor + offset;
        let after = start + needle.len();
        match lower[after..].chars().next() {
            Some(c) if c == '>' || c == '/' || c.is_ascii_whitespace() => {
                let end = after + lower[after..].find('>')? + 1;
                return Some((start, end));
            }
            _ => cursor = after,
        }
    }
    None
}

/// Titles inside the document head; body titles (inline SVG) are not matched
fn title_ranges(doc: &str) -> Vec<Range<usize>> {
    let Some(head) = head_range(doc) else {
        return Vec::new();
    };
    let lower = doc[..head.end].to_ascii_lowercase();
    let mut ranges = Vec::new();
    let mut cursor = head.start;
    while let Some((start, open_end)) = find_open_tag(&lower, "title", cursor) {
        let Some(close) = lower[open_end..].find("</title>") else {
            break;
        };
        let end = open_end + close + "</title>".len();
        ranges.push(start..end);
        cursor = end;
    }
    ranges
}

/// Replace the first head title with `tag` and drop the rest
fn replace_titles(doc: &mut String, tag: &str) -> bool {
    let ranges = title_ranges(doc);
    let Some(first) = ranges.first().cloned() else {
        return false;
    };
    for range in ranges.into_iter().skip(1).rev() {
        doc.replace_range(range, "");
    }
    doc.replace_range(first, tag);
    true
}

/// Byte range between `<head ...>` and `</head>`
fn head_range(doc: &str) -> Option<Range<usize>> {
    let lower = doc.to_ascii_lowercase();
    let (_, open_end) = find_open_tag(&lower, "head", 0)?;
    let close = lower[open_end..].find("</head>")?;
    Some(open_end..open_end + close)
}

fn head_contents(doc: &str) -> Option<&str> {
    head_range(doc).map(|range| &doc[range])
}

fn insert_into_head(doc: &mut String, html: &str) {
    let lower = doc.to_ascii_lowercase();
    if let Some((_, open_end)) = find_open_tag(&lower, "head", 0) {
        doc.insert_str(open_end, html);
    } else if let Some((_, open_end)) = find_open_tag(&lower, "html", 0) {
        doc.insert_str(open_end, &format!("<head>{}</head>", html));
    } else {
        doc.insert_str(0, &format!("<head>{}</head>", html));
    }
}
