//! GraphQL operation helpers

use serde_json::{Map, Value};

/// Name reported for operations without one
pub const ANONYMOUS_OPERATION: &str = "<anonymous>";

/// Extract the name of the first named operation in `query`
///
/// Only looks for `query|mutation|subscription <Name>`; comments and
/// string literals are skipped. Shorthand `{ ... }` operations have no name.
pub fn operation_name(query: &str) -> Option<&str> {
    let mut rest = query;
    loop {
        rest = skip_ignored(rest);
        if rest.is_empty() {
            return None;
        }

        if rest.starts_with('"') {
            rest = skip_string(rest);
            continue;
        }

        let word_len = rest
            .find(|c: char| !is_name_char(c))
            .unwrap_or(rest.len());
        if word_len == 0 {
            let skip = rest.chars().next().map_or(1, char::len_utf8);
            rest = &rest[skip..];
            continue;
        }

        let word = &rest[..word_len];
        rest = &rest[word_len..];
        if matches!(word, "query" | "mutation" | "subscription") {
            let after = skip_ignored(rest);
            let name_len = after
                .find(|c: char| !is_name_char(c))
                .unwrap_or(after.len());
            if name_len > 0 && !after.starts_with(|c: char| c.is_ascii_digit()) {
                return Some(&after[..name_len]);
            }
            return None;
        }
    }
}

/// Operation name for diagnostics, falling back to a placeholder
pub fn display_name(query: &str) -> String {
    operation_name(query)
        .unwrap_or(ANONYMOUS_OPERATION)
        .to_string()
}

/// Request body sent to the handler
pub fn request_body(query: &str, variables: &Map<String, Value>) -> Value {
    let mut body = Map::new();
    body.insert("query".to_string(), Value::String(query.to_string()));
    body.insert("variables".to_string(), Value::Object(variables.clone()));
    if let Some(name) = operation_name(query) {
        body.insert("operationName".to_string(), Value::String(name.to_string()));
    }
    Value::Object(body)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn skip_ignored(mut s: &str) -> &str {
    loop {
        s = s.trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == '\u{feff}');
        if s.starts_with('#') {
            s = s.find('\n').map_or("", |i| &s[i..]);
        } else {
            return s;
        }
    }
}

fn skip_string(s: &str) -> &str {
    if let Some(body) = s.strip_prefix("\"\"\"") {
        return body.find("\"\"\"").map_or("", |i| &body[i + 3..]);
    }

    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return &s[i + 1..],
            _ => escaped = false,
        }
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn named_query() {
        assert_eq!(
            operation_name("query GetPost($id: Int!) { post(id: $id) { id } }"),
            Some("GetPost")
        );
    }

    #[test]
    fn mutation_and_subscription() {
        assert_eq!(operation_name("mutation Save { save }"), Some("Save"));
        assert_eq!(operation_name("subscription OnPost{ post }"), Some("OnPost"));
    }

    #[test]
    fn anonymous_operations() {
        assert_eq!(operation_name("{ posts { id } }"), None);
        assert_eq!(operation_name("query { posts { id } }"), None);
        assert_eq!(display_name("{ posts }"), ANONYMOUS_OPERATION);
    }

    #[test]
    fn skips_comments_and_fragments() {
        let query = r#"
            # query Commented
            fragment PostFields on Post { id }
            query FindPosts { posts { ...PostFields } }
        "#;
        assert_eq!(operation_name(query), Some("FindPosts"));
    }

    #[test]
    fn skips_string_literals() {
        let query = r#"{ search(term: "query Fake") }"#;
        assert_eq!(operation_name(query), None);
    }

    #[test]
    fn body_includes_operation_name() {
        let vars = json!({"id": 1}).as_object().cloned().unwrap();
        let body = request_body("query GetPost($id: Int) { post(id: $id) { id } }", &vars);
        assert_eq!(body["operationName"], "GetPost");
        assert_eq!(body["variables"]["id"], 1);

        let anon = request_body("{ posts { id } }", &Map::new());
        assert!(anon.get("operationName").is_none());
    }
}
