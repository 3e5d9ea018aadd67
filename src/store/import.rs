use crate::error::{NavError, Result};
use serde_json::Value;

/// Normalize a user-entered subreddit name: "/r/rust/" -> "rust"
pub fn normalize_sub(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('/');

    let without_prefix = match trimmed.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("r/") => &trimmed[2..],
        _ => trimmed,
    };

    without_prefix.trim_matches('/').trim().to_string()
}

/// Parse an exported list: a JSON array of names, or one name per line
pub fn parse_import(text: &str) -> Result<Vec<String>> {
    let entries = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(name) => Ok(name),
                other => Err(NavError::ImportFailed(format!("entry {} is not a string: {}", i, other))),
            })
            .collect::<Result<Vec<_>>>()?,
        Ok(_) => return Err(NavError::ImportFailed("Imported data is not an array".to_string())),
        Err(_) => text.lines().map(str::to_string).collect(),
    };

    let mut names: Vec<String> = Vec::new();
    for name in entries.iter().map(|e| normalize_sub(e)) {
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sub_prefixes() {
        assert_eq!(normalize_sub("/r/foo"), "foo");
        assert_eq!(normalize_sub("r/bar"), "bar");
        assert_eq!(normalize_sub("R/Bar"), "Bar");
        assert_eq!(normalize_sub("rust"), "rust");
    }

    #[test]
    fn test_normalize_sub_slashes_and_whitespace() {
        assert_eq!(normalize_sub(" /r/baz/ "), "baz");
        assert_eq!(normalize_sub("///r/qux///"), "qux");
        assert_eq!(normalize_sub(""), "");
        assert_eq!(normalize_sub("  "), "");
        assert_eq!(normalize_sub("/r/"), "");
        assert_eq!(normalize_sub(" r/ "), "");
        assert_eq!(normalize_sub("r"), "r");
        assert_eq!(normalize_sub("/r//"), "");
    }

    #[test]
    fn test_normalize_sub_non_ascii() {
        assert_eq!(normalize_sub("ü"), "ü");
        assert_eq!(normalize_sub("r/ünïcode"), "ünïcode");
    }

    #[test]
    fn test_parse_import_json_array() {
        let names = parse_import(r#"["rust", "/r/pics", "rust", ""]"#).unwrap();
        assert_eq!(names, vec!["rust", "pics"]);
    }

    #[test]
    fn test_parse_import_newline_fallback() {
        let names = parse_import("rust\r\n  pics \n\nr/news\n").unwrap();
        assert_eq!(names, vec!["rust", "pics", "news"]);
    }

    #[test]
    fn test_parse_import_rejects_non_arrays() {
        assert!(matches!(parse_import(r#"{"subs": []}"#), Err(NavError::ImportFailed(_))));
        assert!(matches!(parse_import("42"), Err(NavError::ImportFailed(_))));
        assert!(matches!(parse_import(r#"["ok", 1]"#), Err(NavError::ImportFailed(_))));
    }
}
