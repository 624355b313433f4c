//! Tag list encoding
//!
//! Teams and projects keep their tags in a single text column holding a JSON
//! array. These helpers are the only place that format is produced or read.

/// Trim and lowercase tags, drop empty ones and duplicates (first
/// occurrence wins).
pub fn normalize(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Serialize a normalized tag list for storage.
pub fn encode(tags: &[String]) -> String {
    serde_json::to_string(&normalize(tags)).unwrap_or_else(|_| "[]".to_string())
}

/// Read a stored tag list. Malformed values decode as no tags.
pub fn decode(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_dedups() {
        let tags = vec![
            " rust ".to_string(),
            "".to_string(),
            "web".to_string(),
            "rust".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(normalize(&tags), vec!["rust", "web"]);
    }

    #[test]
    fn normalize_folds_case() {
        let tags = vec!["Rust".to_string(), "rust".to_string(), "WebAssembly".to_string()];
        assert_eq!(normalize(&tags), vec!["rust", "webassembly"]);
    }

    #[test]
    fn encoded_tags_decode_back() {
        let stored = encode(&["axum".to_string(), " sea-orm".to_string()]);
        assert_eq!(stored, r#"["axum","sea-orm"]"#);
        assert_eq!(decode(&stored), vec!["axum", "sea-orm"]);
    }

    #[test]
    fn malformed_column_is_empty() {
        assert!(decode("not json").is_empty());
        assert!(decode("").is_empty());
    }
}
