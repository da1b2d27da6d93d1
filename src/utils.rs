/// Longest document id Meilisearch accepts
const MAX_ID_LEN: usize = 511;

/// Whether a raw id can be used as a Meilisearch primary key as-is
pub fn is_valid_doc_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Map a caller id onto a primary key the index accepts.
///
/// Valid ids pass through untouched. Anything else (file names with dots,
/// spaces, unicode) is hashed, so the same raw id always lands on the same
/// key and re-indexing it overwrites.
pub fn storage_id(raw: &str) -> String {
    if is_valid_doc_id(raw) {
        return raw.to_string();
    }
    let hash = blake3::hash(raw.as_bytes());
    format!("doc_{}", &hash.to_hex()[..32])
}

/// Lowercased alphanumeric terms of a text
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Collapse every run of whitespace into one space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_id_keeps_valid_ids() {
        assert_eq!(storage_id("1"), "1");
        assert_eq!(storage_id("report_2024-q1"), "report_2024-q1");
    }

    #[test]
    fn test_storage_id_hashes_file_names() {
        let id = storage_id("sales report.xlsx");
        assert!(id.starts_with("doc_"));
        assert_eq!(id.len(), 4 + 32);
        assert!(is_valid_doc_id(&id));
    }

    #[test]
    fn test_storage_id_consistent() {
        assert_eq!(storage_id("a.xlsx"), storage_id("a.xlsx"));
        assert_ne!(storage_id("a.xlsx"), storage_id("b.xlsx"));
    }

    #[test]
    fn test_is_valid_doc_id_limits() {
        assert!(!is_valid_doc_id(""));
        assert!(!is_valid_doc_id(&"a".repeat(512)));
        assert!(is_valid_doc_id(&"a".repeat(511)));
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("What is the capital of France?"),
            vec!["what", "is", "the", "capital", "of", "france"]
        );
        assert!(tokenize("  ?! ").is_empty());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\n b\tc  "), "a b c");
        assert_eq!(collapse_whitespace("\n \t"), "");
    }
}
