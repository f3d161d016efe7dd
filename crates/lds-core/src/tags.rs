//! Free-text tag normalization.
//!
//! Clients send tags as a single whitespace-separated string. Every layer
//! below the HTTP handlers works with the normalized list produced here.

/// Split a whitespace-separated tag string into lowercase, trimmed tokens.
///
/// Runs of whitespace count as one separator. Blank or absent input yields an
/// empty list. Duplicates are kept in input order.
pub fn normalize_tags(tags: Option<&str>) -> Vec<String> {
    let Some(raw) = tags else {
        return Vec::new();
    };

    raw.split_whitespace()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_case_and_padding() {
        assert_eq!(
            normalize_tags(Some("  Foo   BAR baz ")),
            vec!["foo", "bar", "baz"]
        );
    }

    #[test]
    fn test_absent_input() {
        assert!(normalize_tags(None).is_empty());
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(normalize_tags(Some("")).is_empty());
        assert!(normalize_tags(Some("   \t\n ")).is_empty());
    }

    #[test]
    fn test_tabs_and_newlines_separate_tags() {
        assert_eq!(normalize_tags(Some("a\tb\nc")), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        assert_eq!(normalize_tags(Some("cat Cat CAT")), vec!["cat", "cat", "cat"]);
    }

    #[test]
    fn test_unicode_lowercasing() {
        assert_eq!(normalize_tags(Some("ÉTÉ Straße")), vec!["été", "straße"]);
    }
}
