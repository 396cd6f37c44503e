//! Query tokenization

/// Literal separator between disjunctive query terms
const TERM_SEPARATOR: &str = " OR ";

/// Split a raw query string into its disjunctive terms.
///
/// The separator is matched case-sensitively and must be surrounded by
/// spaces. Terms are trimmed but otherwise preserved: order is kept, and
/// neither duplicates nor empty fragments are removed — an empty fragment
/// matches every record through empty-substring containment, which is the
/// transport layer's problem to prevent, not this function's.
pub fn tokenize_query(query: &str) -> Vec<String> {
    query
        .split(TERM_SEPARATOR)
        .map(|term| term.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_term() {
        assert_eq!(tokenize_query("cancer"), vec!["cancer"]);
    }

    #[test]
    fn test_single_term_is_trimmed() {
        assert_eq!(tokenize_query("  cancer  "), vec!["cancer"]);
    }

    #[test]
    fn test_or_split() {
        assert_eq!(tokenize_query("cancer OR diabetes"), vec!["cancer", "diabetes"]);
    }

    #[test]
    fn test_multiple_terms() {
        assert_eq!(
            tokenize_query("cancer OR diabetes OR cardiac"),
            vec!["cancer", "diabetes", "cardiac"]
        );
    }

    #[test]
    fn test_separator_is_case_sensitive() {
        assert_eq!(tokenize_query("cancer or diabetes"), vec!["cancer or diabetes"]);
    }

    #[test]
    fn test_separator_requires_surrounding_spaces() {
        assert_eq!(tokenize_query("cancer OR"), vec!["cancer OR"]);
        assert_eq!(tokenize_query("ORacle"), vec!["ORacle"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        assert_eq!(tokenize_query("cancer OR cancer"), vec!["cancer", "cancer"]);
    }

    #[test]
    fn test_trailing_separator_yields_empty_term() {
        assert_eq!(tokenize_query("cancer OR "), vec!["cancer", ""]);
    }

    #[test]
    fn test_empty_input_passes_through() {
        assert_eq!(tokenize_query(""), vec![""]);
    }
}
