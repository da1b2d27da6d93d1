use crate::models::{Corpus, GroundingContext, RetrievalResult};

/// Answer for a general question when retrieval finds nothing
pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found.";

/// Refusal mandated by the strict-grounded template, and the spreadsheet
/// corpus's answer when retrieval finds nothing
pub const NOT_FOUND_IN_DOCUMENTS: &str = "The requested information is not found in the documents.";

/// Join passages with newlines, in rank order
pub fn reduce(result: &RetrievalResult) -> GroundingContext {
    GroundingContext(result.passages.join("\n"))
}

/// Fixed answer returned instead of calling the LLM on an empty retrieval
pub fn sentinel_answer(corpus: Corpus) -> &'static str {
    match corpus {
        Corpus::Documents => NO_RELEVANT_INFORMATION,
        Corpus::Spreadsheets => NOT_FOUND_IN_DOCUMENTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_empty() {
        let context = reduce(&RetrievalResult::default());
        assert!(context.is_empty());
    }

    #[test]
    fn test_reduce_preserves_order() {
        let result = RetrievalResult::new(vec!["a".into(), "b".into()]);
        assert_eq!(reduce(&result).as_str(), "a\nb");

        let reversed = RetrievalResult::new(vec!["b".into(), "a".into()]);
        assert_eq!(reduce(&reversed).as_str(), "b\na");
    }

    #[test]
    fn test_reduce_single_passage_unchanged() {
        let result = RetrievalResult::new(vec!["line one\nline two".into()]);
        assert_eq!(reduce(&result).as_str(), "line one\nline two");
    }

    #[test]
    fn test_sentinel_answers() {
        assert_eq!(sentinel_answer(Corpus::Documents), "No relevant information found.");
        assert_eq!(
            sentinel_answer(Corpus::Spreadsheets),
            "The requested information is not found in the documents."
        );
    }
}
