//! Case-insensitive text matchers used to pick sheet names and headers.

pub trait TextMatcher {
    fn is_match(&self, candidate: &str, target: &str) -> bool;

    /// Candidates matching `target`, in their original order.
    fn matches<'a, S: AsRef<str>>(&self, candidates: &'a [S], target: &str) -> Vec<&'a str> {
        candidates
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| self.is_match(c, target))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactTextMatcher;

impl TextMatcher for ExactTextMatcher {
    fn is_match(&self, candidate: &str, target: &str) -> bool {
        candidate.to_lowercase() == target.to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixedTextMatcher;

impl TextMatcher for PrefixedTextMatcher {
    fn is_match(&self, candidate: &str, target: &str) -> bool {
        candidate.to_lowercase().starts_with(&target.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SuffixedTextMatcher;

impl TextMatcher for SuffixedTextMatcher {
    fn is_match(&self, candidate: &str, target: &str) -> bool {
        candidate.to_lowercase().ends_with(&target.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "text.text1.text2.1text.2text.TextA.TextB.AText.BText";

    fn candidates() -> Vec<&'static str> {
        TEXT.split('.').collect()
    }

    #[test]
    fn test_exact_matcher() {
        let items = candidates();
        assert_eq!(ExactTextMatcher.matches(&items, "text"), vec!["text"]);
        assert_eq!(ExactTextMatcher.matches(&items, "text2"), vec!["text2"]);
        assert!(ExactTextMatcher.matches(&items, "none").is_empty());
    }

    #[test]
    fn test_prefixed_matcher() {
        assert_eq!(
            PrefixedTextMatcher.matches(&candidates(), "text"),
            vec!["text", "text1", "text2", "TextA", "TextB"]
        );
    }

    #[test]
    fn test_suffixed_matcher() {
        assert_eq!(
            SuffixedTextMatcher.matches(&candidates(), "text"),
            vec!["text", "1text", "2text", "AText", "BText"]
        );
    }
}
