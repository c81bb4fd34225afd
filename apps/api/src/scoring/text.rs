use std::collections::BTreeSet;

const STOPWORDS: &[&str] = &[
    "and", "the", "for", "with", "our", "you", "your", "are", "will", "who", "from", "that",
    "this", "have", "has", "into", "role", "team", "work", "job", "all", "any", "can", "its",
];

/// Lower-cased alphanumeric tokens (keeping `+`, `#`, `.` inside words), minus
/// short words and stopwords.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|t| t.trim_matches('.').to_lowercase())
        .filter(|t| t.len() >= 2 && !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// |A ∩ B| / |A ∪ B|, 0 when both are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_stopwords_and_punctuation() {
        let tokens = tokenize("Build the React, Node.js and C++ stack!");
        assert!(tokens.contains("react"));
        assert!(tokens.contains("node.js"));
        assert!(tokens.contains("c++"));
        assert!(!tokens.contains("the"));
        assert!(!tokens.contains("and"));
    }

    #[test]
    fn test_jaccard_identical_is_one() {
        let a = tokenize("senior rust engineer");
        assert_eq!(jaccard(&a, &a), 1.0);
    }

    #[test]
    fn test_jaccard_partial_overlap() {
        let a = tokenize("senior rust engineer");
        let b = tokenize("junior rust engineer");
        assert!((jaccard(&a, &b) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_jaccard_empty_sets_is_zero() {
        assert_eq!(jaccard(&BTreeSet::new(), &BTreeSet::new()), 0.0);
    }
}
