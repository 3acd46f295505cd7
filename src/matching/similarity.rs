//! String similarity used by the fuzzy tier of name resolution.
//!
//! Scores are in `0.0..=1.0` and symmetric in their arguments.

use std::collections::HashSet;

use strsim::{jaro_winkler, normalized_damerau_levenshtein};

/// Character-level similarity: mean of Jaro-Winkler and normalized Damerau-Levenshtein.
pub fn char_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    (jaro_winkler(a, b) + normalized_damerau_levenshtein(a, b)) / 2.0
}

/// Jaccard index over token sets. Catches reordered names (`boot-spring`).
pub fn token_similarity(a: &[String], b: &[String]) -> f64 {
    let set_a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let set_b: HashSet<&str> = b.iter().map(String::as_str).collect();

    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

/// Combined score: the better of the character and token measures.
pub fn similarity(a_norm: &str, a_tokens: &[String], b_norm: &str, b_tokens: &[String]) -> f64 {
    char_similarity(a_norm, b_norm).max(token_similarity(a_tokens, b_tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split('-').map(str::to_string).collect()
    }

    #[test]
    fn test_identical() {
        assert!((char_similarity("django", "django") - 1.0).abs() < 1e-9);
        assert!((token_similarity(&toks("spring-boot"), &toks("spring-boot")) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_transposition_scores_high() {
        assert!(char_similarity("djnago", "django") > 0.85);
    }

    #[test]
    fn test_unrelated_scores_low() {
        assert!(char_similarity("django", "kubernetes") < 0.5);
        assert!(char_similarity("totallyunknownpkg", "tomcat") < 0.6);
    }

    #[test]
    fn test_symmetric() {
        let a = char_similarity("postgres", "postgresql");
        let b = char_similarity("postgresql", "postgres");
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_token_reorder() {
        assert!((token_similarity(&toks("boot-spring"), &toks("spring-boot")) - 1.0).abs() < 1e-9);
        assert!(token_similarity(&toks("spring-boot-starter"), &toks("spring-boot")) < 0.7);
        assert_eq!(token_similarity(&[], &toks("x")), 0.0);
    }
}
