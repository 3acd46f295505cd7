use crate::config::MatchingConfig;

/// Lowercase and drop every non-alphanumeric character: `Node.js` → `nodejs`.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lowercase tokens split on any separator: `Spring_Boot-starter` → `[spring, boot, starter]`.
pub fn tokenize(raw: &str) -> Vec<String> {
    raw.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Precomputed comparison forms of one catalog id or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchKey {
    pub normalized: String,
    pub tokens: Vec<String>,
}

impl MatchKey {
    pub fn new(raw: &str) -> Self {
        MatchKey {
            normalized: normalize(raw),
            tokens: tokenize(raw),
        }
    }
}

/// Token sequences to try, in order, when the plain normalized name did not match.
///
/// Bases are the whole name, the part after a vendor namespace (`org.foo:bar` → `bar`)
/// and an npm scope (`@angular/core` → `angular`). Each base is then tried as-is,
/// with namespace/qualifier/numeric tokens stripped, and finally loosened
/// (`lib` prefix and trailing digits removed).
pub fn name_variants(raw: &str, config: &MatchingConfig) -> Vec<Vec<String>> {
    let lower = raw.trim().to_lowercase();
    let mut bases = vec![lower.clone()];

    if let Some(idx) = lower.rfind(['/', ':']) {
        let tail = &lower[idx + 1..];
        if !tail.is_empty() {
            bases.push(tail.to_string());
        }
    }
    if let Some((scope, _)) = lower.strip_prefix('@').and_then(|rest| rest.split_once('/')) {
        if !scope.is_empty() {
            bases.push(scope.to_string());
        }
    }

    let mut variants: Vec<Vec<String>> = Vec::new();
    for base in &bases {
        push_unique(&mut variants, tokenize(base));
    }
    for base in &bases {
        let stripped = strip_tokens(tokenize(base), config);
        push_unique(&mut variants, stripped.clone());
        push_unique(&mut variants, loosen(stripped));
    }
    variants.retain(|v| !v.is_empty());
    variants
}

fn push_unique(variants: &mut Vec<Vec<String>>, candidate: Vec<String>) {
    if !variants.contains(&candidate) {
        variants.push(candidate);
    }
}

/// Drop numeric tokens, leading namespace tokens and trailing qualifier tokens.
///
/// Never strips the last remaining token.
pub fn strip_tokens(mut tokens: Vec<String>, config: &MatchingConfig) -> Vec<String> {
    if tokens.iter().any(|t| !is_numeric(t)) {
        tokens.retain(|t| !is_numeric(t));
    }
    while tokens.len() > 1 && config.strip_prefixes.iter().any(|p| *p == tokens[0]) {
        tokens.remove(0);
    }
    while tokens.len() > 1
        && tokens
            .last()
            .is_some_and(|last| config.strip_suffixes.iter().any(|s| s == last))
    {
        tokens.pop();
    }
    tokens
}

/// Remove a `lib` prefix from the first token and trailing digits from the last.
fn loosen(mut tokens: Vec<String>) -> Vec<String> {
    if let Some(first) = tokens.first_mut() {
        if let Some(rest) = first.strip_prefix("lib") {
            if rest.len() >= 2 {
                *first = rest.to_string();
            }
        }
    }
    if let Some(last) = tokens.last_mut() {
        let trimmed = last.trim_end_matches(|c: char| c.is_ascii_digit());
        if !trimmed.is_empty() && trimmed.len() != last.len() {
            *last = trimmed.to_string();
        }
    }
    tokens
}

fn is_numeric(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Node.js"), "nodejs");
        assert_eq!(normalize(" Spring-Boot "), "springboot");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Spring_Boot-starter"), v(&["spring", "boot", "starter"]));
        assert_eq!(tokenize("python3.11"), v(&["python3", "11"]));
    }

    #[test]
    fn test_strip_tokens() {
        let cfg = MatchingConfig::default();
        assert_eq!(strip_tokens(v(&["redis", "server"]), &cfg), v(&["redis"]));
        assert_eq!(strip_tokens(v(&["openjdk", "17", "jre"]), &cfg), v(&["openjdk"]));
        assert_eq!(strip_tokens(v(&["python", "django"]), &cfg), v(&["django"]));
        // the last token always survives
        assert_eq!(strip_tokens(v(&["server"]), &cfg), v(&["server"]));
        assert_eq!(strip_tokens(v(&["17"]), &cfg), v(&["17"]));
    }

    #[test]
    fn test_variants_order() {
        let cfg = MatchingConfig::default();
        let variants = name_variants("python3.11", &cfg);
        assert_eq!(variants[0], v(&["python3", "11"]));
        assert_eq!(variants[1], v(&["python3"]));
        assert_eq!(variants[2], v(&["python"]));
    }

    #[test]
    fn test_variants_namespace_and_scope() {
        let cfg = MatchingConfig::default();
        let maven = name_variants("org.apache.tomcat:tomcat", &cfg);
        assert!(maven.contains(&v(&["tomcat"])));

        let npm = name_variants("@angular/core", &cfg);
        assert_eq!(npm[0], v(&["angular", "core"]));
        assert!(npm.contains(&v(&["angular"])));
    }

    #[test]
    fn test_loosen_lib_prefix() {
        let cfg = MatchingConfig::default();
        let variants = name_variants("libcurl4", &cfg);
        assert!(variants.contains(&v(&["curl"])));
    }
}
