use std::cmp::Ordering;

use crate::catalog::CatalogIndex;
use crate::config::MatchingConfig;
use crate::models::{CatalogProduct, Confidence};

use super::normalize::{name_variants, normalize, strip_tokens, tokenize, MatchKey};
use super::similarity::similarity;

/// Maps free-form package names to catalog products.
///
/// Tiers are tried in order and the first hit wins:
/// exact normalized id/alias, token variants, then a guarded fuzzy fallback.
pub struct NameResolver<'a> {
    index: &'a CatalogIndex,
    config: &'a MatchingConfig,
}

impl<'a> NameResolver<'a> {
    pub fn new(index: &'a CatalogIndex, config: &'a MatchingConfig) -> Self {
        NameResolver { index, config }
    }

    pub fn resolve(&self, raw_name: &str) -> (Option<&'a CatalogProduct>, Confidence) {
        let normalized = normalize(raw_name);
        if normalized.is_empty() {
            return (None, Confidence::None);
        }

        if let Some(product) = self.index.lookup_normalized(&normalized) {
            return (Some(product), Confidence::Exact);
        }

        for variant in name_variants(raw_name, self.config) {
            let hit = self
                .index
                .lookup_tokens(&variant)
                .or_else(|| self.index.lookup_normalized(&variant.concat()));
            if let Some(product) = hit {
                return (Some(product), Confidence::Normalized);
            }
        }

        match self.fuzzy(raw_name) {
            Some(product) => (Some(product), Confidence::Fuzzy),
            None => (None, Confidence::None),
        }
    }

    /// Best fuzzy candidate, if it clears the threshold and nothing else is close.
    pub fn fuzzy(&self, raw_name: &str) -> Option<&'a CatalogProduct> {
        let ranked = self.fuzzy_scores(raw_name);
        let (top, top_score) = *ranked.first()?;
        let (runner_id, runner_up) = ranked
            .get(1)
            .map_or(("-", 0.0), |(p, s)| (p.id.as_str(), *s));

        if top_score < self.config.fuzzy_threshold {
            return None;
        }
        if top_score - runner_up < self.config.ambiguity_margin {
            tracing::debug!(
                "Ambiguous fuzzy match for '{raw_name}': {} ({top_score:.3}) vs {runner_id} ({runner_up:.3})",
                top.id
            );
            return None;
        }
        Some(top)
    }

    /// Every product scored against the name, best first, ties broken by product id.
    ///
    /// Empty when the name is too short to fuzzy match.
    pub fn fuzzy_scores(&self, raw_name: &str) -> Vec<(&'a CatalogProduct, f64)> {
        let queries = self.fuzzy_queries(raw_name);
        if queries.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(&'a CatalogProduct, f64)> = self
            .index
            .entries()
            .map(|(product, keys)| {
                let best = queries
                    .iter()
                    .flat_map(|q| {
                        keys.iter().map(move |k| {
                            similarity(&q.normalized, &q.tokens, &k.normalized, &k.tokens)
                        })
                    })
                    .fold(0.0_f64, f64::max);
                (product, best)
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        ranked
    }

    /// The plain name and its stripped form, skipping anything under the minimum length.
    fn fuzzy_queries(&self, raw_name: &str) -> Vec<MatchKey> {
        let plain = MatchKey::new(raw_name);
        if plain.normalized.chars().count() < self.config.fuzzy_min_length {
            return Vec::new();
        }

        let stripped_tokens = strip_tokens(tokenize(raw_name), self.config);
        let stripped = MatchKey {
            normalized: stripped_tokens.concat(),
            tokens: stripped_tokens,
        };

        let mut queries = vec![plain];
        if stripped.normalized.chars().count() >= self.config.fuzzy_min_length
            && stripped != queries[0]
        {
            queries.push(stripped);
        }
        queries
    }
}
