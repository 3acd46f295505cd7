//! The EOL catalog: product list, alias index and lazily fetched cycles.
//!
//! - [`CatalogIndex`]: the read-only product index plus a write-once cycle store.
//! - [`CatalogSource`]: where products and cycles come from.
//! - [`client`]: the endoflife.date HTTP source, paced and retried.
//! - [`cache`]: explicit on-disk response cache with TTL.
//! - [`aliases`]: built-in alternate names for common products.

pub mod aliases;
pub mod cache;
pub mod client;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::error::CatalogError;
use crate::matching::normalize::MatchKey;
use crate::models::{CatalogProduct, CatalogStats, Cycle, CycleSet};

use aliases::builtin_aliases;

/// A provider of catalog data.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    /// Every product slug the catalog knows about.
    async fn product_list(&mut self) -> Result<Vec<String>, CatalogError>;

    /// Release cycles for one product.
    async fn product_cycles(&mut self, product: &str) -> Result<Vec<Cycle>, CatalogError>;

    /// Request counters so far.
    fn stats(&self) -> CatalogStats {
        CatalogStats::default()
    }
}

/// Product index built once per run.
///
/// Products, aliases and lookup maps never change after construction. Cycle
/// lists are filled in lazily, once per product; the first write wins.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    products: Vec<CatalogProduct>,
    keys: Vec<Vec<MatchKey>>,
    by_normalized: HashMap<String, usize>,
    by_tokens: HashMap<Vec<String>, usize>,
    cycles: HashMap<String, CycleSet>,
}

impl CatalogIndex {
    /// Fetch the product list and build the index. Any failure here is fatal to the run.
    pub async fn load<S: CatalogSource>(
        source: &mut S,
        extra_aliases: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self, CatalogError> {
        let ids = source.product_list().await?;
        let index = Self::from_products(ids, extra_aliases);
        if index.is_empty() {
            return Err(CatalogError::EmptyProductList);
        }
        tracing::info!("Catalog loaded: {} products", index.len());
        Ok(index)
    }

    /// Build an index from product slugs plus configured aliases.
    ///
    /// Slugs are lowercased, deduplicated and sorted. Ids claim lookup keys
    /// before any alias does, and the first claim on a key wins.
    pub fn from_products<I>(ids: I, extra_aliases: &BTreeMap<String, Vec<String>>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let ids: BTreeSet<String> = ids
            .into_iter()
            .map(|id| id.trim().to_lowercase())
            .filter(|id| !id.is_empty())
            .collect();

        let mut index = CatalogIndex::default();

        for id in ids {
            let mut aliases: BTreeSet<String> = builtin_aliases(&id)
                .iter()
                .map(|a| a.to_string())
                .collect();
            if let Some(extra) = extra_aliases.get(&id) {
                aliases.extend(extra.iter().map(|a| a.trim().to_lowercase()));
            }
            aliases.retain(|a| !a.is_empty() && *a != id);

            let mut keys = vec![MatchKey::new(&id)];
            keys.extend(aliases.iter().map(|a| MatchKey::new(a)));

            index.products.push(CatalogProduct { id, aliases });
            index.keys.push(keys);
        }

        // Pass 1: ids. Pass 2: aliases.
        for pass in 0..2 {
            for (idx, keys) in index.keys.iter().enumerate() {
                let slice = if pass == 0 { &keys[..1] } else { &keys[1..] };
                for key in slice {
                    if !key.normalized.is_empty() {
                        index.by_normalized.entry(key.normalized.clone()).or_insert(idx);
                    }
                    if !key.tokens.is_empty() {
                        index.by_tokens.entry(key.tokens.clone()).or_insert(idx);
                    }
                }
            }
        }

        index
    }

    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Lookup by canonical slug. Products are kept sorted by id.
    pub fn lookup(&self, id: &str) -> Option<&CatalogProduct> {
        self.products
            .binary_search_by(|p| p.id.as_str().cmp(id))
            .ok()
            .map(|i| &self.products[i])
    }

    /// O(1) lookup by normalized id or alias (`nodejs`, `postgres`).
    pub fn lookup_normalized(&self, normalized: &str) -> Option<&CatalogProduct> {
        self.by_normalized.get(normalized).map(|&i| &self.products[i])
    }

    /// Lookup by exact token sequence of an id or alias (`[spring, boot]`).
    pub fn lookup_tokens(&self, tokens: &[String]) -> Option<&CatalogProduct> {
        self.by_tokens.get(tokens).map(|&i| &self.products[i])
    }

    /// Products paired with the comparison keys of their id and aliases, in index order.
    pub fn entries(&self) -> impl Iterator<Item = (&CatalogProduct, &[MatchKey])> {
        self.products
            .iter()
            .zip(self.keys.iter().map(Vec::as_slice))
    }

    /// Cycles for `id`, fetching them on first access.
    ///
    /// A failed fetch is recorded as [`CycleSet::Unavailable`] and never retried
    /// within the run.
    pub async fn ensure_cycles<S: CatalogSource>(&mut self, source: &mut S, id: &str) -> &CycleSet {
        if !self.cycles.contains_key(id) {
            let set = match source.product_cycles(id).await {
                Ok(cycles) => CycleSet::Known(dedup_labels(cycles)),
                Err(e) => {
                    tracing::warn!("Cycle data for '{id}' unavailable: {e}");
                    CycleSet::Unavailable(e.to_string())
                }
            };
            self.insert_cycles(id, set);
        }
        &self.cycles[id]
    }

    /// Store cycles for a product unless some are already stored. Returns whether it was stored.
    pub fn insert_cycles(&mut self, id: &str, set: CycleSet) -> bool {
        if self.cycles.contains_key(id) {
            return false;
        }
        self.cycles.insert(id.to_string(), set);
        true
    }

    pub fn cycles(&self, id: &str) -> Option<&CycleSet> {
        self.cycles.get(id)
    }

    /// Products whose cycle fetch failed, sorted.
    pub fn unavailable_products(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .cycles
            .iter()
            .filter(|(_, set)| matches!(set, CycleSet::Unavailable(_)))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

/// Keep the first cycle for each label.
fn dedup_labels(cycles: Vec<Cycle>) -> Vec<Cycle> {
    let mut seen = HashSet::new();
    cycles
        .into_iter()
        .filter(|c| seen.insert(c.label.clone()))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::testing::StaticCatalog;
    use super::*;

    fn no_aliases() -> BTreeMap<String, Vec<String>> {
        BTreeMap::new()
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_index_dedups_and_sorts() {
        let index = CatalogIndex::from_products(ids(&["python", "Nodejs", "python", " "]), &no_aliases());
        let slugs: Vec<&str> = index.products().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(slugs, vec!["nodejs", "python"]);
    }

    #[test]
    fn test_lookup_by_id_and_alias() {
        let index = CatalogIndex::from_products(ids(&["nodejs", "postgresql"]), &no_aliases());
        assert_eq!(index.lookup("nodejs").unwrap().id, "nodejs");
        assert!(index.lookup("node").is_none());
        assert_eq!(index.lookup_normalized("node").unwrap().id, "nodejs");
        assert_eq!(index.lookup_normalized("postgres").unwrap().id, "postgresql");
    }

    #[test]
    fn test_builtin_alias_ignored_for_absent_product() {
        let index = CatalogIndex::from_products(ids(&["python"]), &no_aliases());
        assert!(index.lookup_normalized("node").is_none());
    }

    #[test]
    fn test_ids_win_over_aliases() {
        // "apache" is a built-in alias of apache-http-server but also a product id here.
        let index = CatalogIndex::from_products(ids(&["apache-http-server", "apache"]), &no_aliases());
        assert_eq!(index.lookup_normalized("apache").unwrap().id, "apache");
    }

    #[test]
    fn test_configured_aliases() {
        let mut extra = BTreeMap::new();
        extra.insert("nginx".to_string(), vec!["Engine-X".to_string()]);
        let index = CatalogIndex::from_products(ids(&["nginx"]), &extra);
        assert_eq!(index.lookup_normalized("enginex").unwrap().id, "nginx");
        let tokens = vec!["engine".to_string(), "x".to_string()];
        assert_eq!(index.lookup_tokens(&tokens).unwrap().id, "nginx");
    }

    #[tokio::test]
    async fn test_load_fails_on_empty_list() {
        let mut source = StaticCatalog::new(&[]);
        let err = CatalogIndex::load(&mut source, &no_aliases()).await.unwrap_err();
        assert!(matches!(err, CatalogError::EmptyProductList));
    }

    #[tokio::test]
    async fn test_load_propagates_list_failure() {
        let mut source = StaticCatalog::new(&["python"]);
        source.fail_list = true;
        assert!(CatalogIndex::load(&mut source, &no_aliases()).await.is_err());
    }

    #[tokio::test]
    async fn test_cycles_fetched_once() {
        let mut source = StaticCatalog::new(&["python"])
            .with_cycles("python", vec![Cycle::new("3.12"), Cycle::new("3.8")]);
        let mut index = CatalogIndex::load(&mut source, &no_aliases()).await.unwrap();

        index.ensure_cycles(&mut source, "python").await;
        let set = index.ensure_cycles(&mut source, "python").await;
        assert!(matches!(set, CycleSet::Known(c) if c.len() == 2));
        assert_eq!(source.cycle_calls["python"], 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_degrades_product() {
        let mut source = StaticCatalog::new(&["python", "ruby"]).failing("ruby");
        let mut index = CatalogIndex::load(&mut source, &no_aliases()).await.unwrap();

        let set = index.ensure_cycles(&mut source, "ruby").await;
        assert!(matches!(set, CycleSet::Unavailable(_)));
        assert_eq!(index.unavailable_products(), vec!["ruby".to_string()]);

        // no retry within the run
        index.ensure_cycles(&mut source, "ruby").await;
        assert_eq!(source.cycle_calls["ruby"], 1);
    }

    #[test]
    fn test_insert_cycles_is_write_once() {
        let mut index = CatalogIndex::from_products(ids(&["go"]), &no_aliases());
        assert!(index.insert_cycles("go", CycleSet::Known(vec![Cycle::new("1.22")])));
        assert!(!index.insert_cycles("go", CycleSet::Known(vec![])));
        assert!(matches!(index.cycles("go"), Some(CycleSet::Known(c)) if c.len() == 1));
    }

    #[test]
    fn test_dedup_labels_keeps_first() {
        let cycles = vec![
            Cycle::new("14").with_latest("14.21.3"),
            Cycle::new("14").with_latest("14.0.0"),
            Cycle::new("16"),
        ];
        let deduped = dedup_labels(cycles);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].latest.as_deref(), Some("14.21.3"));
    }
}
