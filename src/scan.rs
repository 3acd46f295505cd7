use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Local, NaiveDate};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogIndex, CatalogSource};
use crate::classifier::classify;
use crate::config::MatchingConfig;
use crate::matching::cycle::match_cycle;
use crate::matching::resolver::NameResolver;
use crate::models::{
    CatalogStats, Confidence, CycleSet, MatchResult, PackageRecord, ScanResult, ScanStatus,
};

/// Aggregate statistics for one scanned file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub scan_timestamp: DateTime<Local>,
    pub source_file: String,
    pub total_packages: usize,
    pub skipped_rows: usize,
    pub matched_products: usize,
    pub eol: usize,
    pub active: usize,
    pub unknown: usize,
    pub not_found: usize,
    pub by_confidence: BTreeMap<String, usize>,
    pub catalog: CatalogStats,
}

/// Run every record through resolve → fetch cycles → match → classify.
///
/// Names are resolved first, then cycles are fetched once per distinct product,
/// then matching and classification run against the now read-only index.
/// Returns exactly one result per record, in input order.
pub async fn scan_records<S: CatalogSource>(
    source: &mut S,
    index: &mut CatalogIndex,
    matching: &MatchingConfig,
    records: &[PackageRecord],
    source_file: &str,
    today: NaiveDate,
    progress: Option<&ProgressBar>,
) -> Vec<ScanResult> {
    let resolved: Vec<(Option<String>, Confidence)> = {
        let resolver = NameResolver::new(index, matching);
        records
            .iter()
            .map(|record| {
                let (product, confidence) = resolver.resolve(&record.raw_name);
                (product.map(|p| p.id.clone()), confidence)
            })
            .collect()
    };

    let mut seen = HashSet::new();
    let pending: Vec<&str> = resolved
        .iter()
        .filter_map(|(id, _)| id.as_deref())
        .filter(|id| seen.insert(*id))
        .filter(|id| index.cycles(id).is_none())
        .collect();

    if let Some(pb) = progress {
        pb.set_length(pending.len() as u64);
        pb.set_position(0);
    }
    for id in pending {
        if let Some(pb) = progress {
            pb.set_message(id.to_string());
        }
        index.ensure_cycles(source, id).await;
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    let index: &CatalogIndex = index;
    records
        .iter()
        .zip(&resolved)
        .map(|(record, (id, confidence))| {
            let matched = build_match(index, id.as_deref(), *confidence, &record.raw_version);
            let (status, detail) = classify(&matched, today);

            tracing::debug!(
                "{source_file} row {}: '{}' '{}' -> {} / {} ({}) = {status}",
                record.row_index,
                record.raw_name,
                record.raw_version,
                matched.product.map_or("-", |p| p.id.as_str()),
                matched.cycle.map_or("-", |c| c.label.as_str()),
                matched.confidence,
            );

            ScanResult {
                record: record.clone(),
                product: matched.product.map(|p| p.id.clone()),
                cycle: matched.cycle.map(|c| c.label.clone()),
                confidence: matched.confidence,
                status,
                detail,
                eol_date: matched.cycle.and_then(|c| c.eol.as_ref()).and_then(|m| m.as_date()),
                latest: matched.cycle.and_then(|c| c.latest.clone()),
                release_date: matched.cycle.and_then(|c| c.release_date),
                lts: matched.cycle.is_some_and(|c| c.lts),
                source_file: source_file.to_string(),
            }
        })
        .collect()
}

fn build_match<'a>(
    index: &'a CatalogIndex,
    id: Option<&str>,
    confidence: Confidence,
    raw_version: &str,
) -> MatchResult<'a> {
    let Some(product) = id.and_then(|id| index.lookup(id)) else {
        return MatchResult::unmatched();
    };

    let mut result = MatchResult {
        product: Some(product),
        cycle: None,
        confidence,
        cycles_unavailable: None,
    };
    match index.cycles(&product.id) {
        Some(CycleSet::Known(cycles)) => result.cycle = match_cycle(cycles, raw_version),
        Some(CycleSet::Unavailable(reason)) => result.cycles_unavailable = Some(reason.as_str()),
        None => result.cycles_unavailable = Some("cycles were not fetched"),
    }
    result
}

/// Count results per status and confidence tier.
pub fn summarize(
    results: &[ScanResult],
    skipped_rows: usize,
    source_file: &str,
    scan_timestamp: DateTime<Local>,
    catalog: CatalogStats,
) -> ScanSummary {
    let count = |status: ScanStatus| results.iter().filter(|r| r.status == status).count();

    let mut by_confidence = BTreeMap::new();
    for r in results {
        *by_confidence.entry(r.confidence.to_string()).or_insert(0) += 1;
    }

    let matched_products: BTreeSet<&str> =
        results.iter().filter_map(|r| r.product.as_deref()).collect();

    ScanSummary {
        scan_timestamp,
        source_file: source_file.to_string(),
        total_packages: results.len(),
        skipped_rows,
        matched_products: matched_products.len(),
        eol: count(ScanStatus::Eol),
        active: count(ScanStatus::Active),
        unknown: count(ScanStatus::Unknown),
        not_found: count(ScanStatus::NotFound),
        by_confidence,
        catalog,
    }
}
