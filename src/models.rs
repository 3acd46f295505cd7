use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A canonical product from the EOL catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    /// Catalog slug, e.g. `nodejs`.
    pub id: String,
    /// Alternate names that resolve to this product.
    pub aliases: BTreeSet<String>,
}

/// A date-or-boolean lifecycle milestone as published by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Milestone {
    Date(NaiveDate),
    Flag(bool),
    /// Present but neither a boolean nor an ISO date.
    Unpublished(String),
}

impl Milestone {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Milestone::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// One release cycle of a product.
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    pub label: String,
    pub release_date: Option<NaiveDate>,
    pub eol: Option<Milestone>,
    pub support: Option<Milestone>,
    pub latest: Option<String>,
    pub lts: bool,
}

#[cfg(test)]
impl Cycle {
    /// A bare cycle with only a label, for building fixtures.
    pub fn new(label: impl Into<String>) -> Self {
        Cycle {
            label: label.into(),
            release_date: None,
            eol: None,
            support: None,
            latest: None,
            lts: false,
        }
    }

    pub fn with_eol(mut self, eol: Milestone) -> Self {
        self.eol = Some(eol);
        self
    }

    pub fn with_support(mut self, support: Milestone) -> Self {
        self.support = Some(support);
        self
    }

    pub fn with_latest(mut self, latest: impl Into<String>) -> Self {
        self.latest = Some(latest.into());
        self
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn lts(mut self) -> Self {
        self.lts = true;
        self
    }
}

/// Cycle data held by the catalog index for one product.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleSet {
    Known(Vec<Cycle>),
    /// The fetch failed; the reason is kept for reporting.
    Unavailable(String),
}

/// One package row read from an input CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub raw_name: String,
    pub raw_version: String,
    /// 1-based data row number within its file.
    pub row_index: usize,
    /// Every column of the input row, keyed by header.
    #[serde(default)]
    pub raw_data: BTreeMap<String, String>,
}

/// How the package name was tied to a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Fuzzy,
    Normalized,
    Exact,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Exact => write!(f, "exact"),
            Confidence::Normalized => write!(f, "normalized"),
            Confidence::Fuzzy => write!(f, "fuzzy"),
            Confidence::None => write!(f, "none"),
        }
    }
}

/// Outcome of resolving and matching one package.
///
/// Borrows from the catalog index, which stays read-only while results are classified.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub product: Option<&'a CatalogProduct>,
    pub cycle: Option<&'a Cycle>,
    pub confidence: Confidence,
    /// Set when the product resolved but its cycle list could not be fetched.
    pub cycles_unavailable: Option<&'a str>,
}

impl<'a> MatchResult<'a> {
    pub fn unmatched() -> Self {
        MatchResult {
            product: None,
            cycle: None,
            confidence: Confidence::None,
            cycles_unavailable: None,
        }
    }
}

/// Lifecycle status of a scanned package. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Eol,
    Active,
    Unknown,
    NotFound,
}

impl ScanStatus {
    /// CSS class used by the HTML report.
    pub fn css_class(&self) -> &'static str {
        match self {
            ScanStatus::Eol => "eol",
            ScanStatus::Active => "active",
            ScanStatus::Unknown => "unknown",
            ScanStatus::NotFound => "not-found",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStatus::Eol => write!(f, "eol"),
            ScanStatus::Active => write!(f, "active"),
            ScanStatus::Unknown => write!(f, "unknown"),
            ScanStatus::NotFound => write!(f, "not_found"),
        }
    }
}

/// Final, immutable result for one input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(flatten)]
    pub record: PackageRecord,
    pub product: Option<String>,
    pub cycle: Option<String>,
    pub confidence: Confidence,
    pub status: ScanStatus,
    pub detail: String,
    pub eol_date: Option<NaiveDate>,
    pub latest: Option<String>,
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub lts: bool,
    pub source_file: String,
}

/// Request counters reported by a catalog source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub api_calls: usize,
    pub cache_hits: usize,
    pub retries: usize,
    pub failed_products: Vec<String>,
}
