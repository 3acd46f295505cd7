use chrono::NaiveDate;

use crate::models::{Confidence, MatchResult, Milestone, ScanStatus};

/// Classify a match into a lifecycle status plus a human-readable detail.
///
/// Pure: the scan date is passed in, so the same match and date always give the
/// same answer.
pub fn classify(result: &MatchResult<'_>, today: NaiveDate) -> (ScanStatus, String) {
    let (status, detail) = classify_inner(result, today);
    if result.confidence == Confidence::Fuzzy {
        return (status, format!("{detail} (fuzzy name match)"));
    }
    (status, detail)
}

fn classify_inner(result: &MatchResult<'_>, today: NaiveDate) -> (ScanStatus, String) {
    let Some(product) = result.product else {
        return (
            ScanStatus::NotFound,
            "no matching product in the EOL catalog".to_string(),
        );
    };

    if let Some(reason) = result.cycles_unavailable {
        return (
            ScanStatus::Unknown,
            format!("cycle data unavailable for {}: {reason}", product.id),
        );
    }

    let Some(cycle) = result.cycle else {
        return (
            ScanStatus::Unknown,
            format!("version not recognized for product {}", product.id),
        );
    };

    match &cycle.eol {
        Some(Milestone::Flag(true)) => (
            ScanStatus::Eol,
            format!("{} {} is end-of-life", product.id, cycle.label),
        ),
        Some(Milestone::Date(date)) if *date <= today => (
            ScanStatus::Eol,
            format!("{} {} reached end-of-life on {date}", product.id, cycle.label),
        ),
        Some(Milestone::Unpublished(value)) => (
            ScanStatus::Unknown,
            format!(
                "EOL date not published for {} {} ({value})",
                product.id, cycle.label
            ),
        ),
        eol => {
            let mut detail = match eol.as_ref().and_then(Milestone::as_date) {
                Some(date) => format!("{} {} supported until {date}", product.id, cycle.label),
                None => format!("{} {} is supported", product.id, cycle.label),
            };
            if support_ended(cycle.support.as_ref(), today) {
                detail.push_str("; active support ended, security fixes only");
            }
            if let Some(latest) = &cycle.latest {
                detail.push_str(&format!("; latest {latest}"));
            }
            (ScanStatus::Active, detail)
        }
    }
}

fn support_ended(support: Option<&Milestone>, today: NaiveDate) -> bool {
    match support {
        Some(Milestone::Flag(active)) => !active,
        Some(Milestone::Date(date)) => *date <= today,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::{CatalogProduct, Cycle};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn product(id: &str) -> CatalogProduct {
        CatalogProduct {
            id: id.to_string(),
            aliases: BTreeSet::new(),
        }
    }

    fn matched<'a>(product: &'a CatalogProduct, cycle: &'a Cycle) -> MatchResult<'a> {
        MatchResult {
            product: Some(product),
            cycle: Some(cycle),
            confidence: Confidence::Exact,
            cycles_unavailable: None,
        }
    }

    #[test]
    fn test_past_eol_date() {
        let python = product("python");
        let cycle = Cycle::new("3.8").with_eol(Milestone::Date(day(2024, 10, 7)));
        let (status, detail) = classify(&matched(&python, &cycle), day(2025, 1, 1));
        assert_eq!(status, ScanStatus::Eol);
        assert!(detail.contains("2024-10-07"));
    }

    #[test]
    fn test_eol_on_the_day_itself() {
        let python = product("python");
        let cycle = Cycle::new("3.8").with_eol(Milestone::Date(day(2024, 10, 7)));
        let (status, _) = classify(&matched(&python, &cycle), day(2024, 10, 7));
        assert_eq!(status, ScanStatus::Eol);
    }

    #[test]
    fn test_future_eol_is_active() {
        let python = product("python");
        let cycle = Cycle::new("3.12")
            .with_eol(Milestone::Date(day(2028, 10, 31)))
            .with_support(Milestone::Date(day(2025, 4, 2)))
            .with_latest("3.12.7");
        let (status, detail) = classify(&matched(&python, &cycle), day(2025, 6, 1));
        assert_eq!(status, ScanStatus::Active);
        assert!(detail.contains("security fixes only"));
        assert!(detail.contains("latest 3.12.7"));
    }

    #[test]
    fn test_boolean_flags() {
        let node = product("nodejs");
        let dead = Cycle::new("12").with_eol(Milestone::Flag(true));
        let live = Cycle::new("22").with_eol(Milestone::Flag(false));
        let today = day(2025, 1, 1);
        assert_eq!(classify(&matched(&node, &dead), today).0, ScanStatus::Eol);
        assert_eq!(classify(&matched(&node, &live), today).0, ScanStatus::Active);
    }

    #[test]
    fn test_absent_and_unpublished_eol() {
        let p = product("alpine");
        let none = Cycle::new("3.20");
        let tbd = Cycle::new("3.21").with_eol(Milestone::Unpublished("tbd".into()));
        let today = day(2025, 1, 1);
        assert_eq!(classify(&matched(&p, &none), today).0, ScanStatus::Active);
        assert_eq!(classify(&matched(&p, &tbd), today).0, ScanStatus::Unknown);
    }

    #[test]
    fn test_unmatched_and_unknown_version() {
        let today = day(2025, 1, 1);
        assert_eq!(classify(&MatchResult::unmatched(), today).0, ScanStatus::NotFound);

        let p = product("nodejs");
        let no_cycle = MatchResult {
            product: Some(&p),
            cycle: None,
            confidence: Confidence::Exact,
            cycles_unavailable: None,
        };
        assert_eq!(classify(&no_cycle, today).0, ScanStatus::Unknown);

        let unavailable = MatchResult {
            cycles_unavailable: Some("HTTP 503"),
            ..no_cycle
        };
        let (status, detail) = classify(&unavailable, today);
        assert_eq!(status, ScanStatus::Unknown);
        assert!(detail.contains("HTTP 503"));
    }

    #[test]
    fn test_fuzzy_note_and_idempotence() {
        let django = product("django");
        let cycle = Cycle::new("4.2").with_eol(Milestone::Date(day(2026, 4, 30)));
        let result = MatchResult {
            confidence: Confidence::Fuzzy,
            ..matched(&django, &cycle)
        };
        let today = day(2025, 1, 1);
        let first = classify(&result, today);
        assert!(first.1.ends_with("(fuzzy name match)"));
        assert_eq!(first, classify(&result, today));
    }
}
