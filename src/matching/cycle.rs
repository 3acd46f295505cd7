use std::sync::OnceLock;

use regex::Regex;

use crate::models::Cycle;

/// Pick the release cycle a raw version string belongs to.
///
/// 1. exact label match (as given, then normalized and case-insensitive)
/// 2. longest label that prefixes the version at a `.`/`-` boundary, then the
///    numeric core shortened to two and one components
/// 3. the only cycle of a single-cycle product
pub fn match_cycle<'c>(cycles: &'c [Cycle], raw_version: &str) -> Option<&'c Cycle> {
    if let Some(cycle) = cycles.iter().find(|c| c.label == raw_version) {
        return Some(cycle);
    }

    let version = normalize_version(raw_version);
    if !version.is_empty() {
        if let Some(cycle) = find_label(cycles, &version) {
            return Some(cycle);
        }
        if let Some(cycle) = longest_prefix(cycles, &version) {
            return Some(cycle);
        }
        if let Some(core) = numeric_core(&version) {
            for candidate in shortened(&core) {
                if let Some(cycle) = find_label(cycles, &candidate) {
                    return Some(cycle);
                }
            }
        }
    }

    match cycles {
        [only] => Some(only),
        _ => None,
    }
}

/// Trim, drop a Debian-style epoch (`1:`), a leading `v` and `+build` metadata.
pub fn normalize_version(raw: &str) -> String {
    let mut version = raw.trim();
    if let Some((epoch, rest)) = version.split_once(':') {
        if !epoch.is_empty() && epoch.chars().all(|c| c.is_ascii_digit()) {
            version = rest;
        }
    }
    if let Some(rest) = version.strip_prefix(['v', 'V']) {
        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            version = rest;
        }
    }
    if let Some((head, _build)) = version.split_once('+') {
        version = head;
    }
    version.trim().to_string()
}

fn find_label<'c>(cycles: &'c [Cycle], version: &str) -> Option<&'c Cycle> {
    cycles
        .iter()
        .find(|c| c.label.trim().eq_ignore_ascii_case(version))
}

fn longest_prefix<'c>(cycles: &'c [Cycle], version: &str) -> Option<&'c Cycle> {
    let version = version.to_lowercase();
    cycles
        .iter()
        .filter(|c| is_boundary_prefix(&c.label.trim().to_lowercase(), &version))
        .max_by_key(|c| c.label.trim().len())
}

/// `3.8` prefixes `3.8.10` and `3.8-slim`, but not `3.80`.
fn is_boundary_prefix(label: &str, version: &str) -> bool {
    if label.is_empty() {
        return false;
    }
    match version.strip_prefix(label) {
        Some("") => true,
        Some(rest) => rest.starts_with(['.', '-']),
        None => false,
    }
}

/// First dotted-numeric run in the version: `jdk-17.0.2_8` → `17.0.2`.
fn numeric_core(version: &str) -> Option<String> {
    static NUMERIC: OnceLock<Option<Regex>> = OnceLock::new();
    let re = NUMERIC
        .get_or_init(|| Regex::new(r"\d+(?:\.\d+)*").ok())
        .as_ref()?;
    re.find(version).map(|m| m.as_str().to_string())
}

/// The full core, then its first two and first one components:
/// `11.0.22.7` → `[11.0.22.7, 11.0, 11]`.
fn shortened(core: &str) -> Vec<String> {
    let parts: Vec<&str> = core.split('.').collect();
    let mut candidates = vec![core.to_string()];
    for n in [2, 1] {
        if n < parts.len() {
            candidates.push(parts[..n].join("."));
        }
    }
    candidates
}
