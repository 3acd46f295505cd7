/// Package-name header synonyms, highest priority first.
pub const DEFAULT_NAME_COLUMNS: &[&str] = &[
    "name",
    "package_name",
    "package",
    "component",
    "artifact",
    "package name",
    "component_name",
    "artifact_name",
];

/// Version header synonyms, highest priority first.
pub const DEFAULT_VERSION_COLUMNS: &[&str] = &[
    "version",
    "package_version",
    "ver",
    "release",
    "component_version",
    "artifact_version",
];

/// Column positions of the logical fields within one CSV header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: usize,
    pub version: Option<usize>,
}

/// Map a header row to field positions.
///
/// For each logical field the synonym list is walked in priority order and the
/// first header that matches (trimmed, case-insensitive) wins. Returns `None`
/// when no package-name column exists.
pub fn detect_columns<S: AsRef<str>>(
    headers: &[S],
    name_synonyms: &[String],
    version_synonyms: &[String],
) -> Option<ColumnMap> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.as_ref().trim().trim_start_matches('\u{feff}').to_lowercase())
        .collect();

    let find = |synonyms: &[String]| {
        synonyms.iter().find_map(|syn| {
            let syn = syn.trim().to_lowercase();
            normalized.iter().position(|h| *h == syn)
        })
    };

    Some(ColumnMap {
        name: find(name_synonyms)?,
        version: find(version_synonyms),
    })
}
