use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::ColumnsConfig;
use crate::error::InputError;
use crate::models::PackageRecord;

use super::columns::detect_columns;

/// Rows read from one CSV file.
#[derive(Debug, Default)]
pub struct InputFile {
    pub records: Vec<PackageRecord>,
    /// Rows dropped because they had no package name or could not be parsed.
    pub skipped: usize,
}

/// Delimiters tried against the header line, in priority order.
const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Pick the first known delimiter that appears in the header line.
pub fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");
    DELIMITERS
        .iter()
        .copied()
        .find(|d| header.as_bytes().contains(d))
        .unwrap_or(b',')
}

/// Read package rows from a CSV export.
pub fn read_records(path: &Path, columns: &ColumnsConfig) -> Result<InputFile, InputError> {
    let bytes = std::fs::read(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = decode(path, &bytes);
    parse_records(path, &content, columns)
}

/// Decode as UTF-8, replacing invalid sequences with U+FFFD.
fn decode<'b>(path: &Path, bytes: &'b [u8]) -> Cow<'b, str> {
    let content = String::from_utf8_lossy(bytes);
    if matches!(content, Cow::Owned(_)) {
        tracing::warn!(
            "{}: not valid UTF-8; invalid bytes were replaced",
            path.display()
        );
    }
    content
}

/// Parse CSV content; `path` is only used for error context.
pub fn parse_records(
    path: &Path,
    content: &str,
    columns: &ColumnsConfig,
) -> Result<InputFile, InputError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(sniff_delimiter(content))
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| InputError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let header_list: Vec<&str> = headers.iter().collect();
    let map = detect_columns(&header_list, &columns.name, &columns.version).ok_or_else(|| {
        InputError::MissingNameColumn {
            path: path.to_path_buf(),
            headers: header_list.join(", "),
        }
    })?;

    if map.version.is_none() {
        tracing::warn!(
            "{}: no version column found; versions will be treated as empty",
            path.display()
        );
    }

    let mut file = InputFile::default();

    for (i, result) in reader.records().enumerate() {
        let row_index = i + 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("{} row {}: skipping malformed record: {e}", path.display(), row_index);
                file.skipped += 1;
                continue;
            }
        };

        let name = record.get(map.name).unwrap_or("").trim();
        if name.is_empty() {
            tracing::warn!("{} row {}: no package name found", path.display(), row_index);
            file.skipped += 1;
            continue;
        }

        let version = map
            .version
            .and_then(|idx| record.get(idx))
            .unwrap_or("")
            .trim();

        let raw_data: BTreeMap<String, String> = header_list
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.trim().is_empty())
            .map(|(header, value)| (header.trim().to_string(), value.to_string()))
            .collect();

        file.records.push(PackageRecord {
            raw_name: name.to_string(),
            raw_version: version.to_string(),
            row_index,
            raw_data,
        });
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(content: &str) -> Result<InputFile, InputError> {
        parse_records(Path::new("test.csv"), content, &ColumnsConfig::default())
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("name,version\n"), b',');
        assert_eq!(sniff_delimiter("name;version\n"), b';');
        assert_eq!(sniff_delimiter("name\tversion\n"), b'\t');
        assert_eq!(sniff_delimiter("name\n"), b',');
    }

    #[test]
    fn test_reads_rows_and_skips_missing_names() {
        let file = parse("Name,Version\npython,3.8\n,1.0\nnodejs, 14.21.3 \n").unwrap();
        assert_eq!(file.records.len(), 2);
        assert_eq!(file.skipped, 1);
        assert_eq!(file.records[0].raw_name, "python");
        assert_eq!(file.records[0].row_index, 1);
        assert_eq!(file.records[1].raw_version, "14.21.3");
        assert_eq!(file.records[1].row_index, 3);
    }

    #[test]
    fn test_semicolon_export_with_synonyms() {
        let file = parse("component;release;license\nnginx;1.24;BSD\n").unwrap();
        assert_eq!(file.records.len(), 1);
        assert_eq!(file.records[0].raw_name, "nginx");
        assert_eq!(file.records[0].raw_version, "1.24");
    }

    #[test]
    fn test_whole_row_is_kept() {
        let file = parse("Name,Version,Owner,Host\npython,3.8,infra,db01\nredis,7.2\n").unwrap();
        let first = &file.records[0].raw_data;
        assert_eq!(first.len(), 4);
        assert_eq!(first["Owner"], "infra");
        assert_eq!(first["Host"], "db01");
        assert_eq!(first["Name"], "python");

        let short = &file.records[1].raw_data;
        assert_eq!(short.len(), 2);
        assert!(!short.contains_key("Owner"));
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let file = parse("name,version\nredis\n").unwrap();
        assert_eq!(file.records.len(), 1);
        assert_eq!(file.records[0].raw_version, "");
    }

    #[test]
    fn test_missing_name_column_is_an_error() {
        let err = parse("id,version\n1,2\n").unwrap_err();
        assert!(matches!(err, InputError::MissingNameColumn { .. }));
    }

    #[test]
    fn test_read_from_disk_with_bom() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "\u{feff}package,version\r\ndjango,4.2\r\n").unwrap();
        let file = read_records(f.path(), &ColumnsConfig::default()).unwrap();
        assert_eq!(file.records.len(), 1);
        assert_eq!(file.records[0].raw_name, "django");
        assert_eq!(file.records[0].raw_version, "4.2");
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_fatal() {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(b"name,version\ncaf\xe9-server,1.0\nredis,7.2\n").unwrap();
        let file = read_records(f.path(), &ColumnsConfig::default()).unwrap();
        assert_eq!(file.records.len(), 2);
        assert_eq!(file.records[0].raw_name, "caf\u{fffd}-server");

        let path = Path::new("latin1.csv");
        assert!(matches!(decode(path, b"caf\xe9"), Cow::Owned(_)));
        assert!(matches!(decode(path, b"cafe"), Cow::Borrowed("cafe")));
    }

    #[test]
    fn test_unreadable_file() {
        let err = read_records(Path::new("/nonexistent/inventory.csv"), &ColumnsConfig::default())
            .unwrap_err();
        assert!(matches!(err, InputError::Io { .. }));
    }
}
