use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Resolve the input path to the CSV files to scan.
///
/// A file is scanned as-is whatever its extension. A directory contributes every
/// `*.csv` directly inside it (case-insensitive), sorted by path.
pub fn detect_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("Failed to read {}", path.display()))? {
        let candidate = entry?.path();
        if candidate.is_file() && is_csv(&candidate) {
            files.push(candidate);
        }
    }
    files.sort();
    Ok(files)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Output directory for each input, in the same order.
///
/// A single input writes to the output root. Several inputs each get `<root>/<stem>`,
/// or `<root>/<file name>` when two stems differ only by case or extension
/// (`a.csv` and `a.CSV`), so no file's reports overwrite another's.
pub fn output_dirs(output_root: &Path, inputs: &[PathBuf]) -> Vec<PathBuf> {
    if inputs.len() <= 1 {
        return vec![output_root.to_path_buf(); inputs.len()];
    }

    let stems: Vec<String> = inputs
        .iter()
        .map(|p| lossy_or_default(p.file_stem()))
        .collect();

    inputs
        .iter()
        .zip(&stems)
        .map(|(input, stem)| {
            let shared = stems.iter().filter(|s| s.eq_ignore_ascii_case(stem)).count() > 1;
            if shared {
                tracing::debug!(
                    "{} shares its stem with another input; using the full file name",
                    input.display()
                );
                output_root.join(lossy_or_default(input.file_name()))
            } else {
                output_root.join(stem)
            }
        })
        .collect()
}

fn lossy_or_default(part: Option<&std::ffi::OsStr>) -> String {
    part.map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_lists_sorted_csv_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.csv"), "name\n").unwrap();
        fs::write(dir.path().join("a.CSV"), "name\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = detect_inputs(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }

    #[test]
    fn test_single_file_any_extension() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("export.txt");
        fs::write(&file, "name\n").unwrap();
        assert_eq!(detect_inputs(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_missing_path_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(detect_inputs(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_output_dir_per_file() {
        let root = Path::new("output");
        let one = vec![PathBuf::from("input/servers.csv")];
        assert_eq!(output_dirs(root, &one), vec![PathBuf::from("output")]);

        let two = vec![PathBuf::from("input/servers.csv"), PathBuf::from("input/desktops.csv")];
        assert_eq!(
            output_dirs(root, &two),
            vec![PathBuf::from("output/servers"), PathBuf::from("output/desktops")]
        );
        assert!(output_dirs(root, &[]).is_empty());
    }

    #[test]
    fn test_colliding_stems_use_file_names() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "name\n").unwrap();
        fs::write(dir.path().join("a.CSV"), "name\n").unwrap();
        fs::write(dir.path().join("b.csv"), "name\n").unwrap();
        let inputs = detect_inputs(dir.path()).unwrap();

        let root = Path::new("output");
        let dirs = output_dirs(root, &inputs);
        let names: Vec<_> = dirs
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect();

        let unique: std::collections::BTreeSet<_> = names.iter().collect();
        assert_eq!(unique.len(), inputs.len());
        assert!(names.contains(&"b".to_string()));
        assert_eq!(names.iter().filter(|n| n.starts_with("a.")).count(), 2);
    }
}
