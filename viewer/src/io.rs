use anyhow::{Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

use tm_screen_common::report_file::write_rows;
use tm_screen_common::{read_report, ReportRow};

pub fn load_report(path: &Path) -> Result<Vec<ReportRow>> {
    read_report(path).with_context(|| format!("read {}", path.display()))
}

pub fn save_rows(path: &Path, rows: &[&ReportRow]) -> Result<()> {
    let owned: Vec<ReportRow> = rows.iter().map(|row| (*row).clone()).collect();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_rows(file, &owned).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn default_filtered_path(source: &Path) -> PathBuf {
    let file_name = source
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("report.csv");
    let filtered_name = match file_name.strip_suffix(".csv") {
        Some(stem) => format!("{stem}.filtered.csv"),
        None => format!("{file_name}.filtered.csv"),
    };
    source.with_file_name(filtered_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tm_screen_common::{MarkStatus, Verdict};

    #[test]
    fn test_default_filtered_path() {
        let path = default_filtered_path(Path::new("/tmp/trademark_fuzzy_matches_20260101_000000.csv"));
        assert_eq!(
            path,
            PathBuf::from("/tmp/trademark_fuzzy_matches_20260101_000000.filtered.csv")
        );
        assert_eq!(
            default_filtered_path(Path::new("report")),
            PathBuf::from("report.filtered.csv")
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("view.csv");
        let row = ReportRow {
            target_name: "LEAPWISE".into(),
            stem: "LEAP".into(),
            matched_mark: "LEAPWIT".into(),
            score: 80.0,
            status: MarkStatus::Live,
            serial_number: "97000001".into(),
            verdict: Verdict::Risk,
            registration_number: String::new(),
            inferred_classes: String::new(),
            class_match: false,
        };

        save_rows(&path, &[&row]).unwrap();
        assert_eq!(load_report(&path).unwrap(), vec![row]);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = load_report(Path::new("/nonexistent/report.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/report.csv"));
    }
}
