//! レポートファイルの入出力
//!
//! ここで書くCSVがCLIとビューアの唯一の取り決め。
//! ファイルは常に新規作成し、既存のレポートは上書きしない。

use crate::error::{Error, Result};
use crate::types::{ReportRow, CLASS_COLUMNS, REPORT_COLUMNS};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

const MAX_NAME_ATTEMPTS: u32 = 1000;

/// `dir/base.ext` を作る。使われていれば `dir/base_N.ext`
pub fn create_unique(dir: &Path, base: &str, extension: &str) -> Result<(PathBuf, File)> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{}.{}", base, extension)
        } else {
            format!("{}_{}.{}", base, attempt, extension)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Err(Error::Io(std::io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free file name for {} in {}", base, dir.display()),
    )))
}

/// 固定ヘッダ付きでCSVに書く
pub fn write_rows<W: Write>(writer: W, rows: &[ReportRow]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(REPORT_COLUMNS.iter().chain(CLASS_COLUMNS.iter()))?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// `dir` に `base` 名で新しいレポートを書く
pub fn write_report(dir: &Path, base: &str, rows: &[ReportRow]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let (path, file) = create_unique(dir, base, "csv")?;
    write_rows(file, rows)?;
    Ok(path)
}

/// ヘッダを確かめてから行を読む
///
/// 必須列は名前の完全一致（大文字小文字も区別）。区分の列は無くてもよい。
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<ReportRow>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if let Some(missing) = REPORT_COLUMNS.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        return Err(Error::Schema(format!("missing column: {}", missing)));
    }

    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        let row: ReportRow = record?;
        rows.push(row);
    }
    Ok(rows)
}

/// ディスクからレポートを読む
pub fn read_report(path: &Path) -> Result<Vec<ReportRow>> {
    let file = File::open(path)?;
    read_rows(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MarkStatus, Verdict};
    use tempfile::tempdir;

    fn row(mark: &str, score: f64, verdict: Verdict) -> ReportRow {
        ReportRow {
            target_name: "LEAPWISE".into(),
            stem: "LEAP".into(),
            matched_mark: mark.into(),
            score,
            status: MarkStatus::Live,
            serial_number: "97123456".into(),
            verdict,
            registration_number: String::new(),
            inferred_classes: String::new(),
            class_match: false,
        }
    }

    #[test]
    fn test_header_is_fixed() {
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &[]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text.trim_end(),
            "target_name,stem,matched_mark,score,status,serial_number,verdict,\
             registration_number,inferred_classes,class_match"
        );
    }

    /// 区分の列が無い古いレポートも読める
    #[test]
    fn test_reads_report_without_class_columns() {
        let text = "target_name,stem,matched_mark,score,status,serial_number,verdict\n\
                    LEAPWISE,LEAP,LEAPWIT,80,LIVE,97123456,RISK\n";
        let rows = read_rows(text.as_bytes()).unwrap();
        assert_eq!(rows, vec![row("LEAPWIT", 80.0, Verdict::Risk)]);
    }

    #[test]
    fn test_class_columns_survive() {
        let mut classified = row("LEAPWIT", 80.0, Verdict::Risk);
        classified.registration_number = "5000002".into();
        classified.inferred_classes = "35, 41".into();
        classified.class_match = true;

        let mut buffer = Vec::new();
        write_rows(&mut buffer, &[classified.clone()]).unwrap();
        assert_eq!(read_rows(buffer.as_slice()).unwrap(), vec![classified]);
    }

    /// 列名の大文字小文字が違えば読み込み前にスキーマエラーにする
    #[test]
    fn test_header_case_must_match() {
        let text = "Target_Name,stem,matched_mark,score,status,serial_number,verdict\n\
                    LEAPWISE,LEAP,LEAPWIT,80,LIVE,1,RISK\n";
        let err = read_rows(text.as_bytes()).unwrap_err();
        match err {
            Error::Schema(message) => assert!(message.contains("target_name"), "{}", message),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_marks_with_commas_survive() {
        let rows = vec![row("LEAP, INC.", 81.5, Verdict::Risk)];
        let mut buffer = Vec::new();
        write_rows(&mut buffer, &rows).unwrap();
        let parsed = read_rows(buffer.as_slice()).unwrap();
        assert_eq!(parsed, rows);
    }

    #[test]
    fn test_missing_verdict_column() {
        let text = "target_name,stem,matched_mark,score,status,serial_number\nA,B,C,80,LIVE,1\n";
        let err = read_rows(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_write_report_never_overwrites() {
        let dir = tempdir().expect("Failed to create temp dir");
        let first = write_report(dir.path(), "report_20260101_000000", &[row("LEAPWIT", 80.0, Verdict::Risk)]).unwrap();
        let second = write_report(dir.path(), "report_20260101_000000", &[]).unwrap();

        assert_ne!(first, second);
        assert!(second.file_name().unwrap().to_str().unwrap().ends_with("_1.csv"));
        assert_eq!(read_report(&first).unwrap().len(), 1);
        assert!(read_report(&second).unwrap().is_empty());
    }
}
