//! レポートの組み立てと出力
//!
//! 行はペアの処理中にメモリへ貯め、最後のペアの後に一度だけファイルへ書く。

pub mod console;

use crate::classes::format_classes;
use crate::classifier::{classify_match, Thresholds};
use crate::cli::ReportFormat;
use crate::error::{Result, ScreenError};
use crate::query::SearchPair;
use crate::scorer::ScoredMatch;
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use tm_screen_common::export::excel_core;
use tm_screen_common::{summarize, report_file, ReportRow, TargetSummary};

/// 最終レポートの出力先と形式
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub dir: PathBuf,
    pub base_name: String,
    pub format: ReportFormat,
}

impl ReportOutput {
    pub fn new(dir: &Path, prefix: &str, format: ReportFormat, generated_at: DateTime<Local>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            base_name: report_base_name(prefix, generated_at),
            format,
        }
    }
}

/// `<prefix>_<YYYYMMDD_HHMMSS>` 形式のファイル名
pub fn report_base_name(prefix: &str, generated_at: DateTime<Local>) -> String {
    format!("{}_{}", prefix, generated_at.format("%Y%m%d_%H%M%S"))
}

/// 1回の実行で書いたファイル
#[derive(Debug, Clone, Default)]
pub struct ReportFiles {
    pub csv: Option<PathBuf>,
    pub excel: Option<PathBuf>,
}

pub struct Reporter<W: Write> {
    sink: W,
    thresholds: Thresholds,
    rows: Vec<ReportRow>,
}

impl Reporter<std::io::Stdout> {
    pub fn stdout(thresholds: Thresholds) -> Self {
        Self::new(std::io::stdout(), thresholds)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(sink: W, thresholds: Thresholds) -> Self {
        Self {
            sink,
            thresholds,
            rows: Vec::new(),
        }
    }

    /// 1ペア分のマッチを表示して保持する。記録した件数を返す
    pub fn record(&mut self, pair: &SearchPair, matches: &[ScoredMatch]) -> Result<usize> {
        if matches.is_empty() {
            writeln!(self.sink, "{}", console::no_match_line(pair))?;
            return Ok(0);
        }

        writeln!(
            self.sink,
            "{}",
            console::section_header(pair, self.thresholds.fuzzy_threshold())
        )?;
        for scored in matches {
            let verdict = classify_match(scored, &self.thresholds);
            writeln!(self.sink, "{}", console::match_line(scored, verdict))?;
            self.rows.push(to_row(scored, verdict));
        }
        Ok(matches.len())
    }

    /// 検索に失敗したペアを表示する。行は増えない
    pub fn record_failure(&mut self, pair: &SearchPair, error: &ScreenError) -> Result<()> {
        writeln!(self.sink, "{}", console::failure_line(pair, &error.to_string()))?;
        Ok(())
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn summaries(&self, targets: &[&str]) -> Vec<TargetSummary> {
        summarize(targets.iter().copied(), &self.rows)
    }

    pub fn print_summary(&mut self, targets: &[&str]) -> Result<()> {
        let summaries = self.summaries(targets);
        writeln!(self.sink, "\nSummary:")?;
        write!(self.sink, "{}", console::summary_table(&summaries))?;
        Ok(())
    }

    /// レポートファイルを書く。既存ファイルは置き換えない
    pub fn finish(&mut self, output: &ReportOutput, targets: &[&str]) -> Result<ReportFiles> {
        let mut files = ReportFiles::default();

        if output.format.includes_csv() {
            let path = report_file::write_report(&output.dir, &output.base_name, &self.rows)
                .map_err(|e| ScreenError::ReportWrite(e.to_string()))?;
            writeln!(self.sink, "✔ CSV report: {}", path.display())?;
            files.csv = Some(path);
        }

        if output.format.includes_excel() {
            let summaries = self.summaries(targets);
            let path = excel_core::write_report_xlsx(&output.dir, &output.base_name, &self.rows, &summaries)
                .map_err(|e| ScreenError::ReportWrite(e.to_string()))?;
            writeln!(self.sink, "✔ Excel report: {}", path.display())?;
            files.excel = Some(path);
        }

        Ok(files)
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}

/// マッチをレポートの1行に平らにする
pub fn to_row(scored: &ScoredMatch, verdict: tm_screen_common::Verdict) -> ReportRow {
    ReportRow {
        target_name: scored.target_name.clone(),
        stem: scored.stem.clone(),
        matched_mark: scored.candidate.mark_text.clone(),
        score: (scored.score * 100.0).round() / 100.0,
        status: scored.candidate.status,
        serial_number: scored.candidate.serial_number.clone(),
        verdict,
        registration_number: scored.candidate.registration_number.clone(),
        inferred_classes: format_classes(&scored.inferred_classes),
        class_match: scored.class_match,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::CandidateMark;
    use chrono::TimeZone;
    use tempfile::tempdir;
    use tm_screen_common::{read_report, MarkStatus, Verdict};

    fn scored(mark: &str, status: &str, serial: &str, score: f64) -> ScoredMatch {
        ScoredMatch::new("LEAPWISE", "LEAP", CandidateMark::new(mark, status, serial), score)
    }

    #[test]
    fn test_base_name_embeds_timestamp() {
        let at = Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(report_base_name("trademark_fuzzy_matches", at), "trademark_fuzzy_matches_20260304_050607");
    }

    #[test]
    fn test_record_classifies_rows() {
        let mut reporter = Reporter::new(Vec::new(), Thresholds::default());
        let pair = SearchPair::new("LEAPWISE", "LEAP");
        let matches = vec![
            scored("LEAPWISE", "Live", "1", 100.0),
            scored("LEAPWIT", "Live", "2", 80.0),
            scored("LEAPWIZE", "Dead/Abandoned", "3", 95.0),
        ];

        assert_eq!(reporter.record(&pair, &matches).unwrap(), 3);
        let verdicts: Vec<Verdict> = reporter.rows().iter().map(|r| r.verdict).collect();
        assert_eq!(verdicts, vec![Verdict::Blocked, Verdict::Risk, Verdict::Clear]);
        assert_eq!(reporter.rows()[2].status, MarkStatus::Dead);

        let output = String::from_utf8(reporter.into_sink()).unwrap();
        assert_eq!(output.lines().count(), 4);
    }

    #[test]
    fn test_empty_section_prints_no_match() {
        let mut reporter = Reporter::new(Vec::new(), Thresholds::default());
        reporter.record(&SearchPair::new("STRIDEON", "STRIDE"), &[]).unwrap();
        assert!(reporter.rows().is_empty());
        let output = String::from_utf8(reporter.into_sink()).unwrap();
        assert!(output.contains("No fuzzy matches"));
    }

    #[test]
    fn test_finish_writes_both_formats() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut reporter = Reporter::new(Vec::new(), Thresholds::default());
        reporter
            .record(&SearchPair::new("LEAPWISE", "LEAP"), &[scored("LEAPWIT", "Live", "2", 80.0)])
            .unwrap();

        let at = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let output = ReportOutput::new(dir.path(), "report", ReportFormat::Both, at);
        let files = reporter.finish(&output, &["LEAPWISE"]).unwrap();

        let csv = files.csv.expect("csv written");
        assert!(files.excel.expect("xlsx written").exists());
        let rows = read_report(&csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].matched_mark, "LEAPWIT");
        assert_eq!(rows[0].verdict, Verdict::Risk);
    }

    #[test]
    fn test_row_carries_class_columns() {
        let mut scored = scored("LEAPWIT", "Live", "2", 80.456);
        scored.candidate = scored.candidate.with_details("5000002", "class 35");
        scored.inferred_classes = vec![35, 41];
        scored.class_match = true;

        let row = to_row(&scored, Verdict::Risk);
        assert_eq!(row.score, 80.46);
        assert_eq!(row.registration_number, "5000002");
        assert_eq!(row.inferred_classes, "35, 41");
        assert!(row.class_match);
    }
}
