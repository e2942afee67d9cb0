//! Excelブックの生成
//!
//! シートは2枚: 全マッチ行と、対象名ごとの集計。

use crate::error::{Error, Result};
use crate::report_file::create_unique;
use crate::summary::TargetSummary;
use crate::types::{ReportRow, Verdict, CLASS_COLUMNS, REPORT_COLUMNS};
use rust_xlsxwriter::*;
use std::io::Write;
use std::path::{Path, PathBuf};

const COLUMN_WIDTHS: [f64; 10] = [28.0, 14.0, 32.0, 8.0, 12.0, 14.0, 10.0, 14.0, 16.0, 12.0];
const SUMMARY_COLUMNS: [&str; 6] = [
    "target_name",
    "exact_hit",
    "fuzzy_hit",
    "top_score",
    "match_count",
    "verdict",
];

fn verdict_fill(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Clear => Color::RGB(0xE2F0D9),
        Verdict::Risk => Color::RGB(0xFFF2CC),
        Verdict::Blocked => Color::RGB(0xF8CBAD),
    }
}

fn xlsx_err(context: &str) -> impl Fn(XlsxError) -> Error + '_ {
    move |e| Error::Excel(format!("{}: {}", context, e))
}

/// メモリ上にブックを組み立てる
pub fn generate_report_buffer(rows: &[ReportRow], summaries: &[TargetSummary]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xD9D9D9))
        .set_border(FormatBorder::Thin);
    let score_format = Format::new().set_num_format("0.0");

    let sheet = workbook.add_worksheet();
    sheet.set_name("Matches").map_err(xlsx_err("sheet name"))?;

    let columns: Vec<&str> = REPORT_COLUMNS.iter().chain(CLASS_COLUMNS.iter()).copied().collect();
    for (col, (name, width)) in columns.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet
            .write_string_with_format(0, col, *name, &header_format)
            .map_err(xlsx_err("header"))?;
        sheet.set_column_width(col, width).map_err(xlsx_err("column width"))?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        let verdict_format = Format::new().set_background_color(verdict_fill(row.verdict));

        sheet.write_string(r, 0, &row.target_name).map_err(xlsx_err("target"))?;
        sheet.write_string(r, 1, &row.stem).map_err(xlsx_err("stem"))?;
        sheet.write_string(r, 2, &row.matched_mark).map_err(xlsx_err("mark"))?;
        sheet
            .write_number_with_format(r, 3, row.score, &score_format)
            .map_err(xlsx_err("score"))?;
        sheet.write_string(r, 4, row.status.as_str()).map_err(xlsx_err("status"))?;
        sheet.write_string(r, 5, &row.serial_number).map_err(xlsx_err("serial"))?;
        sheet
            .write_string_with_format(r, 6, row.verdict.as_str(), &verdict_format)
            .map_err(xlsx_err("verdict"))?;
        sheet
            .write_string(r, 7, &row.registration_number)
            .map_err(xlsx_err("registration"))?;
        sheet
            .write_string(r, 8, &row.inferred_classes)
            .map_err(xlsx_err("classes"))?;
        sheet.write_boolean(r, 9, row.class_match).map_err(xlsx_err("class match"))?;
    }

    sheet.set_freeze_panes(1, 0).map_err(xlsx_err("freeze panes"))?;
    if !rows.is_empty() {
        sheet
            .autofilter(0, 0, rows.len() as u32, (columns.len() - 1) as u16)
            .map_err(xlsx_err("autofilter"))?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Summary").map_err(xlsx_err("sheet name"))?;

    for (col, name) in SUMMARY_COLUMNS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *name, &header_format)
            .map_err(xlsx_err("header"))?;
    }
    sheet.set_column_width(0, 28.0).map_err(xlsx_err("column width"))?;

    for (index, summary) in summaries.iter().enumerate() {
        let r = index as u32 + 1;
        let verdict_format = Format::new().set_background_color(verdict_fill(summary.verdict));

        sheet.write_string(r, 0, &summary.target_name).map_err(xlsx_err("target"))?;
        sheet.write_boolean(r, 1, summary.exact_hit).map_err(xlsx_err("exact"))?;
        sheet.write_boolean(r, 2, summary.fuzzy_hit).map_err(xlsx_err("fuzzy"))?;
        sheet
            .write_number_with_format(r, 3, summary.top_score, &score_format)
            .map_err(xlsx_err("score"))?;
        sheet
            .write_number(r, 4, summary.match_count as f64)
            .map_err(xlsx_err("count"))?;
        sheet
            .write_string_with_format(r, 5, summary.verdict.as_str(), &verdict_format)
            .map_err(xlsx_err("verdict"))?;
    }

    workbook.save_to_buffer().map_err(xlsx_err("save"))
}

/// `dir` に `base` 名で新しい `.xlsx` を書く
pub fn write_report_xlsx(
    dir: &Path,
    base: &str,
    rows: &[ReportRow],
    summaries: &[TargetSummary],
) -> Result<PathBuf> {
    let buffer = generate_report_buffer(rows, summaries)?;
    std::fs::create_dir_all(dir)?;
    let (path, mut file) = create_unique(dir, base, "xlsx")?;
    file.write_all(&buffer)?;
    Ok(path)
}
