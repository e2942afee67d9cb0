//! レポート表示用の絞り込みと並べ替え

use crate::types::{ReportRow, Verdict};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreOrder {
    #[default]
    Descending,
    Ascending,
}

/// 読み込んだレポートに掛ける絞り込み条件
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowFilter {
    /// `None` なら全判定を表示
    pub verdict: Option<Verdict>,
    pub min_score: f64,
    /// 完全一致検索の行を隠す
    pub stems_only: bool,
    /// 対象区分に当たる行だけ
    pub class_match_only: bool,
    /// 対象名の部分一致（大文字小文字を区別しない）
    pub target: String,
}

impl RowFilter {
    pub fn matches(&self, row: &ReportRow) -> bool {
        if let Some(verdict) = self.verdict {
            if row.verdict != verdict {
                return false;
            }
        }
        if row.score < self.min_score {
            return false;
        }
        if self.stems_only && row.is_exact() {
            return false;
        }
        if self.class_match_only && !row.class_match {
            return false;
        }
        let target = self.target.trim();
        if !target.is_empty()
            && !row
                .target_name
                .to_lowercase()
                .contains(&target.to_lowercase())
        {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, rows: &'a [ReportRow]) -> Vec<&'a ReportRow> {
        rows.iter().filter(|row| self.matches(row)).collect()
    }
}

/// スコア順。同点は出願番号順にして並びを安定させる
pub fn sort_by_score(rows: &mut [&ReportRow], order: ScoreOrder) {
    rows.sort_by(|a, b| {
        let by_score = a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal);
        let by_score = match order {
            ScoreOrder::Descending => by_score.reverse(),
            ScoreOrder::Ascending => by_score,
        };
        by_score.then_with(|| a.serial_number.cmp(&b.serial_number))
    });
}
