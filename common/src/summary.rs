//! 対象名ごとのレポート集計
//!
//! 候補名1つにつき1行:
//! - 完全一致検索で有効な商標に当たったか
//! - ステム検索で類似が出たか
//! - 最高スコアと、行の中で最も重い判定

use crate::types::{ReportRow, Verdict};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSummary {
    pub target_name: String,
    pub exact_hit: bool,
    pub fuzzy_hit: bool,
    pub top_score: f64,
    pub match_count: usize,
    pub verdict: Verdict,
}

impl TargetSummary {
    fn empty(target_name: &str) -> Self {
        Self {
            target_name: target_name.to_string(),
            exact_hit: false,
            fuzzy_hit: false,
            top_score: 0.0,
            match_count: 0,
            verdict: Verdict::Clear,
        }
    }

    fn add(&mut self, row: &ReportRow) {
        if row.is_exact() {
            self.exact_hit |= row.status.is_active();
        } else {
            self.fuzzy_hit = true;
        }
        if row.score > self.top_score {
            self.top_score = row.score;
        }
        self.match_count += 1;
        self.verdict = self.verdict.max(row.verdict);
    }
}

/// 行を対象名ごとに集計する
///
/// `targets` の順を先頭に置き、マッチの無い名前も Clear として並べる。
/// `rows` にだけ現れる名前はその後ろに初出順で続く。
pub fn summarize<'a, I>(targets: I, rows: &[ReportRow]) -> Vec<TargetSummary>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut summaries: Vec<TargetSummary> = Vec::new();

    for target in targets {
        if !summaries.iter().any(|s| s.target_name == target) {
            summaries.push(TargetSummary::empty(target));
        }
    }

    for row in rows {
        let index = match summaries.iter().position(|s| s.target_name == row.target_name) {
            Some(index) => index,
            None => {
                summaries.push(TargetSummary::empty(&row.target_name));
                summaries.len() - 1
            }
        };
        summaries[index].add(row);
    }

    summaries
}
