//! レポートのスキーマ型
//!
//! CLI（書き出し側）とビューア（読み込み側）で共有する:
//! - MarkStatus: 登録商標の状態
//! - Verdict: 3段階のリスク判定
//! - ReportRow: レポートファイルの1行

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// レポートファイルの必須列（この順で書き出す）
pub const REPORT_COLUMNS: [&str; 7] = [
    "target_name",
    "stem",
    "matched_mark",
    "score",
    "status",
    "serial_number",
    "verdict",
];

/// 区分情報の列。必須列の後ろに続き、古いレポートには無い
pub const CLASS_COLUMNS: [&str; 3] = ["registration_number", "inferred_classes", "class_match"];

/// 完全一致検索の行に付けるステム表記
pub const EXACT_STEM: &str = "EXACT";

/// 登録商標の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarkStatus {
    Live,
    Registered,
    Dead,
    Pending,
    #[default]
    Unknown,
}

impl MarkStatus {
    /// "Live/Registered" や "Dead/Abandoned" のような表記を解釈する
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.is_empty() {
            return MarkStatus::Unknown;
        }
        if ["dead", "abandon", "cancel", "expired"]
            .iter()
            .any(|word| label.contains(word))
        {
            MarkStatus::Dead
        } else if label.contains("pending") {
            MarkStatus::Pending
        } else if label.contains("registered") {
            MarkStatus::Registered
        } else if label.contains("live") || label.contains("active") {
            MarkStatus::Live
        } else {
            MarkStatus::Unknown
        }
    }

    /// 新規出願の障害になり得る状態か
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            MarkStatus::Live | MarkStatus::Registered | MarkStatus::Pending
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarkStatus::Live => "LIVE",
            MarkStatus::Registered => "REGISTERED",
            MarkStatus::Dead => "DEAD",
            MarkStatus::Pending => "PENDING",
            MarkStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MarkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// リスク判定。`Clear < Risk < Blocked` の順
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    #[default]
    Clear,
    Risk,
    Blocked,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Clear, Verdict::Risk, Verdict::Blocked];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Clear => "CLEAR",
            Verdict::Risk => "RISK",
            Verdict::Blocked => "BLOCKED",
        }
    }

    /// コンソールとビューアで使う記号付きラベル
    pub fn badge(&self) -> &'static str {
        match self {
            Verdict::Clear => "✅ Clear",
            Verdict::Risk => "⚠️ Risk",
            Verdict::Blocked => "❌ Blocked",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clear" => Ok(Verdict::Clear),
            "risk" => Ok(Verdict::Risk),
            "blocked" => Ok(Verdict::Blocked),
            _ => Err(format!("Unknown verdict: {}. Use clear, risk, or blocked", s)),
        }
    }
}

/// レポートファイルの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub target_name: String,
    pub stem: String,
    pub matched_mark: String,
    pub score: f64,
    pub status: MarkStatus,
    pub serial_number: String,
    pub verdict: Verdict,
    #[serde(default)]
    pub registration_number: String,
    /// 推定した国際分類（"35, 41" 形式）
    #[serde(default)]
    pub inferred_classes: String,
    /// 推定した分類のいずれかが対象区分に含まれる
    #[serde(default)]
    pub class_match: bool,
}

impl ReportRow {
    /// ステム検索ではなく完全一致検索で得た行か
    pub fn is_exact(&self) -> bool {
        self.stem.eq_ignore_ascii_case(EXACT_STEM)
    }
}
