//! 国際分類（ニース分類）の推定
//!
//! 候補の説明文から分類を推定し、対象区分に当たるかを判定する。
//! - "class 35" / "international class 35" の明記は常に拾う
//! - キーワードからの推定は説明文に "position 1" がある場合だけ

use crate::error::{Result, ScreenError};
use crate::scorer::ScoredMatch;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// ニース分類の区分数
pub const MAX_CLASS: u32 = 45;

const POSITION_MARKER: &str = "position 1";

/// 関心のある区分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetClass {
    pub number: u32,
    pub name: String,
    /// 説明文にあればこの区分と推定する語
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl TargetClass {
    fn new(number: u32, name: &str, keywords: &[&str]) -> Self {
        Self {
            number,
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassSettings {
    pub targets: Vec<TargetClass>,
}

impl Default for ClassSettings {
    fn default() -> Self {
        Self {
            targets: vec![
                TargetClass::new(
                    35,
                    "Advertising and Business Services",
                    &["advertising", "business", "management", "consultancy", "marketing"],
                ),
                TargetClass::new(
                    41,
                    "Education and Entertainment Services",
                    &["education", "training", "entertainment", "teaching", "workshop", "seminar"],
                ),
                TargetClass::new(
                    42,
                    "Scientific and Technological Services",
                    &["technology", "software", "computer", "research", "scientific", "development"],
                ),
            ],
        }
    }
}

impl ClassSettings {
    pub fn validate(&self) -> Result<()> {
        if let Some(bad) = self.targets.iter().find(|t| !(1..=MAX_CLASS).contains(&t.number)) {
            return Err(ScreenError::Config(format!(
                "class number must be within 1-{}, got {}",
                MAX_CLASS, bad.number
            )));
        }
        Ok(())
    }
}

/// 説明文から区分を推定する
#[derive(Debug, Clone)]
pub struct ClassMatcher {
    targets: Vec<TargetClass>,
}

impl ClassMatcher {
    pub fn new(settings: &ClassSettings) -> Self {
        let targets = settings
            .targets
            .iter()
            .map(|t| TargetClass {
                number: t.number,
                name: t.name.clone(),
                keywords: t
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();
        Self { targets }
    }

    pub fn is_target(&self, number: u32) -> bool {
        self.targets.iter().any(|t| t.number == number)
    }

    /// 推定した区分（昇順、重複なし）
    pub fn infer(&self, description: &str) -> Vec<u32> {
        let text = description.to_lowercase();
        let mut classes: BTreeSet<u32> = explicit_classes(&text).collect();

        if text.contains(POSITION_MARKER) {
            for target in &self.targets {
                if target.keywords.iter().any(|k| text.contains(k.as_str())) {
                    classes.insert(target.number);
                }
            }
        }

        classes.into_iter().collect()
    }

    /// 各マッチに推定区分と対象区分との一致を付ける
    pub fn annotate(&self, matches: &mut [ScoredMatch]) {
        for scored in matches.iter_mut() {
            scored.inferred_classes = self.infer(&scored.candidate.description);
            scored.class_match = scored.inferred_classes.iter().any(|&c| self.is_target(c));
        }
    }
}

/// "class N" の N を拾う。"international class N" も同じ形で含まれる
fn explicit_classes(text: &str) -> impl Iterator<Item = u32> + '_ {
    text.match_indices("class ").filter_map(move |(start, marker)| {
        let rest = &text[start + marker.len()..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=MAX_CLASS).contains(n))
    })
}

/// レポート用の "35, 41" 表記
pub fn format_classes(classes: &[u32]) -> String {
    classes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
