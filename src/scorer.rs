//! 類似度スコア
//!
//! トークンソート比率: 両方の名前を小文字化して空白で分割し、トークンを
//! 並べ替えて連結してから、挿入と削除だけの正規化編集距離で比べる。
//! 正規化後に同一なら100。

use crate::fetcher::CandidateMark;
use crate::query::SearchPair;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub target_name: String,
    pub stem: String,
    pub candidate: CandidateMark,
    pub score: f64,
    /// 説明文から推定した国際分類
    pub inferred_classes: Vec<u32>,
    pub class_match: bool,
}

impl ScoredMatch {
    pub fn new(
        target_name: impl Into<String>,
        stem: impl Into<String>,
        candidate: CandidateMark,
        score: f64,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            stem: stem.into(),
            candidate,
            score,
            inferred_classes: Vec::new(),
            class_match: false,
        }
    }
}

/// 小文字化、空白の圧縮、トークンの並べ替え
pub fn normalize(name: &str) -> String {
    let lower = name.to_lowercase();
    let mut tokens: Vec<&str> = lower.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// 0〜100の類似度
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = normalize(a).chars().collect();
    let b: Vec<char> = normalize(b).chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }

    let distance = indel_distance(&a, &b);
    100.0 * (1.0 - distance as f64 / total as f64)
}

fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * lcs_len(a, b)
}

/// 最長共通部分列の長さ（2行のDP表）
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// 全候補をペアの対象名と比べてスコアを付ける
///
/// `threshold` 以上だけを残し、出願番号ごとに1件にする。
/// 並びは [`sort_matches`] に従う。
pub fn score_candidates(pair: &SearchPair, candidates: &[CandidateMark], threshold: f64) -> Vec<ScoredMatch> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut matches: Vec<ScoredMatch> = candidates
        .iter()
        .filter(|&candidate| seen.insert(candidate.serial_number.as_str()))
        .filter_map(|candidate| {
            let score = similarity(&pair.target_name, &candidate.mark_text);
            (score >= threshold)
                .then(|| ScoredMatch::new(&pair.target_name, &pair.stem, candidate.clone(), score))
        })
        .collect();

    sort_matches(&mut matches);
    matches
}

/// スコア降順。同点なら対象区分に当たるものを先に、その次は出願番号の昇順
pub fn sort_matches(matches: &mut [ScoredMatch]) {
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.class_match.cmp(&a.class_match))
            .then_with(|| a.candidate.serial_number.cmp(&b.candidate.serial_number))
    });
}
