//! コンソール表示の整形

use crate::classes::format_classes;
use crate::query::SearchPair;
use crate::scorer::ScoredMatch;
use tm_screen_common::{TargetSummary, Verdict};

pub fn section_header(pair: &SearchPair, threshold: f64) -> String {
    if pair.is_exact() {
        format!("🔎 Exact-name matches for '{}' (score ≥ {}):", pair.target_name, threshold)
    } else {
        format!(
            "🔎 Fuzzy matches for '{}' via stem '{}' (score ≥ {}):",
            pair.target_name, pair.stem, threshold
        )
    }
}

pub fn match_line(scored: &ScoredMatch, verdict: Verdict) -> String {
    let mut line = format!(
        " - {} (score: {:.1}) | Status: {} | Serial: {} | {}",
        scored.candidate.mark_text,
        scored.score,
        display_status(scored),
        scored.candidate.serial_number,
        verdict.badge()
    );
    if !scored.inferred_classes.is_empty() {
        line.push_str(&format!(" | Classes: {}", format_classes(&scored.inferred_classes)));
        if scored.class_match {
            line.push_str(" (relevant)");
        }
    }
    line
}

fn display_status(scored: &ScoredMatch) -> String {
    let label = scored.candidate.status_label.trim();
    if label.is_empty() {
        scored.candidate.status.to_string()
    } else {
        label.to_string()
    }
}

pub fn no_match_line(pair: &SearchPair) -> String {
    format!("✅ No fuzzy matches found for '{}' via '{}'", pair.target_name, pair.stem)
}

pub fn failure_line(pair: &SearchPair, reason: &str) -> String {
    format!("❌ Search failed for {}: {}", pair, reason)
}

pub fn summary_table(summaries: &[TargetSummary]) -> String {
    let width = summaries
        .iter()
        .map(|s| s.target_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Target".len());

    let mut out = format!(
        "{:<width$}  {:^5}  {:^5}  {:>6}  {:>7}  {}\n",
        "Target", "Exact", "Fuzzy", "Top", "Matches", "Verdict",
        width = width
    );
    for s in summaries {
        out.push_str(&format!(
            "{:<width$}  {:^5}  {:^5}  {:>6.1}  {:>7}  {}\n",
            s.target_name,
            if s.exact_hit { "yes" } else { "-" },
            if s.fuzzy_hit { "yes" } else { "-" },
            s.top_score,
            s.match_count,
            s.verdict.badge(),
            width = width
        ));
    }
    out
}
