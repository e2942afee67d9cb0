//! バッチ審査の実行
//!
//! ペアは1つずつ順に処理する: 取得、スコア付け、区分推定、判定、記録。
//! 失敗したペアはログに残し、空のセクションになる。

use crate::classes::ClassMatcher;
use crate::classifier::Thresholds;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{BackoffPolicy, FetchLimits, Fetcher, SearchTransport};
use crate::query::{QueryBuilder, SearchPair};
use crate::reporter::Reporter;
use crate::scorer::{score_candidates, sort_matches};
use std::io::Write;
use tracing::{debug, error, info, warn};

/// 1回の実行の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub pairs_attempted: usize,
    pub pairs_failed: usize,
    pub pairs_skipped: usize,
    pub matches: usize,
    pub api_calls: usize,
}

/// 設定のペアに続けて、対象名ごとに1回の完全一致検索
pub fn search_plan(config: &Config) -> Vec<SearchPair> {
    let mut plan = config.pairs.clone();
    if config.search.exact_check {
        plan.extend(config.target_names().into_iter().map(SearchPair::exact));
    }
    plan
}

pub fn fetcher_for<T: SearchTransport>(config: &Config, transport: T) -> Fetcher<T> {
    Fetcher::new(
        transport,
        BackoffPolicy::fixed(config.pacing.retry_delay()),
        FetchLimits {
            page_size: config.search.page_size,
            max_results: config.search.max_results,
            request_delay: config.pacing.request_delay(),
        },
    )
}

pub fn thresholds_for(config: &Config) -> Result<Thresholds> {
    Thresholds::new(config.scoring.fuzzy_threshold, config.scoring.high_risk_cutoff)
}

/// 計画の全ペアを審査して結果を記録する
///
/// 1ペア限りのエラーは記録して次へ進む。それ以外のエラーと出力先の書き込み失敗は実行を中断する。
pub async fn run<T, W>(
    config: &Config,
    fetcher: &mut Fetcher<T>,
    reporter: &mut Reporter<W>,
) -> Result<RunStats>
where
    T: SearchTransport,
    W: Write,
{
    let builder = QueryBuilder::from_settings(&config.search);
    let classes = ClassMatcher::new(&config.classes);
    let threshold = config.scoring.fuzzy_threshold;
    let plan = search_plan(config);
    let mut stats = RunStats::default();

    info!(pairs = plan.len(), threshold, "screening started");

    for (index, pair) in plan.iter().enumerate() {
        debug!(pair = %pair, "[{}/{}]", index + 1, plan.len());

        let request = match builder.build_for(pair) {
            Ok(request) => request,
            Err(e) => {
                warn!(pair = %pair, "skipping: {}", e);
                stats.pairs_skipped += 1;
                reporter.record_failure(pair, &e)?;
                continue;
            }
        };

        stats.pairs_attempted += 1;
        let candidates = match fetcher.fetch(&request).await {
            Ok(candidates) => candidates,
            Err(e) if !e.is_pair_local() => return Err(e),
            Err(e) => {
                error!(pair = %pair, "search failed: {}", e);
                stats.pairs_failed += 1;
                reporter.record_failure(pair, &e)?;
                continue;
            }
        };

        let mut matches = score_candidates(pair, &candidates, threshold);
        classes.annotate(&mut matches);
        sort_matches(&mut matches);
        debug!(
            pair = %pair,
            candidates = candidates.len(),
            kept = matches.len(),
            "scored"
        );
        stats.matches += reporter.record(pair, &matches)?;
    }

    stats.api_calls = fetcher.calls_made();
    info!(
        attempted = stats.pairs_attempted,
        failed = stats.pairs_failed,
        skipped = stats.pairs_skipped,
        matches = stats.matches,
        api_calls = stats.api_calls,
        "screening finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScreenError;
    use crate::fetcher::fakes::ScriptedTransport;
    use crate::fetcher::CandidateMark;

    fn config(pairs: &[(&str, &str)], exact_check: bool) -> Config {
        let mut config = Config::default();
        config.pairs = pairs.iter().map(|(t, s)| SearchPair::new(*t, *s)).collect();
        config.search.exact_check = exact_check;
        config.pacing.request_delay_ms = 0;
        config.pacing.retry_delay_ms = 0;
        config
    }

    #[test]
    fn test_plan_appends_exact_per_target() {
        let config = config(&[("LEAPWISE", "LEAP"), ("LEAPWISE", "WISE"), ("SPRYNOVA", "SPRY")], true);
        let plan = search_plan(&config);
        assert_eq!(plan.len(), 5);
        assert_eq!(plan[3], SearchPair::exact("LEAPWISE"));
        assert_eq!(plan[4], SearchPair::exact("SPRYNOVA"));
    }

    #[tokio::test]
    async fn test_failed_pair_does_not_stop_run() {
        let config = config(&[("LEAPWISE", "LEAP"), ("SPRYNOVA", "SPRY")], false);
        let transport = ScriptedTransport::new();
        transport.push_error("LEAP", ScreenError::Transport("connection reset".into()));
        transport.push_page("SPRY", vec![CandidateMark::new("SPRYNOVA", "Live", "1")], Some(1));

        let mut fetcher = fetcher_for(&config, transport);
        let mut reporter = Reporter::new(Vec::new(), thresholds_for(&config).unwrap());
        let stats = run(&config, &mut fetcher, &mut reporter).await.unwrap();

        assert_eq!(stats.pairs_attempted, 2);
        assert_eq!(stats.pairs_failed, 1);
        assert_eq!(stats.matches, 1);
        assert_eq!(reporter.rows()[0].target_name, "SPRYNOVA");
    }

    #[tokio::test]
    async fn test_non_pair_error_aborts_run() {
        let config = config(&[("LEAPWISE", "LEAP"), ("SPRYNOVA", "SPRY")], false);
        let transport = ScriptedTransport::new();
        transport.push_error("LEAP", ScreenError::MissingApiKey);

        let mut fetcher = fetcher_for(&config, transport);
        let mut reporter = Reporter::new(Vec::new(), Thresholds::default());
        let err = run(&config, &mut fetcher, &mut reporter).await.unwrap_err();

        assert!(matches!(err, ScreenError::MissingApiKey));
        assert_eq!(fetcher.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_matches_carry_inferred_classes() {
        let config = config(&[("LEAPWISE", "LEAP")], false);
        let transport = ScriptedTransport::new();
        transport.push_page(
            "LEAP",
            vec![
                CandidateMark::new("LEAPWIT", "Live", "1").with_details("", "class 9 apps"),
                CandidateMark::new("LEAPWIT", "Live", "2").with_details("5000002", "International Class 41 seminars"),
            ],
            Some(2),
        );

        let mut fetcher = fetcher_for(&config, transport);
        let mut reporter = Reporter::new(Vec::new(), thresholds_for(&config).unwrap());
        run(&config, &mut fetcher, &mut reporter).await.unwrap();

        let rows = reporter.rows();
        assert_eq!(rows[0].serial_number, "2");
        assert_eq!(rows[0].registration_number, "5000002");
        assert_eq!(rows[0].inferred_classes, "41");
        assert!(rows[0].class_match);
        assert_eq!(rows[1].inferred_classes, "9");
        assert!(!rows[1].class_match);
    }

    #[tokio::test]
    async fn test_blank_stem_is_skipped() {
        let config = config(&[("LEAPWISE", " "), ("LEAPWISE", "LEAP")], false);
        let mut fetcher = fetcher_for(&config, ScriptedTransport::new());
        let mut reporter = Reporter::new(Vec::new(), Thresholds::default());
        let stats = run(&config, &mut fetcher, &mut reporter).await.unwrap();

        assert_eq!(stats.pairs_skipped, 1);
        assert_eq!(stats.pairs_attempted, 1);
        assert_eq!(fetcher.transport().requests().len(), 1);
    }
}
