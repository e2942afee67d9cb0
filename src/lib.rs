//! 商標類似のバッチ審査
//!
//! 設定した `(target_name, stem)` の組ごとに登録商標を検索し、
//! 返った商標を対象名と比べてスコアを付け、判定してタイムスタンプ付きの
//! レポートに書き出す。

pub mod classes;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod query;
pub mod reporter;
pub mod scorer;
