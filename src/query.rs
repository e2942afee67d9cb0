//! 検索リクエストの組み立て
//!
//! `(target_name, stem)` の組をフェッチャーが送るリクエストに変える。
//! 検索モードとステータス条件は設定から取り、呼び出しごとには変えない。

use crate::config::SearchSettings;
use crate::error::{Result, ScreenError};
use serde::{Deserialize, Serialize};
use std::fmt;
use tm_screen_common::EXACT_STEM;

/// 入力の単位: 候補名と、検索を広げるためのステム
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPair {
    pub target_name: String,
    pub stem: String,
}

impl SearchPair {
    pub fn new(target_name: impl Into<String>, stem: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
            stem: stem.into(),
        }
    }

    /// `target_name` の完全一致検索用のペア
    pub fn exact(target_name: impl Into<String>) -> Self {
        Self::new(target_name, EXACT_STEM)
    }

    pub fn is_exact(&self) -> bool {
        self.stem == EXACT_STEM
    }
}

impl fmt::Display for SearchPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' / '{}'", self.target_name, self.stem)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Exact,
    Prefix,
    Suffix,
    #[default]
    Contains,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Exact => "exact",
            SearchMode::Prefix => "prefix",
            SearchMode::Suffix => "suffix",
            SearchMode::Contains => "contains",
        }
    }
}

/// 取得する登録レコードの範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Active,
    All,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::All => "all",
        }
    }
}

/// 検索エンドポイントへの1ページ分のリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
    pub mode: SearchMode,
    pub status: StatusFilter,
    pub offset: usize,
    pub limit: usize,
}

impl SearchRequest {
    /// 同じ検索で取得範囲だけ変える
    pub fn page(&self, offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
            ..self.clone()
        }
    }

    /// ベースURL以下のパス。検索語は1セグメントとしてエンコードする
    pub fn path(&self) -> String {
        format!(
            "/v1/trademarkSearch/{}/{}",
            urlencoding::encode(&self.term),
            self.status.as_str()
        )
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("mode", self.mode.as_str().to_string()),
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    mode: SearchMode,
    status: StatusFilter,
    page_size: usize,
}

impl QueryBuilder {
    pub fn new(mode: SearchMode, status: StatusFilter, page_size: usize) -> Self {
        Self {
            mode,
            status,
            page_size: page_size.max(1),
        }
    }

    pub fn from_settings(settings: &SearchSettings) -> Self {
        Self::new(settings.mode, settings.status, settings.page_size)
    }

    /// ステム検索の1ページ目
    pub fn build(&self, pair: &SearchPair) -> Result<SearchRequest> {
        let stem = normalize_term(&pair.stem);
        if stem.is_empty() {
            return Err(ScreenError::InvalidPair(format!(
                "empty stem for target '{}'",
                pair.target_name
            )));
        }
        Ok(self.request(stem, self.mode))
    }

    /// 対象名そのままで検索する1ページ目
    pub fn build_exact(&self, target_name: &str) -> Result<SearchRequest> {
        let term = normalize_term(target_name);
        if term.is_empty() {
            return Err(ScreenError::InvalidPair("empty target name".to_string()));
        }
        Ok(self.request(term, SearchMode::Exact))
    }

    /// どちらの種類のペアにも使える
    pub fn build_for(&self, pair: &SearchPair) -> Result<SearchRequest> {
        if pair.is_exact() {
            self.build_exact(&pair.target_name)
        } else {
            self.build(pair)
        }
    }

    fn request(&self, term: String, mode: SearchMode) -> SearchRequest {
        SearchRequest {
            term,
            mode,
            status: self.status,
            offset: 0,
            limit: self.page_size,
        }
    }
}

fn normalize_term(term: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join(" ")
}
