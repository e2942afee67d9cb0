//! 検索APIのレスポンス定義
//!
//! 生の項目はここで検証する。形の合わないものは半端なレコードにせず
//! `MalformedResponse` にする。

use crate::error::{Result, ScreenError};
use serde::Deserialize;
use tm_screen_common::MarkStatus;

/// 検索で返った登録商標レコード
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMark {
    pub mark_text: String,
    pub status: MarkStatus,
    /// APIが返したままのステータス表記
    pub status_label: String,
    pub serial_number: String,
    /// 登録前の出願は空
    pub registration_number: String,
    /// 指定商品・役務の説明文
    pub description: String,
}

impl CandidateMark {
    pub fn new(mark_text: impl Into<String>, status_label: &str, serial_number: impl Into<String>) -> Self {
        Self {
            mark_text: mark_text.into(),
            status: MarkStatus::from_label(status_label),
            status_label: status_label.to_string(),
            serial_number: serial_number.into(),
            registration_number: String::new(),
            description: String::new(),
        }
    }

    pub fn with_details(mut self, registration_number: impl Into<String>, description: impl Into<String>) -> Self {
        self.registration_number = registration_number.into();
        self.description = description.into();
        self
    }
}

/// 検証済みの1ページ分
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub records: Vec<CandidateMark>,
    /// APIが申告した総ヒット数
    pub total: Option<usize>,
}

#[derive(Deserialize)]
struct RawPage {
    count: Option<u64>,
    items: Option<Vec<RawItem>>,
}

#[derive(Deserialize)]
struct RawItem {
    keyword: Option<String>,
    status_label: Option<String>,
    serial_number: Option<RawSerial>,
    registration_number: Option<RawSerial>,
    description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSerial {
    Text(String),
    Number(u64),
}

impl SearchPage {
    pub fn new(records: Vec<CandidateMark>, total: Option<usize>) -> Self {
        Self { records, total }
    }

    /// レスポンス本文を検証する
    pub fn parse(body: &str) -> Result<Self> {
        let raw: RawPage = serde_json::from_str(body)
            .map_err(|e| ScreenError::MalformedResponse(format!("unexpected payload: {}", e)))?;
        let total = raw.count.map(|c| c as usize);

        let items = match (raw.items, total) {
            (Some(items), _) => items,
            (None, Some(0)) => Vec::new(),
            (None, _) => {
                return Err(ScreenError::MalformedResponse("missing items".into()));
            }
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| item.validate(index))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { records, total })
    }
}

impl RawItem {
    fn validate(self, index: usize) -> Result<CandidateMark> {
        let mark_text = self
            .keyword
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ScreenError::MalformedResponse(format!("item {} has no mark text", index)))?;

        let serial_number = match self.serial_number {
            Some(RawSerial::Text(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(RawSerial::Number(n)) => n.to_string(),
            _ => {
                return Err(ScreenError::MalformedResponse(format!(
                    "item {} ('{}') has no serial number",
                    index, mark_text
                )));
            }
        };

        // 登録番号と説明文は欠けていても候補として扱う
        let registration_number = match self.registration_number {
            Some(RawSerial::Text(s)) => s.trim().to_string(),
            Some(RawSerial::Number(n)) => n.to_string(),
            None => String::new(),
        };

        let status_label = self.status_label.unwrap_or_default();
        Ok(CandidateMark {
            mark_text,
            status: MarkStatus::from_label(&status_label),
            status_label,
            serial_number,
            registration_number,
            description: self.description.map(|d| d.trim().to_string()).unwrap_or_default(),
        })
    }
}
