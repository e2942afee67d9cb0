//! テスト用のメモリ内トランスポート
//!
//! 応答は検索語ごとに積んだ順に返す。何も積んでいない語には空ページを返す。

use super::{CandidateMark, SearchPage, SearchTransport};
use crate::error::{Result, ScreenError};
use crate::query::SearchRequest;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Result<SearchPage>>>>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, term: &str, records: Vec<CandidateMark>, total: Option<usize>) {
        self.push(term, Ok(SearchPage::new(records, total)));
    }

    pub fn push_error(&self, term: &str, error: ScreenError) {
        self.push(term, Err(error));
    }

    fn push(&self, term: &str, response: Result<SearchPage>) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts.entry(term.to_string()).or_default().push_back(response);
    }

    /// 受け取った全リクエスト（受信順）
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchTransport for ScriptedTransport {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        self.requests.lock().unwrap().push(request.clone());
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .get_mut(&request.term)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(SearchPage::default()))
    }
}
