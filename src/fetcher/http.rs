//! RapidAPI の USPTO 商標検索に対する reqwest トランスポート

use super::{SearchPage, SearchTransport};
use crate::config::{ApiKey, SearchSettings};
use crate::error::{Result, ScreenError};
use crate::query::SearchRequest;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

const BODY_PREVIEW_CHARS: usize = 200;

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_host: String,
    api_key: ApiKey,
}

impl HttpTransport {
    pub fn new(settings: &SearchSettings, api_key: ApiKey) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tm-screen/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| ScreenError::Transport(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_host: settings.api_host.clone(),
            api_key,
        })
    }

    fn url(&self, request: &SearchRequest) -> String {
        format!("{}{}", self.base_url, request.path())
    }

    /// 1件だけの検索でAPIキーが通るか確かめる
    pub async fn verify(&self, request: &SearchRequest) -> Result<()> {
        self.search(&request.page(0, 1)).await.map(|_| ())
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage> {
        let url = self.url(request);
        debug!(%url, offset = request.offset, limit = request.limit, "GET");

        let response = self
            .client
            .get(&url)
            .query(&request.query_params())
            .header("x-rapidapi-key", self.api_key.expose())
            .header("x-rapidapi-host", &self.api_host)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| ScreenError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ScreenError::Transport(format!("reading body: {}", e.without_url())))?;

        if let Some(err) = status_error(status, &body) {
            return Err(err);
        }
        SearchPage::parse(&body)
    }
}

/// 失敗したHTTPステータスを対応するエラーに変換
fn status_error(status: StatusCode, body: &str) -> Option<ScreenError> {
    if status.is_success() {
        return None;
    }
    let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    let message = format!("HTTP {}: {}", status.as_u16(), preview.trim());

    Some(match status {
        StatusCode::TOO_MANY_REQUESTS => ScreenError::RateLimited(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ScreenError::Transport(format!("credential rejected ({})", message))
        }
        _ => ScreenError::Transport(message),
    })
}
