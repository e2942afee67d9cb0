//! 商標レジストリのページング取得
//!
//! 1検索につき `max_results` 件に達するか、プロバイダの結果が尽きるまでページを進める。
//! 総件数が返る場合は短いページでも打ち切らない。
//! レート制限(429)は固定待機後に1回だけ再試行し、それ以外の通信エラーは検索を中断する。

pub mod fakes;
mod http;
mod types;

pub use http::HttpTransport;
pub use types::{CandidateMark, SearchPage};

use crate::error::{Result, ScreenError};
use crate::query::SearchRequest;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// 1ページ分のリクエストを検索APIへ運ぶ
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage>;
}

/// レート制限応答への対応
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    pub retry_delay: Duration,
    pub max_retries: u32,
}

impl BackoffPolicy {
    /// `delay` 待って1回だけ再試行
    pub fn fixed(delay: Duration) -> Self {
        Self {
            retry_delay: delay,
            max_retries: 1,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(10))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchLimits {
    pub page_size: usize,
    pub max_results: usize,
    /// 最初の呼び出し以外の前に入れる待ち時間
    pub request_delay: Duration,
}

pub struct Fetcher<T> {
    transport: T,
    backoff: BackoffPolicy,
    limits: FetchLimits,
    calls_made: usize,
}

impl<T: SearchTransport> Fetcher<T> {
    pub fn new(transport: T, backoff: BackoffPolicy, limits: FetchLimits) -> Self {
        Self {
            transport,
            backoff,
            limits: FetchLimits {
                page_size: limits.page_size.max(1),
                ..limits
            },
            calls_made: 0,
        }
    }

    /// これまでのAPI呼び出し回数（再試行を含む）
    pub fn calls_made(&self) -> usize {
        self.calls_made
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 1つの検索について最大 `max_results` 件の候補を集める
    ///
    /// 壊れたページでページ送りは終わるが、それまでのページの結果は残す。
    pub async fn fetch(&mut self, request: &SearchRequest) -> Result<Vec<CandidateMark>> {
        let mut candidates: Vec<CandidateMark> = Vec::new();
        let mut offset = request.offset;

        loop {
            let remaining = self.limits.max_results.saturating_sub(candidates.len());
            if remaining == 0 {
                break;
            }
            let limit = remaining.min(self.limits.page_size);
            let page_request = request.page(offset, limit);

            let page = match self.fetch_page(&page_request).await {
                Ok(page) => page,
                Err(ScreenError::MalformedResponse(msg)) => {
                    warn!(term = %request.term, offset, "malformed page, stopping: {}", msg);
                    break;
                }
                Err(e) => return Err(e),
            };

            let received = page.records.len();
            debug!(term = %request.term, offset, received, total = ?page.total, "page fetched");
            candidates.extend(page.records.into_iter().take(remaining));
            offset += received;

            if received == 0 {
                break;
            }
            // 件数が返る場合はページが短くても総数まで読み進める
            match page.total {
                Some(total) if offset >= total => break,
                Some(_) => {}
                None if received < limit => break,
                None => {}
            }
        }

        Ok(candidates)
    }

    async fn fetch_page(&mut self, request: &SearchRequest) -> Result<SearchPage> {
        if self.calls_made > 0 && !self.limits.request_delay.is_zero() {
            tokio::time::sleep(self.limits.request_delay).await;
        }

        let mut retries_left = self.backoff.max_retries;
        loop {
            self.calls_made += 1;
            debug!(call = self.calls_made, term = %request.term, offset = request.offset, "API call");

            match self.transport.search(request).await {
                Err(ScreenError::RateLimited(msg)) if retries_left > 0 => {
                    retries_left -= 1;
                    warn!(
                        term = %request.term,
                        delay_ms = self.backoff.retry_delay.as_millis() as u64,
                        "rate limited, retrying once: {}",
                        msg
                    );
                    tokio::time::sleep(self.backoff.retry_delay).await;
                }
                Err(ScreenError::RateLimited(msg)) => {
                    return Err(ScreenError::Transport(format!(
                        "still rate limited after retry: {}",
                        msg
                    )));
                }
                other => return other,
            }
        }
    }
}
