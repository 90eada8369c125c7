use crate::domain::model::{LikeCountEnvelope, PageResult, SearchEnvelope};
use crate::domain::ports::{ConfigProvider, ReleaseSource};
use crate::utils::error::{FeedError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// 每頁固定筆數，上游不提供調整
pub const PAGE_SIZE: u32 = 40;

const SEARCH_PATH: &str = "/api/keyword_search.php/search";

/// PR TIMES 的關鍵字搜尋與按讚數 API
#[derive(Debug, Clone)]
pub struct PrTimesClient {
    client: Client,
    api_base_url: String,
}

impl PrTimesClient {
    pub fn new(api_base_url: &str, timeout: Duration) -> Result<Self> {
        // 先確認 base URL 可以解析
        Url::parse(api_base_url)?;

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.api_base_url(), config.request_timeout())
    }

    pub fn search_url(&self, keyword: &str, page: u32) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.api_base_url, SEARCH_PATH))?;
        url.query_pairs_mut()
            .append_pair("keyword", keyword)
            .append_pair("page", &page.to_string())
            .append_pair("limit", &PAGE_SIZE.to_string());
        Ok(url)
    }

    pub fn like_count_url(&self, release_id: &str) -> Result<Url> {
        Ok(Url::parse(&format!(
            "{}/api/press_release.php/press_release/{}/like_count",
            self.api_base_url, release_id
        ))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(url.clone()).send().await?;

        tracing::debug!("API response status: {}", response.status());
        if !response.status().is_success() {
            return Err(FeedError::UpstreamStatusError {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ReleaseSource for PrTimesClient {
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<PageResult> {
        let url = self.search_url(keyword, page)?;
        let envelope: SearchEnvelope = self.get_json(url).await?;
        Ok(envelope.into())
    }

    async fn fetch_like_count(&self, release_id: &str) -> Result<u64> {
        if release_id.is_empty() {
            return Err(FeedError::validation("release id cannot be empty"));
        }

        let url = self.like_count_url(release_id)?;
        let envelope: LikeCountEnvelope = self.get_json(url).await?;
        Ok(envelope.data.like_count)
    }
}
