use crate::domain::model::PageResult;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn site_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn concurrent_requests(&self) -> usize;
    fn utc_offset_hours(&self) -> i32;
}

/// 上游新聞稿 API。錯誤一律往上回報，預設值由呼叫端決定。
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<PageResult>;
    async fn fetch_like_count(&self, release_id: &str) -> Result<u64>;
}
