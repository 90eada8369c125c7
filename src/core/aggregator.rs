use crate::core::date_normalizer::DateNormalizer;
use crate::core::finalize::finalize;
use crate::core::release_id::extract_release_id;
use crate::domain::model::{RawListing, ResultItem, SearchQuery};
use crate::domain::ports::{ConfigProvider, ReleaseSource};
use crate::utils::error::{FeedError, Result};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

/// 按讚數查不到 (沒有 ID 或請求失敗) 時使用的值
pub const FALLBACK_LIKE_COUNT: u64 = 0;

pub const DEFAULT_CONCURRENT_REQUESTS: usize = 8;

/// 一次請求的範圍：限流與結果集合只活到 `collect` 結束
struct RequestScope<S> {
    source: Arc<S>,
    site_base_url: String,
    normalizer: DateNormalizer,
    permits: Semaphore,
    results: Mutex<Vec<ResultItem>>,
}

pub struct Aggregator<S: ReleaseSource + 'static> {
    source: Arc<S>,
    site_base_url: String,
    normalizer: DateNormalizer,
    concurrent_requests: usize,
}

impl<S: ReleaseSource + 'static> Clone for Aggregator<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            site_base_url: self.site_base_url.clone(),
            normalizer: self.normalizer,
            concurrent_requests: self.concurrent_requests,
        }
    }
}

impl<S: ReleaseSource + 'static> Aggregator<S> {
    pub fn new(source: S, site_base_url: impl Into<String>) -> Self {
        let site_base_url: String = site_base_url.into();
        Self {
            source: Arc::new(source),
            site_base_url: site_base_url.trim_end_matches('/').to_string(),
            normalizer: DateNormalizer::default(),
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
        }
    }

    pub fn from_config<C: ConfigProvider>(source: S, config: &C) -> Result<Self> {
        let hours = config.utc_offset_hours();
        let normalizer = DateNormalizer::from_offset_hours(hours).ok_or_else(|| {
            FeedError::InvalidConfigValueError {
                field: "utc_offset_hours".to_string(),
                value: hours.to_string(),
                reason: "Not a valid UTC offset".to_string(),
            }
        })?;

        Ok(Self::new(source, config.site_base_url())
            .with_normalizer(normalizer)
            .with_concurrency(config.concurrent_requests()))
    }

    pub fn with_normalizer(mut self, normalizer: DateNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_concurrency(mut self, concurrent_requests: usize) -> Self {
        self.concurrent_requests = concurrent_requests.max(1);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 取回所有頁面、排序並依 `limit` 截斷
    pub async fn run(&self, query: &SearchQuery) -> Result<Vec<ResultItem>> {
        let items = self.collect(&query.keyword).await?;
        let total = items.len();
        let items = finalize(items, query.limit);

        tracing::info!(
            "✅ '{}': returning {} of {} releases",
            query.keyword,
            items.len(),
            total
        );
        Ok(items)
    }

    /// 取回所有頁面的結果，順序未定義。
    ///
    /// 第 1 頁失敗時整個請求失敗；其他頁失敗只記錄並略過。
    pub async fn collect(&self, keyword: &str) -> Result<Vec<ResultItem>> {
        tracing::debug!("📡 Fetching page 1 for '{}'", keyword);
        let first_page = self
            .source
            .fetch_page(keyword, 1)
            .await
            .map_err(|e| {
                tracing::error!("❌ Error fetching page 1 for '{}': {}", keyword, e);
                FeedError::UpstreamUnavailable {
                    keyword: keyword.to_string(),
                    source: Box::new(e),
                }
            })?;

        let last_page = first_page.last_page;
        tracing::info!("📄 '{}': {} page(s) reported by upstream", keyword, last_page);

        let scope = Arc::new(RequestScope {
            source: Arc::clone(&self.source),
            site_base_url: self.site_base_url.clone(),
            normalizer: self.normalizer,
            permits: Semaphore::new(self.concurrent_requests),
            results: Mutex::new(Vec::new()),
        });

        let mut tasks = JoinSet::new();

        // 第 1 頁已經取回，不再重抓；last_page 為 0 時沒有任何頁面要處理
        if last_page >= 1 {
            let scope = Arc::clone(&scope);
            let listings = first_page.listings;
            tasks.spawn(async move {
                scope.enrich_page(1, listings).await;
                1
            });
        }

        for page in 2..=last_page {
            let scope = Arc::clone(&scope);
            let keyword = keyword.to_string();
            tasks.spawn(async move {
                let fetched = scope
                    .throttled(scope.source.fetch_page(&keyword, page))
                    .await;
                match fetched {
                    Ok(page_result) => scope.enrich_page(page, page_result.listings).await,
                    Err(e) => tracing::warn!("Error fetching page {}: {}", page, e),
                }
                page
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(page) => tracing::debug!("Page {} done", page),
                Err(e) => tracing::warn!("Page task aborted: {}", e),
            }
        }

        let items = std::mem::take(&mut *scope.results.lock().await);
        tracing::debug!("Collected {} releases for '{}'", items.len(), keyword);
        Ok(items)
    }
}

impl<S: ReleaseSource> RequestScope<S> {
    async fn throttled<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        // semaphore 從不 close，acquire 不會失敗
        let _permit = self.permits.acquire().await.ok();
        call.await
    }

    async fn enrich_page(&self, page: u32, listings: Vec<RawListing>) {
        tracing::debug!("Page {}: enriching {} releases", page, listings.len());
        join_all(listings.into_iter().map(|listing| self.enrich_listing(listing))).await;
    }

    async fn enrich_listing(&self, listing: RawListing) {
        let release_id = extract_release_id(&listing.release_url);
        let like_count = self.like_count_or_fallback(&release_id).await;

        let item = ResultItem {
            published_at: self.normalizer.normalize(&listing.released_at),
            post_url: format!("{}{}", self.site_base_url, listing.release_url),
            corporation_name: listing.company_name,
            thumbnail_url: listing.thumbnail_url,
            title: listing.title,
            like_count,
        };

        self.results.lock().await.push(item);
    }

    async fn like_count_or_fallback(&self, release_id: &str) -> u64 {
        if release_id.is_empty() {
            tracing::debug!("No release id, using fallback like count");
            return FALLBACK_LIKE_COUNT;
        }

        match self
            .throttled(self.source.fetch_like_count(release_id))
            .await
        {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!("Error fetching like count for {}: {}", release_id, e);
                FALLBACK_LIKE_COUNT
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::PageResult;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct MockSource {
        pages: HashMap<u32, PageResult>,
        likes: HashMap<String, u64>,
        page_calls: std::sync::Mutex<Vec<u32>>,
        like_calls: AtomicUsize,
        delay: Option<Duration>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockSource {
        fn page_calls(&self) -> Vec<u32> {
            let mut calls = self.page_calls.lock().unwrap().clone();
            calls.sort();
            calls
        }

        async fn simulate_latency(&self) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ReleaseSource for MockSource {
        async fn fetch_page(&self, _keyword: &str, page: u32) -> Result<PageResult> {
            self.page_calls.lock().unwrap().push(page);
            self.simulate_latency().await;
            self.pages
                .get(&page)
                .cloned()
                .ok_or_else(|| FeedError::UpstreamStatusError {
                    url: format!("mock://page/{}", page),
                    status: 500,
                })
        }

        async fn fetch_like_count(&self, release_id: &str) -> Result<u64> {
            self.like_calls.fetch_add(1, Ordering::SeqCst);
            self.simulate_latency().await;
            self.likes
                .get(release_id)
                .copied()
                .ok_or_else(|| FeedError::UpstreamStatusError {
                    url: format!("mock://likes/{}", release_id),
                    status: 404,
                })
        }
    }

    fn listing(company: u32, release: u32, released_at: &str) -> RawListing {
        RawListing {
            company_name: format!("Company {}", company),
            title: format!("Release {}.{}", company, release),
            thumbnail_url: format!("https://prtimes.jp/i/{}/{}/thumb.jpg", company, release),
            release_url: format!("/main/html/rd/p/{}.{}.html", release, company),
            released_at: released_at.to_string(),
        }
    }

    fn page(current: u32, last: u32, listings: Vec<RawListing>) -> PageResult {
        PageResult {
            current_page: current,
            last_page: last,
            listings,
        }
    }

    /// 3 頁：2 + 2 + 1 筆，按讚數依 release 編號
    fn three_page_source() -> MockSource {
        let mut source = MockSource::default();
        source.pages.insert(
            1,
            page(1, 3, vec![listing(1, 1, "3時間前"), listing(1, 2, "45分前")]),
        );
        source.pages.insert(
            2,
            page(
                2,
                3,
                vec![
                    listing(2, 3, "2024年12月3日 09時00分"),
                    listing(2, 4, "unknown"),
                ],
            ),
        );
        source
            .pages
            .insert(3, page(3, 3, vec![listing(3, 5, "1時間前")]));

        for (company, release) in [(1, 1), (1, 2), (2, 3), (2, 4), (3, 5)] {
            source
                .likes
                .insert(format!("{}.{}", release, company), release as u64 * 10);
        }
        source
    }

    fn query(keyword: &str, limit: Option<usize>) -> SearchQuery {
        SearchQuery {
            keyword: keyword.to_string(),
            limit,
        }
    }

    #[tokio::test]
    async fn test_collect_all_pages() {
        let aggregator = Aggregator::new(three_page_source(), "https://prtimes.jp");

        let items = aggregator.collect("AI").await.unwrap();

        assert_eq!(items.len(), 5);
        // page 1 is reused, never fetched twice
        assert_eq!(aggregator.source().page_calls(), vec![1, 2, 3]);
        assert_eq!(aggregator.source().like_calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_result_item_fields() {
        let aggregator = Aggregator::new(three_page_source(), "https://prtimes.jp/");

        let items = aggregator.collect("AI").await.unwrap();
        let item = items
            .iter()
            .find(|i| i.title == "Release 2.3")
            .expect("release from page 2");

        assert_eq!(item.corporation_name, "Company 2");
        assert_eq!(item.published_at, "2024年12月03日 09:00");
        assert_eq!(item.post_url, "https://prtimes.jp/main/html/rd/p/3.2.html");
        assert_eq!(item.thumbnail_url, "https://prtimes.jp/i/2/3/thumb.jpg");
        assert_eq!(item.like_count, 30);
    }

    #[tokio::test]
    async fn test_first_page_failure_is_fatal() {
        let mut source = three_page_source();
        source.pages.remove(&1);
        let aggregator = Aggregator::new(source, "https://prtimes.jp");

        let err = aggregator.collect("AI").await.unwrap_err();

        assert!(matches!(err, FeedError::UpstreamUnavailable { .. }));
        assert_eq!(aggregator.source().page_calls(), vec![1]);
        assert_eq!(aggregator.source().like_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_other_page_failure_is_skipped() {
        let mut source = three_page_source();
        source.pages.remove(&2);
        let aggregator = Aggregator::new(source, "https://prtimes.jp");

        let items = aggregator.collect("AI").await.unwrap();

        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| !i.corporation_name.contains('2')));
        assert_eq!(aggregator.source().page_calls(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_like_count_fallback_keeps_item() {
        let mut source = MockSource::default();
        let mut no_id = listing(9, 9, "3時間前");
        no_id.release_url = "/topics/somewhere-else".to_string();
        source.pages.insert(
            1,
            page(1, 1, vec![listing(1, 1, "3時間前"), listing(1, 2, "3時間前"), no_id]),
        );
        source.likes.insert("1.1".to_string(), 4);
        // "2.1" missing: lookup fails

        let aggregator = Aggregator::new(source, "https://prtimes.jp");
        let items = aggregator.run(&query("AI", None)).await.unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].like_count, 4);
        assert_eq!(items[1].like_count, FALLBACK_LIKE_COUNT);
        assert_eq!(items[2].like_count, FALLBACK_LIKE_COUNT);
        // the listing without an id never reaches the popularity endpoint
        assert_eq!(aggregator.source().like_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_sorts_and_limits() {
        let aggregator = Aggregator::new(three_page_source(), "https://prtimes.jp");

        let all = aggregator.run(&query("AI", None)).await.unwrap();
        let likes: Vec<u64> = all.iter().map(|i| i.like_count).collect();
        assert_eq!(likes, vec![50, 40, 30, 20, 10]);

        let top = aggregator.run(&query("AI", Some(2))).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].like_count, 50);
        assert_eq!(top[1].like_count, 40);
    }

    #[tokio::test]
    async fn test_empty_search() {
        let mut source = MockSource::default();
        source.pages.insert(1, page(1, 0, vec![]));
        let aggregator = Aggregator::new(source, "https://prtimes.jp");

        let items = aggregator.run(&query("nothing", Some(5))).await.unwrap();

        assert!(items.is_empty());
        assert_eq!(aggregator.source().page_calls(), vec![1]);
    }

    #[tokio::test]
    async fn test_zero_last_page_ignores_first_page_listings() {
        let mut source = MockSource::default();
        source
            .pages
            .insert(1, page(1, 0, vec![listing(1, 1, "1分前")]));
        source.likes.insert("1.1".to_string(), 3);
        let aggregator = Aggregator::new(source, "https://prtimes.jp");

        let items = aggregator.collect("AI").await.unwrap();

        assert!(items.is_empty());
        assert_eq!(aggregator.source().page_calls(), vec![1]);
        assert_eq!(aggregator.source().like_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let mut source = MockSource::default();
        let last_page = 6;
        for p in 1..=last_page {
            source.pages.insert(
                p,
                page(p, last_page, vec![listing(p, 1, "1分前"), listing(p, 2, "1分前")]),
            );
        }
        source.delay = Some(Duration::from_millis(20));

        let aggregator = Aggregator::new(source, "https://prtimes.jp").with_concurrency(2);
        let items = aggregator.collect("AI").await.unwrap();

        assert_eq!(items.len(), 12);
        // page 1 is fetched before the fan-out, outside the bound
        assert!(aggregator.source().max_in_flight.load(Ordering::SeqCst) <= 2);
    }
}
