use serde::{Deserialize, Serialize};

/// 關鍵字搜尋 API 的回應外層
#[derive(Debug, Clone, Deserialize)]
pub struct SearchEnvelope {
    pub data: SearchData,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchData {
    pub current_page: u32,
    pub last_page: u32,
    #[serde(default)]
    pub release_list: Vec<RawListing>,
}

/// 上游原封不動的新聞稿資料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub release_url: String,
    #[serde(default)]
    pub released_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub current_page: u32,
    pub last_page: u32,
    pub listings: Vec<RawListing>,
}

impl From<SearchEnvelope> for PageResult {
    fn from(envelope: SearchEnvelope) -> Self {
        Self {
            current_page: envelope.data.current_page,
            last_page: envelope.data.last_page,
            listings: envelope.data.release_list,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikeCountEnvelope {
    pub data: LikeCountData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikeCountData {
    pub like_count: u64,
}

/// 回傳給呼叫端的單筆結果。JSON 欄位名稱沿用既有 `/prtimes_posts` 的輸出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(rename = "corporationName")]
    pub corporation_name: String,
    #[serde(rename = "publishdDatetime")]
    pub published_at: String,
    #[serde(rename = "thumbnailUrl")]
    pub thumbnail_url: String,
    #[serde(rename = "postUrl")]
    pub post_url: String,
    pub title: String,
    #[serde(rename = "likeCount")]
    pub like_count: u64,
}

/// 已驗證的查詢；`limit` 為 `None` 代表不截斷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub limit: Option<usize>,
}
