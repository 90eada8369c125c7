use crate::core::aggregator::Aggregator;
use crate::core::ReleaseSource;
use crate::utils::error::{ErrorCategory, FeedError};
use crate::utils::validation::validate_search_params;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

/// 兩個參數都以字串接收，驗證訊息才會一致
#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    pub keyword: Option<String>,
    pub limit: Option<String>,
}

pub fn router<S: ReleaseSource + 'static>(aggregator: Aggregator<S>) -> Router {
    Router::new()
        .route("/prtimes_posts", get(prtimes_posts::<S>))
        .with_state(aggregator)
}

async fn prtimes_posts<S: ReleaseSource + 'static>(
    State(aggregator): State<Aggregator<S>>,
    Query(params): Query<PostsQuery>,
) -> Response {
    let query = match validate_search_params(params.keyword.as_deref(), params.limit.as_deref()) {
        Ok(query) => query,
        Err(e) => return error_response(e),
    };

    match aggregator.run(&query).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => {
            tracing::error!("Error fetching data for '{}': {}", query.keyword, e);
            error_response(e)
        }
    }
}

fn error_response(err: FeedError) -> Response {
    let status = match err.category() {
        ErrorCategory::Validation => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.user_friendly_message()).into_response()
}
