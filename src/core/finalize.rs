use crate::domain::model::ResultItem;
use std::cmp::Reverse;

/// 依按讚數由高到低排序，再依 `limit` 截斷。`None` 或 `Some(0)` 不截斷。
pub fn finalize(mut items: Vec<ResultItem>, limit: Option<usize>) -> Vec<ResultItem> {
    items.sort_by_key(|item| Reverse(item.like_count));

    if let Some(limit) = limit.filter(|&l| l > 0) {
        items.truncate(limit);
    }

    items
}
