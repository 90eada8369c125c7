use regex::Regex;
use std::sync::LazyLock;

static RE_RELEASE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/main/html/rd/p/([0-9]+)\.([0-9]+)\.html").unwrap());

/// 從 `/main/html/rd/p/<a>.<b>.html` 取出 `<a>.<b>`。
///
/// 不符合時回傳空字串，代表「沒有 ID 可查按讚數」，不是錯誤。
pub fn extract_release_id(release_url: &str) -> String {
    RE_RELEASE_PATH
        .captures(release_url)
        .and_then(|caps| match (caps.get(1), caps.get(2)) {
            (Some(company), Some(release)) => {
                Some(format!("{}.{}", company.as_str(), release.as_str()))
            }
            _ => None,
        })
        .unwrap_or_default()
}
