use crate::config::{
    DEFAULT_API_BASE_URL, DEFAULT_SITE_BASE_URL, DEFAULT_TIMEOUT_SECONDS, MAX_CONCURRENT_REQUESTS,
};
use crate::core::aggregator::DEFAULT_CONCURRENT_REQUESTS;
use crate::core::date_normalizer::DEFAULT_UTC_OFFSET_HOURS;
use crate::core::{ConfigProvider, SearchQuery, Storage};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "prtimes-aggregator")]
#[command(about = "Collect PR TIMES press releases for a keyword, ranked by likes")]
pub struct CliConfig {
    /// Search keyword
    #[arg(short, long)]
    pub keyword: String,

    /// Keep only the top N releases
    #[arg(short, long)]
    pub limit: Option<String>,

    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    #[arg(long, default_value = DEFAULT_SITE_BASE_URL)]
    pub site_base_url: String,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    #[arg(long, default_value_t = DEFAULT_CONCURRENT_REQUESTS)]
    pub concurrent_requests: usize,

    #[arg(long, default_value_t = DEFAULT_UTC_OFFSET_HOURS, allow_hyphen_values = true)]
    pub utc_offset_hours: i32,

    /// Write the JSON result to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(long, help = "Pretty-print the JSON result")]
    pub pretty: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn search_query(&self) -> Result<SearchQuery> {
        validation::validate_search_params(Some(&self.keyword), self.limit.as_deref())
    }
}

impl ConfigProvider for CliConfig {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn site_base_url(&self) -> &str {
        &self.site_base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn concurrent_requests(&self) -> usize {
        self.concurrent_requests
    }

    fn utc_offset_hours(&self) -> i32 {
        self.utc_offset_hours
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_base_url", &self.api_base_url)?;
        validation::validate_url("site_base_url", &self.site_base_url)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds as usize, 1)?;
        validation::validate_range(
            "concurrent_requests",
            self.concurrent_requests,
            1,
            MAX_CONCURRENT_REQUESTS,
        )?;
        validation::validate_range("utc_offset_hours", self.utc_offset_hours, -23, 23)?;
        if let Some(output) = &self.output {
            validation::validate_non_empty_string("output", output)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["prtimes-aggregator"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--keyword", "AI"]);

        assert_eq!(config.api_base_url(), "https://prtimes.jp");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.utc_offset_hours(), 9);
        assert!(config.validate().is_ok());
        assert_eq!(config.search_query().unwrap().limit, None);
    }

    #[test]
    fn test_keyword_is_required() {
        assert!(CliConfig::try_parse_from(["prtimes-aggregator"]).is_err());
    }

    #[test]
    fn test_limit_validation() {
        let config = parse(&["-k", "AI", "--limit", "3"]);
        assert_eq!(config.search_query().unwrap().limit, Some(3));

        let config = parse(&["-k", "AI", "--limit", "zero"]);
        assert!(config.search_query().is_err());
    }

    #[test]
    fn test_invalid_settings() {
        let config = parse(&["-k", "AI", "--api-base-url", "ftp://prtimes.jp"]);
        assert!(config.validate().is_err());

        let config = parse(&["-k", "AI", "--concurrent-requests", "0"]);
        assert!(config.validate().is_err());

        let config = parse(&["-k", "AI", "--utc-offset-hours", "-30"]);
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_local_storage_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());

        storage.write_file("nested/result.json", b"[]").await.unwrap();

        let written = std::fs::read(dir.path().join("nested/result.json")).unwrap();
        assert_eq!(written, b"[]");
    }
}
