#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub const DEFAULT_API_BASE_URL: &str = "https://prtimes.jp";
pub const DEFAULT_SITE_BASE_URL: &str = "https://prtimes.jp";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const MAX_CONCURRENT_REQUESTS: usize = 64;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;
