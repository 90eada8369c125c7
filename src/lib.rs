pub mod adapters;
#[cfg(feature = "server")]
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use adapters::http::PrTimesClient;
pub use config::TomlConfig;
pub use crate::core::{aggregator::Aggregator, date_normalizer::DateNormalizer};
pub use domain::model::{ResultItem, SearchQuery};
pub use utils::error::{FeedError, Result};
