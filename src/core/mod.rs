pub mod aggregator;
pub mod date_normalizer;
pub mod finalize;
pub mod release_id;

pub use crate::domain::model::{PageResult, RawListing, ResultItem, SearchQuery};
pub use crate::domain::ports::{ConfigProvider, ReleaseSource, Storage};
pub use crate::utils::error::Result;
