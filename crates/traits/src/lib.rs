#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod factor;
pub use factor::{FactorError, FactorSort, SortRule};

mod provider;
pub use provider::{DataKind, FetchResult, MarketDataProvider, ProviderError};

mod store;
pub use store::{CacheKey, ResultSink, SeriesStore, Sheet, StoreError};
