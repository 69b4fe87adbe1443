#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod csv_io;

mod provider;
pub use provider::FileProvider;

mod retry;
pub use retry::{RetryPolicy, RetryingProvider};

mod store;
pub use store::{CsvStore, MemoryStore};

mod sink;
pub use sink::{CsvWorkbookSink, MAX_SHEET_NAME_LEN, MemorySink};

mod cache;
pub use cache::{FirmKey, FirmQuery, RunCache, SeriesKey};

mod loader;
pub use loader::{CountryMarket, DataLoader};

mod error;
pub use error::DataError;
