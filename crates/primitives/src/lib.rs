#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod firm;
pub use firm::{FirmData, FirmMeta, Ticker, broad_industry};

mod factor;
pub use factor::{FactorExposures, FactorKind, FactorSet, ReturnModel};

mod series;
pub use series::{AlignedSeries, DateSeries};

mod scores;
pub use scores::{Categorizers, EsgRecord, FundamentalsRecord};

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
