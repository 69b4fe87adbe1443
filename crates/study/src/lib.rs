#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::{CountrySpec, StudyConfig};

mod names;
pub use names::workbook_label;

mod study;
pub use study::{GroupResult, ReturnDistribution, Study, StudyResults};

mod error;
pub use error::StudyError;

/// Re-export commonly used types.
pub mod prelude {
    pub use tailwatch_utils::{DateSelection, YearSelection};

    pub use super::{Study, StudyConfig, StudyError, StudyResults};
}
