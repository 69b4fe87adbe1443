#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod firm;
pub use firm::{Firm, ReturnProfile, ReturnStats, zscore};

mod regression;
pub use regression::{FactorFit, FactorRegression, factor_panel};

mod thresholds;
pub use thresholds::{DEFAULT_THRESHOLDS, ThresholdBank};

mod event_test;
pub use event_test::{
    BreachRow, BreachTable, Comparison, EventTestReport, EventTester, ExpectedRow, ModelReport,
};

mod selection;
pub use selection::{Selection, SelectionSummary};

mod esg;
pub use esg::mean_esg;

mod tables;
pub use tables::{
    comparison_frame, expected_frame, firms_label, observed_frame, report_sheets,
};

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use tailwatch_primitives::{FirmData, ReturnModel};

    pub use super::{EventTestReport, EventTester, Firm, ModelError, Selection, ThresholdBank};
}
