#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod fill;
pub use fill::{FillDirection, align_esg_to_year_ends, fill_features, forward_fill_fundamentals};

mod dates;
pub use dates::{DateSelection, YearSelection, year_end};

mod trim;
pub use trim::{MinObservations, cumulative_index, returns_from_levels, trim_trailing_zeros};

mod error;
pub use error::UtilsError;
