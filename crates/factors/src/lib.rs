#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod portfolio;
pub use portfolio::{
    BreakpointConfig, FactorBuilder, LongShortFactor, SortLegs, SortMember, build_factor,
    leg_returns, split_legs,
};

mod size;
pub use size::SizeSort;

mod value;
pub use value::ValueSort;

mod profitability;
pub use profitability::ProfitabilitySort;

mod investment;
pub use investment::InvestmentSort;

mod error;
pub use error::SortError;
