#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailwatch/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod moments;
pub use moments::{covariance, mean, median, pct_change, quantile, sample_std, sample_variance};

mod normal;
pub use normal::{expected_breaches, tail_probability};

mod density;
pub use density::{GaussianKde, linspace, simpson};

mod linalg;
pub use linalg::{OlsResult, ordinary_least_squares};

mod error;
pub use error::MathError;
