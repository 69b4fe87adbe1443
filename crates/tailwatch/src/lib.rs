//! # tailwatch
//!
//! Abnormal-return event study engine.
//!
//! Tests whether stock returns on chosen calendar dates breach the z-score
//! thresholds more often than a normal distribution predicts, per country
//! and per broad industry, under raw, CAPM, three-factor and five-factor
//! return models.
//!
//! This crate re-exports the workspace crates. Individual components can be
//! enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Core type definitions
//! - `traits`: Provider, store and sink abstractions
//! - `math`: Statistics, regression and density estimation
//! - `factors`: Long-short factor construction
//! - `model`: Firm model and z-score event testing
//! - `utils`: Date selections and data preparation
//! - `data`: Providers, caches and result sinks
//! - `study`: Country and industry orchestration
//! - `cli`: The `tailwatch` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use tailwatch::{data::MemorySink, study::{Study, StudyConfig}};
//!
//! let config = StudyConfig::from_path("study.json")?;
//! let mut loader = config.loader(provider, store);
//! let study = Study::build(&config, &mut loader)?;
//! let results = study.execute(&"2020-03-09..2020-03-20".parse()?, &"2015..2022".parse()?, &mut sink, true)?;
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tailwatch/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use tailwatch_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use tailwatch_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use tailwatch_math as math;
#[cfg(feature = "factors")]
#[doc(inline)]
pub use tailwatch_factors as factors;
#[cfg(feature = "model")]
#[doc(inline)]
pub use tailwatch_model as model;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use tailwatch_utils as utils;
#[cfg(feature = "data")]
#[doc(inline)]
pub use tailwatch_data as data;
#[cfg(feature = "study")]
#[doc(inline)]
pub use tailwatch_study as study;
