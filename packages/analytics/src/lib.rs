#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter engine and aggregations over the canonical incident dataset.
//!
//! [`filter`] resolves a raw [`incident_map_analytics_models::FilterRequest`]
//! against the dataset's known categories and narrows the dataset to a
//! subset. [`aggregate`] computes what the renderers and callers need from
//! that subset: per-hour counts, map points, and category listings.
//!
//! Nothing here mutates the dataset or fails: an empty subset is a valid
//! result.

pub mod aggregate;
pub mod filter;
