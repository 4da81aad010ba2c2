//! bandchart-rs: categorical chart data and layout engine.
//!
//! Turns raw records into validated points, groups them into named series and
//! computes pixel geometry (band offsets, niced value scales, grouped offsets,
//! stacked segments) without depending on any rendering technology.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{ChartGeometry, ChartVariant, EngineConfig, LayoutEngine, create_chart_variant};
pub use error::{ChartError, ChartResult};
