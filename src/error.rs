use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

/// Hard failures raised by the engine.
///
/// Soft input problems are reported through
/// [`ValidationReport`](crate::core::ValidationReport) instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("expected an array of records, found {found}")]
    NotASequence { found: &'static str },

    #[error("unsupported chart variant `{0}`")]
    UnsupportedVariant(String),

    #[error("series `{series_id}` is not part of the computed layout")]
    UnknownSeries { series_id: String },

    #[error("category `{category}` is not part of the band scale domain")]
    UnknownCategory { category: String },

    #[error("series `{series_id}` has no stacked segment for category `{category}`")]
    UnknownStackSegment { series_id: String, category: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
