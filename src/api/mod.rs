mod engine_config;
mod layout_engine;
mod variant;

pub use engine_config::EngineConfig;
pub use layout_engine::{
    CHART_GEOMETRY_JSON_SCHEMA_V1, ChartGeometry, ChartGeometryJsonContractV1, LayoutEngine,
    PlacedRect, VALUE_AXIS_TICK_COUNT,
};
pub use variant::{
    AccessibilityConfig, AnimationConfig, CATEGORY_KEY, ChartData, ChartVariant,
    ChartVariantConfig, ChartVariantSpec, GroupedOptions, LegendPosition,
    STACKED_POINTS_PER_SERIES_THRESHOLD, SimpleOptions, StackedOptions, ThemeConfig,
    ValuePosition, VariantOptions, create_chart_variant, default_palette, get_recommended_variant,
    validate_variant_data,
};
