pub mod band_scale;
pub mod layout;
pub mod orientation;
pub mod primitives;
pub mod series;
pub mod series_registry;
pub mod stack;
pub mod transform;
pub mod types;
pub mod validation;
pub mod value_scale;

pub use band_scale::BandScale;
pub use layout::{
    GroupPadding, GroupedLayout, SimpleLayout, calculate_grouped_layout, calculate_simple_layout,
    get_bar_position, get_column_position, get_point_position, value_domain,
};
pub use orientation::{
    LabelRotation, LayoutHeuristics, get_optimal_orientation, get_optimal_orientation_tuned,
    get_recommended_dimensions, get_recommended_dimensions_tuned, should_rotate_labels,
    should_rotate_labels_tuned,
};
pub use series::{Series, SeriesStatistics, ValueRange};
pub use series_registry::{SeriesChange, SeriesListener, SeriesRegistry, SubscriptionId};
pub use stack::{
    StackLayout, StackOffset, StackOrder, StackSegment, StackedLayer, StackedLayout,
    StackedLayoutOptions, calculate_stack_totals, calculate_stacked_layout, compute_stack,
    stack_categories,
};
pub use transform::{AggregationKind, RecordKeys, aggregate, normalize, transform, validate};
pub use types::{DataPoint, Dimensions, Metadata, Orientation, Rect, Viewport, XValue};
pub use validation::ValidationReport;
pub use value_scale::ValueScale;
