use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::core::primitives::capitalize_first;
use crate::core::{DataPoint, Series, SeriesStatistics, ValueRange};

/// Metadata key carrying the owning series id on flattened points.
pub const SERIES_KEY: &str = "series";
pub const SERIES_LABEL_KEY: &str = "seriesLabel";
pub const SERIES_COLOR_KEY: &str = "seriesColor";
/// Bucket used by [`SeriesRegistry::from_flat_data`] for points without a series.
pub const DEFAULT_SERIES_ID: &str = "default";

/// Change notification delivered to registry listeners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesChange {
    Added { series_id: String, replaced: bool },
    Removed { series_id: String },
    DataUpdated { series_id: String, points_len: usize },
    VisibilityToggled { series_id: String, visible: bool },
    Cleared,
}

/// Handle returned by [`SeriesRegistry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

/// Listener invoked synchronously after each committed change, with a
/// snapshot of every series in insertion order.
pub type SeriesListener = Box<dyn FnMut(&SeriesChange, &[Series])>;

/// Owns the named series of one chart and fans out change notifications.
///
/// Accessors hand out clones or shared borrows; the backing map is never
/// exposed mutably.
#[derive(Default)]
pub struct SeriesRegistry {
    series: IndexMap<String, Series>,
    listeners: Vec<(SubscriptionId, SeriesListener)>,
    next_subscription: u64,
}

impl fmt::Debug for SeriesRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeriesRegistry")
            .field("series", &self.series)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SeriesRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a series, replacing any existing series with the same id in place.
    pub fn add_series(&mut self, series: Series) {
        let series_id = series.id.clone();
        let replaced = self.series.insert(series_id.clone(), series).is_some();
        debug!(series_id = %series_id, replaced, "add series");
        self.notify(SeriesChange::Added {
            series_id,
            replaced,
        });
    }

    /// Removes a series. Returns `true` when it existed.
    pub fn remove_series(&mut self, series_id: &str) -> bool {
        if self.series.shift_remove(series_id).is_none() {
            trace!(series_id, "remove series ignored, unknown id");
            return false;
        }
        debug!(series_id, "remove series");
        self.notify(SeriesChange::Removed {
            series_id: series_id.to_owned(),
        });
        true
    }

    /// Replaces the point list of a series. Returns `true` when the series exists.
    pub fn update_series_data(&mut self, series_id: &str, points: Vec<DataPoint>) -> bool {
        let Some(series) = self.series.get_mut(series_id) else {
            warn!(series_id, "update ignored, unknown series");
            return false;
        };
        let points_len = points.len();
        series.data = points;
        trace!(series_id, points_len, "update series data");
        self.notify(SeriesChange::DataUpdated {
            series_id: series_id.to_owned(),
            points_len,
        });
        true
    }

    /// Flips visibility and returns the new state, or `None` for an unknown id.
    pub fn toggle_visibility(&mut self, series_id: &str) -> Option<bool> {
        let series = self.series.get_mut(series_id)?;
        let visible = !series.is_visible();
        series.visible = Some(visible);
        trace!(series_id, visible, "toggle series visibility");
        self.notify(SeriesChange::VisibilityToggled {
            series_id: series_id.to_owned(),
            visible,
        });
        Some(visible)
    }

    /// Drops every series and notifies once.
    pub fn clear(&mut self) {
        if self.series.is_empty() {
            return;
        }
        self.series.clear();
        self.notify(SeriesChange::Cleared);
    }

    #[must_use]
    pub fn get_series(&self, series_id: &str) -> Option<&Series> {
        self.series.get(series_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    #[must_use]
    pub fn all_series(&self) -> Vec<Series> {
        self.series.values().cloned().collect()
    }

    #[must_use]
    pub fn visible_series(&self) -> Vec<Series> {
        self.visible().cloned().collect()
    }

    fn visible(&self) -> impl Iterator<Item = &Series> {
        self.series.values().filter(|series| series.is_visible())
    }

    /// Merges visible series into one list, tagging each point with its series.
    #[must_use]
    pub fn flatten(&self) -> Vec<DataPoint> {
        self.visible()
            .flat_map(|series| {
                series.data.iter().map(move |point| {
                    let mut point = point.clone();
                    point
                        .metadata
                        .insert(SERIES_KEY.to_owned(), Value::String(series.id.clone()));
                    point.metadata.insert(
                        SERIES_LABEL_KEY.to_owned(),
                        Value::String(series.label.clone()),
                    );
                    if let Some(color) = &series.color {
                        point
                            .metadata
                            .insert(SERIES_COLOR_KEY.to_owned(), Value::String(color.clone()));
                    }
                    point
                })
            })
            .collect()
    }

    /// Category key to per-series point, over visible series.
    ///
    /// Keys keep first-seen order; a series repeating a key keeps its last point.
    #[must_use]
    pub fn group_by_x(&self) -> IndexMap<String, IndexMap<String, DataPoint>> {
        let mut groups: IndexMap<String, IndexMap<String, DataPoint>> = IndexMap::new();
        for series in self.visible() {
            for point in &series.data {
                groups
                    .entry(point.key())
                    .or_default()
                    .insert(series.id.clone(), point.clone());
            }
        }
        groups
    }

    /// Per-series statistics for every registered series.
    #[must_use]
    pub fn statistics(&self) -> IndexMap<String, SeriesStatistics> {
        self.series
            .iter()
            .map(|(series_id, series)| (series_id.clone(), series.statistics()))
            .collect()
    }

    /// Global `y` range over visible series; `{0, 0}` when nothing is visible.
    #[must_use]
    pub fn combined_range(&self) -> ValueRange {
        ValueRange::of(
            self.visible()
                .flat_map(|series| series.data.iter().map(|point| point.y)),
        )
        .unwrap_or_default()
    }

    /// Registers a listener.
    ///
    /// Listeners run after the change is committed. They receive shared
    /// snapshots and cannot re-enter the registry while it is notifying.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&SeriesChange, &[Series]) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `true` when removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(entry, _)| *entry != id);
        if self.listeners.len() < before {
            return true;
        }
        warn!(?id, "unsubscribe ignored, unknown subscription");
        false
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self, change: SeriesChange) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.all_series();
        for (_, listener) in &mut self.listeners {
            listener(&change, &snapshot);
        }
    }

    /// Rebuilds a registry from flattened points.
    ///
    /// Points are bucketed by `metadata[series_key]` (missing goes to
    /// `"default"`), the bucket id is capitalized into a label, and the
    /// annotations added by [`flatten`](Self::flatten) are stripped again.
    #[must_use]
    pub fn from_flat_data(points: &[DataPoint], series_key: &str) -> Self {
        let mut buckets: IndexMap<String, Series> = IndexMap::new();
        for point in points {
            let series_id = match point.metadata.get(series_key) {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Number(number)) => number.to_string(),
                Some(Value::Bool(flag)) => flag.to_string(),
                _ => DEFAULT_SERIES_ID.to_owned(),
            };
            let series = buckets.entry(series_id.clone()).or_insert_with(|| {
                let mut series =
                    Series::new(series_id.clone(), capitalize_first(&series_id), Vec::new());
                series.color = point.metadata_str(SERIES_COLOR_KEY).map(str::to_owned);
                series
            });

            let mut point = point.clone();
            for key in [series_key, SERIES_LABEL_KEY, SERIES_COLOR_KEY] {
                point.metadata.shift_remove(key);
            }
            series.data.push(point);
        }

        debug!(
            points = points.len(),
            series = buckets.len(),
            "rebuild registry from flat data"
        );
        Self {
            series: buckets,
            ..Self::default()
        }
    }
}
