use std::cell::RefCell;
use std::rc::Rc;

use bandchart_rs::core::{DataPoint, Series, SeriesChange, SeriesRegistry, ValueRange};
use serde_json::json;

fn series(id: &str, values: &[(&str, f64)]) -> Series {
    Series::new(
        id,
        id.to_uppercase(),
        values
            .iter()
            .map(|&(x, y)| DataPoint::new(x, y))
            .collect(),
    )
}

fn recorded(registry: &mut SeriesRegistry) -> Rc<RefCell<Vec<(SeriesChange, usize)>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    registry.subscribe(move |change, snapshot| {
        sink.borrow_mut().push((change.clone(), snapshot.len()));
    });
    log
}

#[test]
fn add_series_overwrites_in_place() {
    let mut registry = SeriesRegistry::new();
    registry.add_series(series("a", &[("x", 1.0)]));
    registry.add_series(series("b", &[("x", 2.0)]));
    registry.add_series(Series::new("a", "Renamed", Vec::new()));

    let ids: Vec<String> = registry.all_series().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(
        registry.get_series("a").map(|s| s.label.as_str()),
        Some("Renamed")
    );
    assert_eq!(registry.len(), 2);
}

#[test]
fn listeners_observe_committed_changes() {
    let mut registry = SeriesRegistry::new();
    let log = recorded(&mut registry);

    registry.add_series(series("a", &[("x", 1.0)]));
    registry.add_series(series("a", &[("x", 2.0)]));
    assert!(registry.update_series_data("a", vec![DataPoint::new("y", 3.0)]));
    assert_eq!(registry.toggle_visibility("a"), Some(false));
    assert!(registry.remove_series("a"));

    let log = log.borrow();
    assert_eq!(
        *log,
        vec![
            (
                SeriesChange::Added {
                    series_id: "a".to_owned(),
                    replaced: false
                },
                1
            ),
            (
                SeriesChange::Added {
                    series_id: "a".to_owned(),
                    replaced: true
                },
                1
            ),
            (
                SeriesChange::DataUpdated {
                    series_id: "a".to_owned(),
                    points_len: 1
                },
                1
            ),
            (
                SeriesChange::VisibilityToggled {
                    series_id: "a".to_owned(),
                    visible: false
                },
                1
            ),
            (
                SeriesChange::Removed {
                    series_id: "a".to_owned()
                },
                0
            ),
        ]
    );
}

#[test]
fn remove_unknown_series_does_not_notify() {
    let mut registry = SeriesRegistry::new();
    let log = recorded(&mut registry);

    assert!(!registry.remove_series("missing"));
    assert!(!registry.update_series_data("missing", Vec::new()));
    assert_eq!(registry.toggle_visibility("missing"), None);
    assert!(log.borrow().is_empty());
}

#[test]
fn unsubscribe_stops_notifications() {
    let mut registry = SeriesRegistry::new();
    let calls = Rc::new(RefCell::new(0_usize));
    let sink = Rc::clone(&calls);
    let id = registry.subscribe(move |_, _| *sink.borrow_mut() += 1);

    registry.add_series(series("a", &[]));
    assert!(registry.unsubscribe(id));
    assert!(!registry.unsubscribe(id));
    registry.add_series(series("b", &[]));

    assert_eq!(*calls.borrow(), 1);
    assert_eq!(registry.listener_count(), 0);
}

#[test]
fn unsubscribe_keeps_other_listeners() {
    let mut registry = SeriesRegistry::new();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let ids: Vec<_> = (0..3)
        .map(|index| {
            let sink = Rc::clone(&calls);
            registry.subscribe(move |_, _| sink.borrow_mut().push(index))
        })
        .collect();

    assert!(registry.unsubscribe(ids[1]));
    assert_eq!(registry.listener_count(), 2);
    registry.add_series(series("a", &[]));

    assert_eq!(*calls.borrow(), vec![0, 2]);
}

#[test]
fn clear_notifies_once() {
    let mut registry = SeriesRegistry::new();
    registry.add_series(series("a", &[]));
    registry.add_series(series("b", &[]));
    let log = recorded(&mut registry);

    registry.clear();
    registry.clear();

    assert!(registry.is_empty());
    assert_eq!(*log.borrow(), vec![(SeriesChange::Cleared, 0)]);
}

#[test]
fn hidden_series_are_excluded_from_views() {
    let mut registry = SeriesRegistry::new();
    registry.add_series(series("a", &[("x", 1.0), ("y", 2.0)]));
    registry.add_series(series("b", &[("x", 10.0)]).with_visible(false));

    assert_eq!(registry.visible_series().len(), 1);
    assert_eq!(registry.all_series().len(), 2);
    assert_eq!(registry.flatten().len(), 2);
    assert_eq!(registry.combined_range(), ValueRange::new(1.0, 2.0));

    let groups = registry.group_by_x();
    assert_eq!(groups.len(), 2);
    assert!(groups["x"].contains_key("a"));
    assert!(!groups["x"].contains_key("b"));

    assert_eq!(registry.toggle_visibility("b"), Some(true));
    assert_eq!(registry.combined_range(), ValueRange::new(1.0, 10.0));
}

#[test]
fn combined_range_defaults_to_zero_without_visible_series() {
    let mut registry = SeriesRegistry::new();
    assert_eq!(registry.combined_range(), ValueRange::new(0.0, 0.0));

    registry.add_series(series("a", &[("x", 5.0)]).with_visible(false));
    assert_eq!(registry.combined_range(), ValueRange::new(0.0, 0.0));
}

#[test]
fn flatten_annotates_points_with_series() {
    let mut registry = SeriesRegistry::new();
    registry.add_series(series("sales", &[("Q1", 4.0)]).with_color("#ff0000"));
    registry.add_series(series("costs", &[("Q1", 2.0)]));

    let flat = registry.flatten();
    assert_eq!(flat[0].metadata.get("series"), Some(&json!("sales")));
    assert_eq!(flat[0].metadata.get("seriesLabel"), Some(&json!("SALES")));
    assert_eq!(flat[0].metadata.get("seriesColor"), Some(&json!("#ff0000")));
    assert_eq!(flat[1].metadata.get("series"), Some(&json!("costs")));
    assert!(!flat[1].metadata.contains_key("seriesColor"));
}

#[test]
fn statistics_cover_every_series() {
    let mut registry = SeriesRegistry::new();
    registry.add_series(series("a", &[("x", 1.0), ("y", 2.0), ("z", 3.0)]));
    registry.add_series(series("empty", &[]).with_visible(false));

    let stats = registry.statistics();
    let a = stats["a"];
    assert_eq!((a.min, a.max, a.count), (1.0, 3.0, 3));
    assert!((a.avg - 2.0).abs() <= 1e-9);

    let empty = stats["empty"];
    assert_eq!((empty.min, empty.max, empty.avg, empty.count), (0.0, 0.0, 0.0, 0));
}

#[test]
fn from_flat_data_inverts_flatten() {
    let mut registry = SeriesRegistry::new();
    registry.add_series(series("north", &[("A", 1.0), ("B", 2.0)]).with_color("#123456"));
    registry.add_series(series("south", &[("A", 3.0)]));

    let rebuilt = SeriesRegistry::from_flat_data(&registry.flatten(), "series");
    let original = registry.visible_series();
    let restored = rebuilt.all_series();

    assert_eq!(restored.len(), 2);
    for (before, after) in original.iter().zip(&restored) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.data, after.data);
    }
    assert_eq!(restored[0].label, "North");
    assert_eq!(restored[0].color.as_deref(), Some("#123456"));
    assert_eq!(restored[1].color, None);
}

#[test]
fn from_flat_data_buckets_untagged_points_as_default() {
    let points = vec![
        DataPoint::new("A", 1.0),
        DataPoint::new("B", 2.0).with_metadata("group", "extra"),
    ];

    let registry = SeriesRegistry::from_flat_data(&points, "group");
    let ids: Vec<String> = registry.all_series().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["default".to_owned(), "extra".to_owned()]);
    assert_eq!(
        registry.get_series("default").map(|s| s.label.as_str()),
        Some("Default")
    );
    assert!(
        registry.get_series("extra").expect("bucket").data[0]
            .metadata
            .is_empty()
    );
}
