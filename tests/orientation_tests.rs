use bandchart_rs::core::{
    DataPoint, Dimensions, LabelRotation, LayoutHeuristics, Orientation, get_optimal_orientation,
    get_optimal_orientation_tuned, get_recommended_dimensions, should_rotate_labels,
};

fn points_with_labels(count: usize, label_chars: usize) -> Vec<DataPoint> {
    (0..count)
        .map(|i| DataPoint::new(i, 1.0).with_label("x".repeat(label_chars)))
        .collect()
}

#[test]
fn short_labels_in_default_container_stay_vertical() {
    let data = points_with_labels(3, 1);
    assert_eq!(
        get_optimal_orientation(&data, 400.0, 300.0),
        Orientation::Vertical
    );
}

#[test]
fn many_points_turn_horizontal() {
    assert_eq!(
        get_optimal_orientation(&points_with_labels(15, 1), 1200.0, 800.0),
        Orientation::Vertical
    );
    assert_eq!(
        get_optimal_orientation(&points_with_labels(16, 1), 1200.0, 800.0),
        Orientation::Horizontal
    );
}

#[test]
fn long_labels_turn_horizontal() {
    let data = points_with_labels(5, 20);
    assert_eq!(
        get_optimal_orientation(&data, 400.0, 300.0),
        Orientation::Horizontal
    );
}

#[test]
fn wide_containers_turn_horizontal() {
    let data = points_with_labels(3, 1);
    assert_eq!(
        get_optimal_orientation(&data, 600.0, 300.0),
        Orientation::Vertical
    );
    assert_eq!(
        get_optimal_orientation(&data, 900.0, 300.0),
        Orientation::Horizontal
    );
}

#[test]
fn tuned_threshold_overrides_default() {
    let heuristics = LayoutHeuristics {
        horizontal_point_threshold: 3,
        ..LayoutHeuristics::default()
    };
    let data = points_with_labels(4, 1);

    assert_eq!(
        get_optimal_orientation(&data, 400.0, 300.0),
        Orientation::Vertical
    );
    assert_eq!(
        get_optimal_orientation_tuned(&data, 400.0, 300.0, heuristics),
        Orientation::Horizontal
    );
}

#[test]
fn label_rotation_steps_from_flat_to_vertical() {
    let data = points_with_labels(5, 10);

    assert_eq!(should_rotate_labels(&data, 500.0), LabelRotation::None);
    assert_eq!(should_rotate_labels(&data, 400.0), LabelRotation::None);
    assert_eq!(should_rotate_labels(&data, 300.0), LabelRotation::Diagonal);
    assert_eq!(should_rotate_labels(&data, 200.0), LabelRotation::Vertical);
    assert_eq!(LabelRotation::Diagonal.degrees(), 45);
}

#[test]
fn labels_fall_back_to_x_keys() {
    let data = vec![DataPoint::new("January", 1.0), DataPoint::new("February", 2.0)];
    assert_eq!(should_rotate_labels(&data, 100.0), LabelRotation::Diagonal);
    assert_eq!(should_rotate_labels(&data, 60.0), LabelRotation::Vertical);
}

#[test]
fn horizontal_dimensions_grow_height_with_points() {
    let dims = get_recommended_dimensions(
        &points_with_labels(10, 1),
        Orientation::Horizontal,
        None,
        None,
    );
    assert_eq!(
        dims,
        Dimensions {
            width: 400.0,
            height: 400.0
        }
    );

    let capped = get_recommended_dimensions(
        &points_with_labels(30, 1),
        Orientation::Horizontal,
        Some(640.0),
        None,
    );
    assert_eq!((capped.width, capped.height), (640.0, 800.0));

    let floor = get_recommended_dimensions(
        &points_with_labels(2, 1),
        Orientation::Horizontal,
        None,
        None,
    );
    assert_eq!(floor.height, 300.0);
}

#[test]
fn vertical_dimensions_grow_width_with_points() {
    let dims = get_recommended_dimensions(
        &points_with_labels(10, 1),
        Orientation::Vertical,
        None,
        None,
    );
    assert_eq!((dims.width, dims.height), (600.0, 300.0));

    let capped = get_recommended_dimensions(
        &points_with_labels(30, 1),
        Orientation::Vertical,
        None,
        Some(480.0),
    );
    assert_eq!((capped.width, capped.height), (1200.0, 480.0));

    let floor =
        get_recommended_dimensions(&points_with_labels(1, 1), Orientation::Vertical, None, None);
    assert_eq!(floor.width, 400.0);
}

#[test]
fn heuristics_validation_rejects_nonsense() {
    assert!(LayoutHeuristics::default().validate().is_ok());

    let broken = LayoutHeuristics {
        label_char_width_px: -1.0,
        ..LayoutHeuristics::default()
    };
    assert!(broken.validate().is_err());

    let broken = LayoutHeuristics {
        axis_allowance_px: f64::NAN,
        ..LayoutHeuristics::default()
    };
    assert!(broken.validate().is_err());
}
