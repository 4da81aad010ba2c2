use bandchart_rs::core::{
    BandScale, DataPoint, Orientation, Series, SeriesRegistry, get_optimal_orientation,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn more_than_fifteen_points_are_horizontal_at_default_size(
        labels in prop::collection::vec("[a-zA-Z ]{0,24}", 16..120)
    ) {
        let data: Vec<DataPoint> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| DataPoint::new(i, 1.0).with_label(label.clone()))
            .collect();

        prop_assert_eq!(
            get_optimal_orientation(&data, 400.0, 300.0),
            Orientation::Horizontal
        );
    }

    #[test]
    fn band_scale_fills_its_range(
        n in 1usize..40,
        padding in 0.0f64..0.95,
        extent in 10.0f64..4_000.0
    ) {
        let keys: Vec<String> = (0..n).map(|i| format!("k{i}")).collect();
        let scale = BandScale::new(keys.iter().cloned(), (0.0, extent), padding)
            .expect("valid band scale");

        let first = scale.position("k0").expect("first key");
        let last = scale.position(&keys[n - 1]).expect("last key");
        let outer_gap = scale.padding_outer() * scale.step();

        prop_assert!((first - outer_gap).abs() <= 1e-9 * extent);
        prop_assert!((last + scale.bandwidth() + outer_gap - extent).abs() <= 1e-9 * extent);
        prop_assert!((scale.step() - scale.bandwidth() - padding * scale.step()).abs() <= 1e-9 * extent);
    }

    #[test]
    fn from_flat_data_restores_visible_series(
        shapes in prop::collection::vec((prop::collection::vec(-50.0f64..50.0, 1..6), any::<bool>()), 1..5)
    ) {
        let mut registry = SeriesRegistry::new();
        for (index, (values, visible)) in shapes.iter().enumerate() {
            let points = values
                .iter()
                .enumerate()
                .map(|(i, &y)| DataPoint::new(format!("c{i}"), y))
                .collect();
            registry.add_series(
                Series::new(format!("s{index}"), format!("S{index}"), points).with_visible(*visible),
            );
        }

        let rebuilt = SeriesRegistry::from_flat_data(&registry.flatten(), "series");
        let expected = registry.visible_series();
        let restored = rebuilt.all_series();

        prop_assert_eq!(restored.len(), expected.len());
        for (before, after) in expected.iter().zip(&restored) {
            prop_assert_eq!(&before.id, &after.id);
            prop_assert_eq!(&before.data, &after.data);
        }
    }
}
