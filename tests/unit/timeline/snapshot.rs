use super::*;
use proptest::prelude::*;

fn series() -> Vec<Series> {
    vec![
        Series::new("A", [(1, 10.0), (2, 50.0)]),
        Series::new("B", [(1, 20.0), (2, 10.0)]),
        Series::new("C", [(1, 20.0), (2, 0.0)]),
    ]
}

#[test]
fn null_key_maps_every_label_to_zero() {
    let snap = Snapshot::from_series(&series(), None);
    assert_eq!(snap.len(), 3);
    assert!(snap.iter().all(|(_, v)| v == 0.0));
    assert_eq!(snap.get("A"), 0.0);
}

#[test]
fn unknown_key_and_label_are_zero() {
    let snap = Snapshot::from_series(&series(), Some(&TimelineKey::from(9)));
    assert_eq!(snap.total(), 0.0);
    assert_eq!(snap.get("nope"), 0.0);
}

#[test]
fn largest_prefers_first_on_ties() {
    let snap = Snapshot::from_series(&series(), Some(&TimelineKey::from(1)));
    assert_eq!(snap.largest(), Some(("B", 20.0)));
    assert_eq!(snap.largest(), snap.largest());
}

#[test]
fn denominator_is_floored_at_one() {
    let zero = Snapshot::from_series(&series(), None);
    assert_eq!(zero.largest(), Some(("A", 0.0)));
    assert_eq!(zero.normalization_denominator(), 1.0);

    let small = Snapshot::from_series(&[Series::new("x", [(1, 0.25)])], Some(&1.into()));
    assert_eq!(small.normalization_denominator(), 1.0);

    let at_two = Snapshot::from_series(&series(), Some(&TimelineKey::from(2)));
    assert_eq!(at_two.normalization_denominator(), 50.0);

    assert_eq!(Snapshot::default().largest(), None);
    assert_eq!(Snapshot::default().normalization_denominator(), 1.0);
}

#[test]
fn ranking_is_descending_and_stable() {
    let snap = Snapshot::from_series(&series(), Some(&TimelineKey::from(1)));
    let ranked = snap.ranked();
    assert_eq!(ranked.labels().collect::<Vec<_>>(), vec!["B", "C", "A"]);
    assert_eq!(ranked.slot_of("A"), Some(2));
    assert_eq!(ranked.slot_of("missing"), None);

    let at_two = Snapshot::from_series(&series(), Some(&TimelineKey::from(2))).ranked();
    assert_eq!(at_two.labels().collect::<Vec<_>>(), vec!["A", "B", "C"]);
}

#[test]
fn at_index_matches_key_lookup() {
    let by_key = Snapshot::from_series(&series(), Some(&TimelineKey::from(2)));
    assert_eq!(Snapshot::at_index(&series(), Some(1)), by_key);
    assert_eq!(Snapshot::at_index(&series(), None), Snapshot::from_series(&series(), None));
    assert_eq!(Snapshot::at_index(&series(), Some(5)).total(), 0.0);
}

#[test]
fn slot_lookup_agrees_with_ranked_order() {
    let many: Vec<Series> = (0..200)
        .map(|i| Series::new(format!("s{i}"), [(0, f64::from(i % 17))]))
        .collect();
    let ranked = Snapshot::at_index(&many, Some(0)).ranked();
    assert_eq!(ranked.len(), 200);
    for (slot, label) in ranked.labels().enumerate() {
        assert_eq!(ranked.slot_of(label), Some(slot));
    }
    let values: Vec<f64> = ranked.iter().map(|(_, v)| v).collect();
    assert!(values.windows(2).all(|w| w[0] >= w[1]));
    // Ties keep series order: s16 and s33 both hold 16.
    assert!(ranked.slot_of("s16") < ranked.slot_of("s33"));
}

proptest! {
    #[test]
    fn snapshot_total_matches_input_values(values in prop::collection::vec(
        prop::collection::vec(0.0f64..1e9, 4),
        1..8,
    )) {
        let series: Vec<Series> = values
            .iter()
            .enumerate()
            .map(|(i, vs)| Series::new(format!("s{i}"), vs.iter().enumerate().map(|(k, v)| (k as i64, *v))))
            .collect();

        for k in 0..4i64 {
            let key = TimelineKey::from(k);
            let snap = Snapshot::from_series(&series, Some(&key));
            let expected: f64 = values.iter().map(|vs| vs[k as usize]).sum();
            prop_assert_eq!(snap.total(), expected);
            prop_assert_eq!(snap.largest(), snap.largest());
        }
    }
}
