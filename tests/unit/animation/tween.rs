use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn sample_follows_elapsed_time() {
    let t = Tween::new(0.0, 100.0, ms(1000), ms(200), Ease::Linear);
    assert_eq!(t.sample(ms(0)), 0.0);
    assert_eq!(t.sample(ms(1000)), 0.0);
    assert!((t.sample(ms(1050)) - 25.0).abs() < 1e-9);
    assert!((t.sample(ms(1100)) - 50.0).abs() < 1e-9);
    assert_eq!(t.end(), ms(1200));
}

#[test]
fn sample_snaps_to_target_when_done() {
    let t = Tween::new(0.1, 0.7, ms(0), ms(3), Ease::SmootherStep);
    assert!(!t.is_done(ms(2)));
    assert!(t.is_done(ms(3)));
    assert_eq!(t.sample(ms(3)), 0.7);
    assert_eq!(t.sample(ms(500)), 0.7);
}

#[test]
fn eased_midpoint_matches_curve() {
    let t = Tween::new(0.0, 1.0, ms(0), ms(1000), Ease::SmootherStep);
    let quarter = t.sample(ms(250));
    assert!((quarter - crate::animation::ease::smoother_step(0.25)).abs() < 1e-9);
    assert!(quarter < 0.25);
}

#[test]
fn zero_duration_is_complete_immediately() {
    let t = Tween::new(5.0, 9.0, ms(40), Duration::ZERO, Ease::Linear);
    assert_eq!(t.progress(ms(40)), 1.0);
    assert!(t.is_done(ms(40)));
    assert_eq!(t.sample(ms(40)), 9.0);
}
