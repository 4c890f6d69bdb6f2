use super::*;
use crate::animation::clock::TokioClock;

fn bar(extent: f64, value: f64, slot: usize) -> BarController {
    BarController::new(
        "A",
        Rgba8::rgb(0x1f, 0x77, 0xb4),
        BarMetrics { extent, value },
        slot,
        Ease::SmootherStep,
    )
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[tokio::test(start_paused = true)]
async fn transition_settles_exactly_on_target() {
    let clock = TokioClock::new();
    let bar = bar(0.0, 0.0, 0);

    let done = bar.transition_to(&clock, 200.0, 500.0, None, ms(750)).unwrap();
    assert!(bar.sample(clock.now()).transitioning);
    done.await;

    assert!(clock.now() >= ms(750));
    let s = bar.sample(clock.now());
    assert_eq!(s.extent, 200.0);
    assert_eq!(s.value, 500.0);
    assert!(!s.transitioning);
}

#[tokio::test(start_paused = true)]
async fn midway_sample_is_eased_and_rounded() {
    let clock = TokioClock::new();
    let bar = bar(0.0, 0.0, 0);

    let done = bar.transition_to(&clock, 200.0, 501.0, None, ms(1000)).unwrap();
    let probe = async {
        clock.sleep(ms(500)).await;
        let s = bar.sample(clock.now());
        assert!(s.transitioning);
        assert!((s.extent - 100.0).abs() < 0.5);
        assert_eq!(s.value, s.value.round());
    };
    futures::join!(done, probe);

    assert_eq!(bar.sample(clock.now()).value, 501.0);
}

#[tokio::test(start_paused = true)]
async fn settled_value_is_not_rounded() {
    let clock = TokioClock::new();
    let bar = bar(0.0, 0.0, 0);
    bar.transition_to(&clock, 10.0, 2.75, None, ms(100)).unwrap().await;
    assert_eq!(bar.sample(clock.now()).value, 2.75);
}

#[tokio::test(start_paused = true)]
async fn second_value_transition_is_rejected() {
    let clock = TokioClock::new();
    let bar = bar(0.0, 0.0, 0);

    let first = bar.transition_to(&clock, 10.0, 10.0, None, ms(100)).unwrap();
    let err = bar.begin_transition(clock.now(), BarMetrics::default(), None, ms(100));
    assert!(matches!(
        err,
        Err(RaceError::TransitionConflict { axis: Axis::Value, .. })
    ));
    first.await;

    // The axis is free again once the first transition settled.
    bar.transition_to(&clock, 0.0, 0.0, None, ms(100)).unwrap().await;
    assert_eq!(bar.sample(clock.now()).extent, 0.0);
}

#[tokio::test(start_paused = true)]
async fn swap_is_independent_from_value_axis() {
    let clock = TokioClock::new();
    let bar = bar(0.0, 0.0, 1);

    let grow = bar.transition_to(&clock, 50.0, 50.0, None, ms(750)).unwrap();
    let swap = bar.swap_to(&clock, 0, ms(300)).unwrap();
    let s = bar.sample(clock.now());
    assert!(s.transitioning && s.swapping);
    assert_eq!(s.slot, 0);
    assert_eq!(s.position, 1.0);

    let err = bar.begin_swap(clock.now(), 1, ms(300));
    assert!(matches!(
        err,
        Err(RaceError::TransitionConflict { axis: Axis::Slot, .. })
    ));

    swap.await;
    let s = bar.sample(clock.now());
    assert!(!s.swapping && s.transitioning);
    assert_eq!(s.position, 0.0);
    grow.await;
}

#[tokio::test(start_paused = true)]
async fn slot_target_rejected_while_swapping() {
    let clock = TokioClock::new();
    let busy = bar(0.0, 0.0, 2);
    busy.begin_swap(clock.now(), 1, ms(300)).unwrap();
    let err = busy.begin_transition(clock.now(), BarMetrics::default(), Some(0), ms(100));
    assert!(matches!(
        err,
        Err(RaceError::TransitionConflict { axis: Axis::Slot, .. })
    ));
    assert!(!busy.sample(clock.now()).transitioning);

    // Targeting the slot the swap is already heading to is not a change.
    assert!(busy
        .begin_transition(clock.now(), BarMetrics::default(), Some(1), ms(100))
        .is_ok());
}

#[tokio::test(start_paused = true)]
async fn zero_duration_settles_immediately() {
    let clock = TokioClock::new();
    let bar = bar(0.0, 0.0, 0);
    bar.transition_to(&clock, 5.0, 5.0, None, Duration::ZERO).unwrap().await;
    let s = bar.sample(clock.now());
    assert_eq!(s.extent, 5.0);
    assert!(!s.transitioning);
}

#[test]
fn view_places_bar_by_position() {
    let bar = bar(120.0, 42.0, 2);
    let layout = BarLayout {
        plot: Rect::new(100.0, 30.0, 770.0, 340.0),
        bar_height: 31.0,
    };
    let v = bar.view(Duration::ZERO, &layout);
    assert_eq!(v.label, "A");
    assert_eq!(v.slot, 2);
    assert_eq!(v.value, 42.0);
    assert_eq!(v.rect, Rect::new(100.0, 92.0, 220.0, 123.0));
}
