use super::*;
use crate::render::record::RecordingRenderer;
use crate::engine::rank::RankStrategy;

fn ab_data() -> RaceData {
    RaceData::new(vec![
        Series::new("A", [("1", 10.0), ("2", 50.0)]),
        Series::new("B", [("1", 20.0), ("2", 10.0)]),
    ])
}

fn engine(config: RaceConfig, data: RaceData) -> RaceEngine {
    RaceEngine::new(config, data, TokioClock::new()).unwrap()
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn construction_surfaces_structural_errors() {
    let empty = RaceEngine::new(RaceConfig::default(), RaceData::default(), TokioClock::new());
    assert!(matches!(empty, Err(RaceError::EmptyDataset(_))));

    let ragged = RaceData::new(vec![
        Series::new("A", [("1", 1.0), ("2", 2.0)]),
        Series::new("B", [("1", 1.0)]),
    ]);
    let err = RaceEngine::new(RaceConfig::default(), ragged, TokioClock::new());
    assert!(matches!(err, Err(RaceError::DataShape(_))));
}

#[tokio::test(start_paused = true)]
async fn seed_lays_out_first_key() {
    let mut e = engine(RaceConfig::default(), ab_data());
    assert_eq!(e.phase(), RacePhase::Uninitialized);
    let cancel = CancelToken::new();
    assert!(matches!(e.step(&cancel).await, Err(RaceError::Validation(_))));

    e.seed().unwrap();
    assert_eq!(e.phase(), RacePhase::Seeded);
    assert_eq!(e.cursor_index(), -1);
    assert_eq!(e.order(), vec!["B", "A"]);

    let w = e.layout().plot.width();
    let a = e.bar("A").unwrap().sample(Duration::ZERO);
    let b = e.bar("B").unwrap().sample(Duration::ZERO);
    assert_eq!(a.extent, w * 10.0 / 20.0);
    assert_eq!(b.extent, w);
    assert_eq!((a.slot, b.slot), (1, 0));
    assert_eq!(e.bar("A").unwrap().color(), PALETTE[0]);

    assert!(e.seed().is_err());
}

#[tokio::test(start_paused = true)]
async fn priming_then_one_step_reaches_final_key() {
    let mut e = engine(RaceConfig::default(), ab_data());
    e.seed().unwrap();
    let cancel = CancelToken::new();

    assert_eq!(e.step(&cancel).await.unwrap(), StepOutcome::Primed);
    assert_eq!(e.current_key(), Some(TimelineKey::from("1")));
    assert_eq!(e.phase(), RacePhase::Stepping);
    assert_eq!(e.stats().steps, 0);

    let start = e.clock().now();
    let outcome = e.step(&cancel).await.unwrap();
    assert_eq!(outcome, StepOutcome::Advanced(TimelineKey::from("2")));
    assert!(e.clock().now() - start >= ms(850));
    assert_eq!(e.phase(), RacePhase::Settled);

    let w = e.layout().plot.width();
    let now = e.clock().now();
    let a = e.bar("A").unwrap().sample(now);
    let b = e.bar("B").unwrap().sample(now);
    assert_eq!((a.extent, a.value), (w, 50.0));
    assert_eq!((b.extent, b.value), (w * 10.0 / 50.0, 10.0));

    assert_eq!(e.step(&cancel).await.unwrap(), StepOutcome::Settled);
    assert_eq!(e.stats().steps, 1);
}

#[tokio::test(start_paused = true)]
async fn precomputed_strategy_reorders_at_step_start() {
    let config = RaceConfig {
        rank_strategy: RankStrategy::Precomputed,
        ..RaceConfig::default()
    };
    let mut e = engine(config, ab_data());
    e.seed().unwrap();
    let cancel = CancelToken::new();
    e.step(&cancel).await.unwrap();

    let step = e.step(&cancel);
    let probe = async {
        e.clock().sleep(ms(10)).await;
        assert_eq!(e.order(), vec!["A", "B"]);
        assert!(e.bar("A").unwrap().sample(e.clock().now()).swapping);
    };
    let (outcome, ()) = futures::join!(step, probe);
    assert!(matches!(outcome, Ok(StepOutcome::Advanced(_))));
    assert_eq!(e.bar("A").unwrap().sample(e.clock().now()).position, 0.0);
}

#[tokio::test(start_paused = true)]
async fn slowest_entity_gates_the_step() {
    let mut overrides = std::collections::BTreeMap::new();
    overrides.insert("B".to_owned(), 1500);
    let config = RaceConfig {
        entity_transition_ms: overrides,
        ..RaceConfig::default()
    };
    let mut e = engine(config, ab_data());
    e.seed().unwrap();
    let cancel = CancelToken::new();
    e.step(&cancel).await.unwrap();

    let start = e.clock().now();
    e.step(&cancel).await.unwrap();
    let elapsed = e.clock().now() - start;
    assert!(elapsed >= ms(1600), "{elapsed:?}");
    assert!(elapsed < ms(1700), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn single_key_settles_without_steps() {
    let data = RaceData::new(vec![
        Series::new("A", [("only", 3.0)]),
        Series::new("B", [("only", 4.0)]),
    ]);
    let mut e = engine(RaceConfig::default(), data);
    e.seed().unwrap();
    let stats = e.run_steps(&CancelToken::new()).await.unwrap();
    assert_eq!(stats.steps, 0);
    assert_eq!(e.phase(), RacePhase::Settled);
    assert_eq!(e.current_key(), Some(TimelineKey::from("only")));
}

#[tokio::test(start_paused = true)]
async fn cancel_during_barrier_keeps_cursor() {
    let mut e = engine(RaceConfig::default(), ab_data());
    e.seed().unwrap();
    let cancel = CancelToken::new();
    e.step(&cancel).await.unwrap();

    let stop = async {
        e.clock().sleep(ms(100)).await;
        cancel.cancel();
    };
    let (outcome, ()) = futures::join!(e.step(&cancel), stop);
    assert_eq!(outcome.unwrap(), StepOutcome::Cancelled);
    assert_eq!(e.cursor_index(), 0);
    assert!(e.stats().cancelled);
    assert_eq!(e.step(&cancel).await.unwrap(), StepOutcome::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn init_runs_both_loops_until_hold_elapses() {
    let config = RaceConfig {
        hold_after_settle_ms: Some(200),
        ..RaceConfig::default()
    };
    let mut e = engine(config, ab_data());
    let mut rec = RecordingRenderer::new();
    let stats = e.init(&mut rec, &CancelToken::new()).await.unwrap();

    assert!(rec.is_finished());
    assert_eq!(stats.steps, 1);
    assert_eq!(stats.swaps, 1);
    assert!(!stats.cancelled);
    assert_eq!(stats.frames, rec.frames().len() as u64);

    let last = rec.last().unwrap();
    assert_eq!(last.labels().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(last.bar("A").unwrap().rect.width(), e.layout().plot.width());
    assert_eq!(last.total, 60.0);
    assert_eq!(last.timeline.pointer, 1.0);
    assert_eq!(last.current_key, Some(TimelineKey::from("2")));

    // Priming runs before the first redraw, so the first frame already shows key 1.
    let first = &rec.frames()[0];
    assert_eq!(first.current_key, Some(TimelineKey::from("1")));
    assert_eq!(first.labels().collect::<Vec<_>>(), vec!["B", "A"]);
    assert!(rec.frames().windows(2).all(|w| w[0].index < w[1].index));
}

#[test]
fn order_from_slots_inverts_assignment() {
    assert_eq!(order_from_slots([2, 0, 1].into_iter()), vec![1, 2, 0]);
}
