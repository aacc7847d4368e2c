//! Tests for the iterative subset search
//!
//! These tests verify that:
//! - A planted winning subset is found and reported with its statistics
//! - An unreachable target runs exactly `max_iterations` iterations
//! - Cancellation and timeouts end the run as exhausted
//! - Misconfiguration is rejected before the first iteration
//! - Candidates that cannot be scored are skipped and counted
//! - Equal scores within a batch keep the earliest candidate

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::control::RunControl;
use crate::error::{EngineError, SamplingError};
use crate::model::{AssetUniverse, ReturnMatrix, ReturnSeries, TerminationReason};
use crate::sampling::sample_subset;
use crate::search::{SearchConfig, SearchState, SearchStatus, SubsetSearchEngine};

const DAYS: usize = 10;

/// Six assets: WIN1 and WIN2 gain 2% every day, the rest drift or lose.
///
/// Only the WIN1/WIN2 pair reaches a 10% cumulative return; pairing a winner
/// with a drifting asset compounds to 1.0095^10 = 1.0992.
fn planted_universe() -> ReturnMatrix {
    let universe = AssetUniverse::new(["WIN1", "DRIFT1", "LOSE1", "WIN2", "DRIFT2", "LOSE2"]).unwrap();
    let dates = (0..DAYS)
        .map(|d| jiff::civil::date(2023, 3, 1 + d as i8))
        .collect();
    let column = |r: f64| ReturnSeries::new(vec![r; DAYS]);
    ReturnMatrix::new(
        universe,
        dates,
        vec![
            column(0.02),
            column(-0.001),
            column(-0.01),
            column(0.02),
            column(-0.001),
            column(-0.01),
        ],
    )
    .unwrap()
}

fn benchmark() -> ReturnSeries {
    ReturnSeries::new(vec![0.001; DAYS])
}

fn config(subset_size: usize, target: f64, max_iterations: usize) -> SearchConfig {
    SearchConfig {
        subset_size,
        batch_size: 100,
        target_cumulative_return: target,
        max_iterations,
        ..Default::default()
    }
}

#[test]
fn test_planted_subset_converges() {
    let returns = planted_universe();
    let bench = benchmark();
    let engine = SubsetSearchEngine::new(&returns, &bench, config(2, 1.10, 1_000)).unwrap();

    let report = engine
        .run(&mut StdRng::seed_from_u64(42), &RunControl::default())
        .unwrap();

    assert_eq!(report.status, SearchStatus::Converged);
    assert_eq!(report.termination, TerminationReason::Converged);
    assert!(report.iterations >= 1);

    let mut assets = report.assets.clone().unwrap();
    assets.sort();
    assert_eq!(assets, vec!["WIN1".to_string(), "WIN2".to_string()]);

    // 1.02^10 = 1.2190
    let stats = report.stats.unwrap();
    assert!((stats.cumulative_return - 1.02f64.powi(DAYS as i32)).abs() < 1e-12);
    assert!((stats.mean_daily_return - 0.02).abs() < 1e-12);
    assert!(stats.std_daily_return.abs() < 1e-12);
    assert_eq!(report.history.len(), report.iterations);
}

#[test]
fn test_unreachable_target_exhausts_after_max_iterations() {
    let returns = planted_universe();
    let bench = benchmark();
    let mut cfg = config(2, 2.00, 100);
    cfg.batch_size = 10;
    let engine = SubsetSearchEngine::new(&returns, &bench, cfg).unwrap();

    let report = engine
        .run(&mut StdRng::seed_from_u64(7), &RunControl::default())
        .unwrap();

    assert_eq!(report.status, SearchStatus::Exhausted);
    assert_eq!(report.termination, TerminationReason::MaxIterationsReached);
    assert_eq!(report.iterations, 100);
    assert!(report.assets.is_none());
    assert!(report.stats.is_none());
    // The best batch winner is still reported for diagnosis
    let last = report.last_winner.unwrap();
    assert!(last.cumulative_return < 2.00);
    assert_eq!(report.history.len(), 100);
}

#[test]
fn test_stepping_stops_at_terminal_state() {
    let returns = planted_universe();
    let bench = benchmark();
    let engine = SubsetSearchEngine::new(&returns, &bench, config(2, 2.00, 3)).unwrap();
    let control = RunControl::default();
    let mut rng = StdRng::seed_from_u64(3);

    let mut run = engine.start();
    assert_eq!(run.state(), SearchState::Searching);
    assert_eq!(run.step(&mut rng, &control).unwrap(), SearchState::Searching);
    assert_eq!(run.step(&mut rng, &control).unwrap(), SearchState::Searching);
    assert_eq!(run.step(&mut rng, &control).unwrap(), SearchState::Exhausted);
    assert_eq!(run.iteration(), 3);

    // Further steps leave the terminal state alone
    assert_eq!(run.step(&mut rng, &control).unwrap(), SearchState::Exhausted);
    assert_eq!(run.iteration(), 3);
    assert!(run.last_winner().is_some());
}

#[test]
fn test_progress_callback_sees_every_iteration() {
    let returns = planted_universe();
    let bench = benchmark();
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = calls.clone();

    let engine = SubsetSearchEngine::new(&returns, &bench, config(2, 2.00, 25))
        .unwrap()
        .with_progress(Box::new(move |_, cumulative| {
            assert!(cumulative.is_finite());
            seen.fetch_add(1, Ordering::Relaxed);
        }));
    let control = RunControl::default();
    engine.run(&mut StdRng::seed_from_u64(11), &control).unwrap();

    assert_eq!(calls.load(Ordering::Relaxed), 25);
    assert_eq!(control.completed(), 25);
    assert_eq!(control.total(), 25);
}

#[test]
fn test_cancel_before_start() {
    let returns = planted_universe();
    let bench = benchmark();
    let engine = SubsetSearchEngine::new(&returns, &bench, config(2, 1.10, 1_000)).unwrap();
    let control = RunControl::default();
    control.cancel();

    let report = engine.run(&mut StdRng::seed_from_u64(1), &control).unwrap();
    assert_eq!(report.status, SearchStatus::Exhausted);
    assert_eq!(report.termination, TerminationReason::Cancelled);
    assert_eq!(report.iterations, 0);
    assert!(report.last_winner.is_none());
}

#[test]
fn test_cancel_from_progress_callback() {
    let returns = planted_universe();
    let bench = benchmark();
    let control = RunControl::default();
    let handle = control.clone();

    let engine = SubsetSearchEngine::new(&returns, &bench, config(2, 2.00, 1_000))
        .unwrap()
        .with_progress(Box::new(move |iteration, _| {
            if iteration == 3 {
                handle.cancel();
            }
        }));

    let report = engine.run(&mut StdRng::seed_from_u64(5), &control).unwrap();
    assert_eq!(report.termination, TerminationReason::Cancelled);
    assert_eq!(report.iterations, 3);
}

#[test]
fn test_timeout_exhausts() {
    let returns = planted_universe();
    let bench = benchmark();
    let engine = SubsetSearchEngine::new(&returns, &bench, config(2, 2.00, 1_000)).unwrap();
    let control = RunControl::default().with_timeout(Duration::ZERO);

    let report = engine.run(&mut StdRng::seed_from_u64(5), &control).unwrap();
    assert_eq!(report.status, SearchStatus::Exhausted);
    assert_eq!(report.termination, TerminationReason::TimedOut);
    assert_eq!(report.iterations, 0);
}

#[test]
fn test_subset_larger_than_universe_fails_fast() {
    let returns = planted_universe();
    let bench = benchmark();
    let err = SubsetSearchEngine::new(&returns, &bench, config(10, 1.10, 100))
        .err()
        .unwrap();
    assert_eq!(
        err,
        EngineError::Sampling(SamplingError::InsufficientUniverse {
            requested: 10,
            available: 6,
        })
    );
}

#[test]
fn test_too_few_observations_fails_fast() {
    let universe = AssetUniverse::new(["A", "B"]).unwrap();
    let returns = ReturnMatrix::new(
        universe,
        vec![jiff::civil::date(2023, 3, 1)],
        vec![ReturnSeries::new(vec![0.01]), ReturnSeries::new(vec![0.02])],
    )
    .unwrap();
    let bench = ReturnSeries::new(vec![0.0]);
    let err = SubsetSearchEngine::new(&returns, &bench, config(1, 1.10, 100))
        .err()
        .unwrap();
    assert!(matches!(err, EngineError::Config(_)));
}

#[test]
fn test_empty_benchmark_fails_fast() {
    let returns = planted_universe();
    let bench = ReturnSeries::new(vec![]);
    let err = SubsetSearchEngine::new(&returns, &bench, config(2, 1.10, 100))
        .err()
        .unwrap();
    assert!(matches!(err, EngineError::Stats(_)));
}

#[test]
fn test_unscorable_candidates_are_skipped() {
    let universe = AssetUniverse::new(["GOOD", "BROKEN"]).unwrap();
    let dates = (0..4).map(|d| jiff::civil::date(2023, 3, 1 + d)).collect();
    let returns = ReturnMatrix::new(
        universe,
        dates,
        vec![
            ReturnSeries::new(vec![0.05; 4]),
            ReturnSeries::new(vec![0.01, f64::NAN, 0.01, 0.01]),
        ],
    )
    .unwrap();
    let bench = ReturnSeries::new(vec![0.0; 4]);
    let mut cfg = config(1, 1.10, 10);
    cfg.batch_size = 50;
    let engine = SubsetSearchEngine::new(&returns, &bench, cfg).unwrap();

    let report = engine
        .run(&mut StdRng::seed_from_u64(9), &RunControl::default())
        .unwrap();
    assert!(report.is_converged());
    assert_eq!(report.assets, Some(vec!["GOOD".to_string()]));
    assert!(report.skipped_candidates > 0);
}

#[test]
fn test_score_formula() {
    let returns = planted_universe();
    let bench = benchmark();
    let engine = SubsetSearchEngine::new(&returns, &bench, config(2, 1.10, 10)).unwrap();
    assert!((engine.benchmark_mean() - 0.001).abs() < 1e-15);
    assert!((engine.score(0.011, 1.5) - 0.015).abs() < 1e-12);
    assert!(engine.score(0.0, 1.0) < 0.0);
}

#[test]
fn test_batch_tie_keeps_first_candidate() {
    let universe = AssetUniverse::new(["TWIN1", "TWIN2", "TWIN3", "TWIN4", "TWIN5"]).unwrap();
    let dates = (0..DAYS)
        .map(|d| jiff::civil::date(2023, 3, 1 + d as i8))
        .collect();
    let twin = ReturnSeries::new(vec![
        0.004, 0.006, -0.002, 0.01, 0.0, 0.003, 0.005, -0.001, 0.002, 0.007,
    ]);
    let returns = ReturnMatrix::new(universe.clone(), dates, vec![twin; 5]).unwrap();
    let bench = benchmark();
    let mut cfg = config(1, 1.10, 10);
    cfg.batch_size = 20;
    let engine = SubsetSearchEngine::new(&returns, &bench, cfg).unwrap();

    let first_drawn = sample_subset(&mut StdRng::seed_from_u64(17), &universe, 1).unwrap();
    let batch = engine.evaluate_batch(&mut StdRng::seed_from_u64(17)).unwrap();

    assert_eq!(batch.skipped, 0);
    let winner = batch.winner.unwrap();
    assert_eq!(winner.portfolio.assets(), first_drawn.as_slice());
}
