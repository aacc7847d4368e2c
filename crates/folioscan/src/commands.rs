//! The `search`, `frontier`, and `describe` runs, independent of the console

use std::slice;

use color_eyre::eyre::{WrapErr, eyre};
use folioscan_core::distribution::{box_plot_summary, group_averages};
use folioscan_core::frontier::{FrontierInputs, FrontierReport, FrontierSimulator};
use folioscan_core::model::{ReturnMatrix, ReturnSeries};
use folioscan_core::search::{SearchReport, SubsetSearchEngine};
use folioscan_core::statistics::SummaryStats;
use folioscan_core::{ReturnSeriesBuilder, RunControl};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::RunConfig;
use crate::data::{CsvPriceSource, PriceSource, SyntheticPriceSource};
use crate::report::{DescribeReport, SeriesSummary};

/// CSV files when configured, otherwise a synthetic market seeded with `seed`
pub fn price_source(config: &RunConfig, seed: u64) -> color_eyre::Result<Box<dyn PriceSource>> {
    match &config.data.prices {
        Some(path) => {
            let mut source = CsvPriceSource::new(path.clone());
            if let Some(bench) = &config.data.benchmark_prices {
                source = source.with_benchmark_file(bench.clone());
            }
            Ok(Box::new(source))
        }
        None => {
            let synthetic = &config.data.synthetic;
            tracing::info!(
                assets = synthetic.assets,
                days = synthetic.trading_days,
                seed,
                "no price file configured, using a synthetic market"
            );
            let source = SyntheticPriceSource::with_benchmark(
                synthetic.assets,
                synthetic.trading_days,
                synthetic.start,
                &config.benchmark,
                seed,
            )?;
            Ok(Box::new(source))
        }
    }
}

/// Configured universe, or every priced ticker except the benchmark
pub fn resolve_universe(
    config: &RunConfig,
    source: &dyn PriceSource,
) -> color_eyre::Result<Vec<String>> {
    if !config.universe.is_empty() {
        return Ok(config.universe.clone());
    }
    let tickers: Vec<String> = source
        .available_tickers()?
        .into_iter()
        .filter(|t| *t != config.benchmark)
        .collect();
    if tickers.is_empty() {
        return Err(eyre!("price source has no tickers besides the benchmark"));
    }
    Ok(tickers)
}

pub fn load_returns(
    config: &RunConfig,
    source: &dyn PriceSource,
    tickers: &[String],
) -> color_eyre::Result<ReturnMatrix> {
    let prices = source
        .fetch_adjusted_closes(tickers, config.data.start, config.data.end)
        .wrap_err("Failed to load asset prices")?;
    let returns = ReturnSeriesBuilder::new()
        .build(&prices)
        .wrap_err("Failed to compute asset returns")?;
    tracing::info!(
        assets = tickers.len(),
        observations = returns.num_observations(),
        "loaded daily returns"
    );
    Ok(returns)
}

pub fn load_benchmark(
    config: &RunConfig,
    source: &dyn PriceSource,
) -> color_eyre::Result<ReturnSeries> {
    let prices = source
        .fetch_benchmark_closes(&config.benchmark, config.data.start, config.data.end)
        .wrap_err_with(|| format!("Failed to load benchmark {}", config.benchmark))?;
    ReturnSeriesBuilder::new()
        .build_series(&prices)
        .wrap_err("Failed to compute benchmark returns")
}

pub fn run_search(
    config: &RunConfig,
    source: &dyn PriceSource,
    target_cumulative_return: f64,
    seed: u64,
    control: &RunControl,
) -> color_eyre::Result<SearchReport> {
    let universe = resolve_universe(config, source)?;
    let returns = load_returns(config, source, &universe)?;
    let benchmark = load_benchmark(config, source)?;

    let engine = SubsetSearchEngine::new(
        &returns,
        &benchmark,
        config.search_config(target_cumulative_return),
    )?;
    tracing::info!(
        universe = universe.len(),
        subset_size = config.search.subset_size,
        target = target_cumulative_return,
        benchmark_mean = engine.benchmark_mean(),
        seed,
        "starting subset search"
    );

    let report = engine.run(&mut StdRng::seed_from_u64(seed), control)?;
    tracing::info!(
        status = ?report.status,
        iterations = report.iterations,
        "subset search finished"
    );
    Ok(report)
}

pub fn run_frontier(
    config: &RunConfig,
    source: &dyn PriceSource,
    seed: u64,
    control: &RunControl,
) -> color_eyre::Result<FrontierReport> {
    let tickers = if config.frontier.tickers.is_empty() {
        resolve_universe(config, source)?
    } else {
        config.frontier.tickers.clone()
    };
    let returns = load_returns(config, source, &tickers)?;
    let inputs = FrontierInputs::from_returns(&returns)?;
    let simulator = FrontierSimulator::new(inputs, config.frontier_config())?;
    tracing::info!(
        assets = tickers.len(),
        trials = config.frontier.trials,
        seed,
        "starting frontier sweep"
    );

    #[cfg(feature = "parallel")]
    let report = simulator.run_parallel(seed, control)?;

    #[cfg(not(feature = "parallel"))]
    let report = simulator.run(
        &mut folioscan_core::sampling::WeightSampler::new(StdRng::seed_from_u64(seed)),
        control,
    )?;

    Ok(report)
}

fn summarize(name: String, series: &[f64], config: &RunConfig) -> color_eyre::Result<SeriesSummary> {
    Ok(SeriesSummary {
        stats: SummaryStats::from_series(series, config.trading_days_per_year)?,
        distribution: box_plot_summary(series)?,
        name,
    })
}

/// Per-asset distribution summaries plus one equal-weighted series per sector.
///
/// Each sector is loaded on its own, so a gap in one sector does not trim
/// the others.
pub fn run_describe(
    config: &RunConfig,
    source: &dyn PriceSource,
) -> color_eyre::Result<DescribeReport> {
    let universe = resolve_universe(config, source)?;
    let returns = load_returns(config, source, &universe)?;

    let assets = returns
        .universe()
        .tickers()
        .iter()
        .zip(returns.columns())
        .map(|(ticker, series)| summarize(ticker.clone(), series.values(), config))
        .collect::<color_eyre::Result<Vec<_>>>()?;

    let mut sectors = Vec::with_capacity(config.sectors.len());
    for group in &config.sectors {
        let sector_returns = load_returns(config, source, &group.tickers)
            .wrap_err_with(|| format!("Failed to load sector {}", group.name))?;
        for (name, series) in group_averages(&sector_returns, slice::from_ref(group))? {
            sectors.push(summarize(name, series.values(), config)?);
        }
    }

    Ok(DescribeReport {
        observations: returns.num_observations(),
        first_date: returns.dates().first().copied(),
        last_date: returns.dates().last().copied(),
        assets,
        sectors,
    })
}
