//! Human-readable and JSON output of run results

use std::io::Write;
use std::path::Path;

use clap::ValueEnum;
use color_eyre::eyre::WrapErr;
use folioscan_core::distribution::BoxPlotSummary;
use folioscan_core::frontier::FrontierReport;
use folioscan_core::search::{SearchReport, SearchStatus};
use folioscan_core::statistics::SummaryStats;
use jiff::civil::Date;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Statistics and distribution of one named daily series
#[derive(Debug, Clone, Serialize)]
pub struct SeriesSummary {
    pub name: String,
    pub stats: SummaryStats,
    pub distribution: BoxPlotSummary,
}

/// Output of the `describe` command
#[derive(Debug, Clone, Serialize)]
pub struct DescribeReport {
    pub observations: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_date: Option<Date>,
    pub assets: Vec<SeriesSummary>,
    pub sectors: Vec<SeriesSummary>,
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> color_eyre::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).wrap_err("Failed to serialize report")?;
    writeln!(out)?;
    Ok(())
}

pub fn write_search_report<W: Write>(
    out: &mut W,
    report: &SearchReport,
    format: OutputFormat,
) -> color_eyre::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, report);
    }

    match (&report.status, &report.assets, &report.stats) {
        (SearchStatus::Converged, Some(assets), Some(stats)) => {
            writeln!(out, "Winning portfolio (iteration {}):", report.iterations)?;
            writeln!(out, "  Assets                    {}", assets.join(", "))?;
            writeln!(out, "  Mean daily return         {:.6}", stats.mean_daily_return)?;
            writeln!(out, "  Daily standard deviation  {:.6}", stats.std_daily_return)?;
            writeln!(out, "  Annual mean return        {:.4}", stats.annual_mean)?;
            writeln!(out, "  Annual standard deviation {:.4}", stats.annual_std)?;
            writeln!(out, "  Cumulative return         {:.4}", stats.cumulative_return)?;
        }
        _ => {
            writeln!(
                out,
                "No portfolio reached a cumulative return of {} after {} iterations ({:?}).",
                report.target_cumulative_return, report.iterations, report.termination
            )?;
            if let Some(best) = report.history.best_cumulative_return() {
                writeln!(out, "  Best cumulative return seen {best:.4}")?;
            }
            if let Some(last) = &report.last_winner {
                writeln!(
                    out,
                    "  Last winner {} (cumulative {:.4})",
                    last.assets.join(", "),
                    last.cumulative_return
                )?;
            }
        }
    }
    if report.skipped_candidates > 0 {
        writeln!(
            out,
            "  Skipped {} candidates with undefined score",
            report.skipped_candidates
        )?;
    }
    Ok(())
}

pub fn write_frontier_report<W: Write>(
    out: &mut W,
    report: &FrontierReport,
    format: OutputFormat,
) -> color_eyre::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, report);
    }

    writeln!(
        out,
        "Frontier: {} of {} trials evaluated over {}",
        report.trials_evaluated,
        report.trials_requested,
        report.tickers.join(", ")
    )?;
    if report.is_partial() {
        writeln!(out, "  Run stopped early ({:?})", report.termination)?;
    }
    if report.skipped_trials > 0 {
        writeln!(out, "  Skipped {} zero-risk trials", report.skipped_trials)?;
    }

    let Some(optimal) = &report.optimal else {
        writeln!(out, "  No trial produced a defined Sharpe ratio")?;
        return Ok(());
    };
    writeln!(out, "Maximum-Sharpe portfolio (trial {}):", optimal.trial)?;
    writeln!(out, "  Expected daily return {:.4}", optimal.expected_return)?;
    writeln!(out, "  Daily risk            {:.4}", optimal.risk)?;
    writeln!(out, "  Sharpe ratio          {:.4}", optimal.sharpe)?;
    if let Some(annual) = &report.optimal_annualized {
        writeln!(out, "  Annual return         {:.4}", annual.mean)?;
        writeln!(out, "  Annual risk           {:.4}", annual.std_dev)?;
    }
    writeln!(out, "  Weights:")?;
    for (ticker, weight) in report.tickers.iter().zip(&optimal.weights) {
        writeln!(out, "    {ticker:<12} {weight:.4}")?;
    }
    Ok(())
}

fn write_summary_table<W: Write>(out: &mut W, rows: &[SeriesSummary]) -> std::io::Result<()> {
    writeln!(
        out,
        "  {:<14} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>8}",
        "series", "min", "q1", "median", "q3", "max", "cum", "outliers"
    )?;
    for row in rows {
        let d = &row.distribution;
        writeln!(
            out,
            "  {:<14} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>8}",
            row.name,
            d.min,
            d.q1,
            d.median,
            d.q3,
            d.max,
            row.stats.cumulative_return,
            d.outliers.len()
        )?;
    }
    Ok(())
}

pub fn write_describe_report<W: Write>(
    out: &mut W,
    report: &DescribeReport,
    format: OutputFormat,
) -> color_eyre::Result<()> {
    if format == OutputFormat::Json {
        return write_json(out, report);
    }

    match (report.first_date, report.last_date) {
        (Some(first), Some(last)) => writeln!(
            out,
            "Daily returns: {} observations from {first} to {last}",
            report.observations
        )?,
        _ => writeln!(out, "Daily returns: {} observations", report.observations)?,
    }
    write_summary_table(out, &report.assets)?;

    if !report.sectors.is_empty() {
        writeln!(out, "Sector averages:")?;
        write_summary_table(out, &report.sectors)?;
    }

    for row in report.assets.iter().chain(&report.sectors) {
        for (pos, value) in &row.distribution.outliers {
            writeln!(out, "  outlier {:<14} row {pos:>4} {value:.4}", row.name)?;
        }
    }
    Ok(())
}

/// Write every frontier trial as `trial,return,risk,sharpe,<weights...>`
pub fn export_frontier_csv(path: &Path, report: &FrontierReport) -> color_eyre::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .wrap_err_with(|| format!("Failed to create {}", path.display()))?;

    let mut header = vec![
        "trial".to_string(),
        "expected_return".to_string(),
        "risk".to_string(),
        "sharpe".to_string(),
    ];
    header.extend(report.tickers.iter().cloned());
    writer.write_record(&header)?;

    for point in report.simulation.points() {
        let mut record = vec![
            point.trial.to_string(),
            point.expected_return.to_string(),
            point.risk.to_string(),
            point.sharpe.to_string(),
        ];
        record.extend(point.weights.iter().map(f64::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    tracing::info!(
        path = %path.display(),
        points = report.simulation.len(),
        "exported frontier cloud"
    );
    Ok(())
}
