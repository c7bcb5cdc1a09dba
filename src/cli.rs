//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

use crate::adapters::console_report::format_comparison_table;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestParams, BacktestResult, run_backtest};
use crate::domain::config_validation::{
    data_dir, default_symbol, read_backtest_params, read_date_range, read_instrument_table,
    validate_config,
};
use crate::domain::error::BacktestError;
use crate::domain::instrument::{DateRange, Instrument, InstrumentTable, parse_symbols};
use crate::domain::price::PriceSeries;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "rsitrader",
    version,
    about = "RSI threshold strategy backtester with a buy-and-hold baseline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the strategy and the baseline over one or more instruments
    Backtest(BacktestArgs),
    /// List configured instruments and the data available for each
    Instruments {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Validate a configuration file without loading price data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct BacktestArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Instrument symbol or comma-separated list, overriding `[backtest] instrument`
    #[arg(long, conflicts_with = "all")]
    pub code: Option<String>,
    /// Run every configured instrument
    #[arg(long)]
    pub all: bool,
    #[arg(long)]
    pub capital: Option<f64>,
    /// Fee per trade as a percentage of notional (0.1 = 0.1%)
    #[arg(long)]
    pub fee_pct: Option<f64>,
    #[arg(long)]
    pub overbought: Option<f64>,
    #[arg(long)]
    pub oversold: Option<f64>,
    #[arg(long)]
    pub period: Option<usize>,
    /// First date, YYYY-MM-DD
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// Last date, YYYY-MM-DD
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Directory for equity.csv and trades.csv, one subdirectory per symbol
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Validate and print the resolved run without loading data
    #[arg(long)]
    pub dry_run: bool,
}

/// Everything a backtest invocation needs once config and flags are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub params: BacktestParams,
    pub range: DateRange,
    pub instruments: Vec<Instrument>,
    pub data_dir: PathBuf,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest(args) => run_backtest_command(&args),
        Command::Instruments { config, data_dir } => {
            run_instruments(config.as_deref(), data_dir.as_deref())
        }
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            (&e).into()
        }
    }
}

/// Load the INI file at `path`, or an empty configuration when none is given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, BacktestError> {
    match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| BacktestError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => FileConfigAdapter::from_string("").map_err(|reason| {
            BacktestError::ConfigParse {
                file: "<defaults>".to_string(),
                reason,
            }
        }),
    }
}

/// Config values with command-line overrides applied on top.
pub fn build_params(
    config: &dyn ConfigPort,
    args: &BacktestArgs,
) -> Result<BacktestParams, BacktestError> {
    let mut params = read_backtest_params(config)?;
    if let Some(capital) = args.capital {
        params.initial_capital = capital;
    }
    if let Some(pct) = args.fee_pct {
        params.fee_rate = pct / 100.0;
    }
    if let Some(overbought) = args.overbought {
        params.overbought = overbought;
    }
    if let Some(oversold) = args.oversold {
        params.oversold = oversold;
    }
    if let Some(period) = args.period {
        params.period = period;
    }
    params.validate()?;
    Ok(params)
}

pub fn build_date_range(
    config: &dyn ConfigPort,
    args: &BacktestArgs,
) -> Result<DateRange, BacktestError> {
    let configured = read_date_range(config)?;
    DateRange::new(
        args.start.unwrap_or(configured.start),
        args.end.unwrap_or(configured.end),
    )
}

pub fn select_instruments(
    table: &InstrumentTable,
    config: &dyn ConfigPort,
    args: &BacktestArgs,
) -> Result<Vec<Instrument>, BacktestError> {
    if args.all {
        return Ok(table.iter().cloned().collect());
    }
    let symbols = match &args.code {
        Some(list) => parse_symbols(list).map_err(|e| BacktestError::invalid(e.to_string()))?,
        None => vec![default_symbol(config)],
    };
    symbols
        .iter()
        .map(|s| table.resolve(s).cloned())
        .collect()
}

pub fn build_run_plan(
    config: &dyn ConfigPort,
    args: &BacktestArgs,
) -> Result<RunPlan, BacktestError> {
    let table = read_instrument_table(config)?;
    Ok(RunPlan {
        params: build_params(config, args)?,
        range: build_date_range(config, args)?,
        instruments: select_instruments(&table, config, args)?,
        data_dir: args
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(data_dir(config))),
    })
}

/// Fetch prices for one instrument and run both simulations.
pub fn run_instrument(
    data_port: &dyn DataPort,
    instrument: &Instrument,
    range: &DateRange,
    params: &BacktestParams,
) -> Result<BacktestResult, BacktestError> {
    info!(
        "Loading {} from {} to {}",
        instrument.label(),
        range.start,
        range.end
    );
    let bars = data_port.fetch_ohlcv(&instrument.symbol, range.start, range.end)?;
    let prices = PriceSeries::from_bars(&bars)?;
    if let (Some(first), Some(last)) = (prices.first(), prices.last()) {
        debug!("{} bars from {} to {}", prices.len(), first.date, last.date);
    }

    info!(
        "Running RSI({}) {}/{} over {} bars",
        params.period,
        params.oversold,
        params.overbought,
        prices.len()
    );
    let result = run_backtest(&prices, params)?;
    info!(
        "{}: {} trades, final value {:.2}",
        instrument.symbol, result.trade_summary.trade_count, result.trade_summary.final_value
    );
    if result.portfolio.position.is_long() {
        info!("{} still held at the end of the range", instrument.symbol);
    }
    Ok(result)
}

fn is_data_failure(err: &BacktestError) -> bool {
    matches!(
        err,
        BacktestError::Data { .. }
            | BacktestError::InsufficientData { .. }
            | BacktestError::InvalidPriceSeries { .. }
    )
}

/// Run every instrument in the plan in turn.
///
/// A single instrument's failure is returned as-is. With several
/// instruments, data failures are logged and skipped; the run fails only
/// when none succeed.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: Option<(&dyn ReportPort, &Path)>,
    plan: &RunPlan,
) -> Result<Vec<(Instrument, BacktestResult)>, BacktestError> {
    let skip_failures = plan.instruments.len() > 1;
    let mut results = Vec::with_capacity(plan.instruments.len());

    for instrument in &plan.instruments {
        let result = match run_instrument(data_port, instrument, &plan.range, &plan.params) {
            Ok(r) => r,
            Err(e) if skip_failures && is_data_failure(&e) => {
                warn!("skipping {} ({})", instrument.symbol, e);
                continue;
            }
            Err(e) => return Err(e),
        };

        if let Some((reporter, output_dir)) = report_port {
            let dir = output_dir.join(&instrument.symbol);
            reporter.write(&result, instrument, &dir)?;
            info!("Results written to {}", dir.display());
        }
        results.push((instrument.clone(), result));
    }

    if results.is_empty() {
        return Err(BacktestError::Data {
            reason: "no instrument had enough data to backtest".to_string(),
        });
    }
    Ok(results)
}

fn run_backtest_command(args: &BacktestArgs) -> Result<(), BacktestError> {
    let config = load_config(args.config.as_deref())?;
    let plan = build_run_plan(&config, args)?;

    if args.dry_run {
        print!("{}", describe_plan(&plan));
        info!("Dry run complete: configuration is valid");
        return Ok(());
    }

    let data_port = CsvAdapter::new(plan.data_dir.clone());
    let reporter = CsvReportAdapter::new();
    let report_port = args
        .output
        .as_deref()
        .map(|dir| (&reporter as &dyn ReportPort, dir));

    let results = run_backtest_pipeline(&data_port, report_port, &plan)?;
    for (instrument, result) in &results {
        println!(
            "\n=== {}: {} to {} ===",
            instrument.label(),
            plan.range.start,
            plan.range.end
        );
        print!("{}", format_comparison_table(result));
    }
    Ok(())
}

pub fn describe_plan(plan: &RunPlan) -> String {
    let p = &plan.params;
    let symbols: Vec<&str> = plan.instruments.iter().map(|i| i.symbol.as_str()).collect();
    let mut out = String::new();
    out.push_str(&format!("Instruments:     {}\n", symbols.join(", ")));
    out.push_str(&format!(
        "Date range:      {} to {}\n",
        plan.range.start, plan.range.end
    ));
    out.push_str(&format!("Initial capital: {:.2}\n", p.initial_capital));
    out.push_str(&format!("Fee rate:        {}\n", p.fee_rate));
    out.push_str(&format!(
        "RSI:             period {}, oversold {}, overbought {}\n",
        p.period, p.oversold, p.overbought
    ));
    out.push_str(&format!("Data directory:  {}\n", plan.data_dir.display()));
    out
}

fn run_instruments(
    config_path: Option<&Path>,
    data_dir_override: Option<&Path>,
) -> Result<(), BacktestError> {
    let config = load_config(config_path)?;
    let table = read_instrument_table(&config)?;
    let dir = data_dir_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(data_dir(&config)));
    let data_port = CsvAdapter::new(dir.clone());

    for instrument in table.iter() {
        let availability = match data_port.get_data_range(&instrument.symbol) {
            Ok(Some((first, last, count))) => format!("{} bars, {} to {}", count, first, last),
            Ok(None) => "no data".to_string(),
            Err(e) => format!("unreadable ({})", e),
        };
        println!(
            "{:<8}{:<32}{}",
            instrument.symbol, instrument.name, availability
        );
    }

    match data_port.list_symbols() {
        Ok(symbols) => {
            let unlisted: Vec<String> = symbols
                .into_iter()
                .filter(|s| table.find(s).is_none())
                .collect();
            if !unlisted.is_empty() {
                warn!(
                    "data files without an [instruments] entry: {}",
                    unlisted.join(", ")
                );
            }
        }
        Err(e) => warn!("cannot scan {}: {}", dir.display(), e),
    }

    info!("{} instruments configured", table.count());
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), BacktestError> {
    let config = load_config(Some(config_path))?;
    validate_config(&config)?;
    let plan = build_run_plan(&config, &BacktestArgs::default())?;
    print!("{}", describe_plan(&plan));
    info!("Configuration is valid");
    Ok(())
}
