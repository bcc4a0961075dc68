//! FxRate CLI Binary
//!
//! Entry point for computing rates from quote contexts or feed
//! snapshots, and for creating and validating configuration files.

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Cli, Commands, LogFormatArg};
use config::{generate_default_config, load_config, save_config, validate_config, MasterConfig};
use observability::{init_logging, LogFormat, DEFAULT_LOG_LEVEL};
use rate_engine::{CalcTarget, CalculatedRate, FeedSnapshot, FormulaEngine, QuoteContext, RateCalculator};
use std::path::Path;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Commands::Compute {
            config,
            context,
            calc,
            json,
        } => {
            let config = load_checked_config(&config, cli.log_format)?;
            info!("Executing 'compute' command");
            compute_command(&config, context, calc, json).await
        }
        Commands::Calculate {
            config,
            snapshot,
            json,
        } => {
            let config = load_checked_config(&config, cli.log_format)?;
            info!("Executing 'calculate' command");
            calculate_command(&config, snapshot, json).await
        }
        Commands::Validate { config } => {
            init_cli_logging(cli.log_format, None)?;
            info!("Executing 'validate' command");
            validate_command(config).await
        }
        Commands::Init { output } => {
            init_cli_logging(cli.log_format, None)?;
            info!("Executing 'init' command");
            init_command(output).await
        }
    }
}

/// Command-line format wins over the configuration's `logging.format`
fn init_cli_logging(format: Option<LogFormatArg>, config: Option<&MasterConfig>) -> Result<()> {
    let format = match (format, config) {
        (Some(arg), _) => LogFormat::parse(arg.as_str()).unwrap_or_default(),
        (None, Some(config)) => LogFormat::parse(&config.logging.format).unwrap_or_default(),
        (None, None) => LogFormat::default(),
    };
    let level = config.map_or(DEFAULT_LOG_LEVEL, |c| c.logging.level.as_str());

    init_logging("fxrate", format, level)
}

/// Load the configuration, start logging from it, and refuse to go on
/// if it does not validate.
///
/// Logging settings live in the file itself, so the load is reported once
/// the subscriber is installed.
fn load_checked_config(path: &Path, format: Option<LogFormatArg>) -> Result<MasterConfig> {
    let config = load_config(path)?;
    init_cli_logging(format, Some(&config))?;

    info!(
        path = ?path,
        base_pair = %config.formula.base_pair,
        pairs = config.formula.supported_pairs.len(),
        match_mode = %config.formula.match_mode,
        cross_mode = %config.formula.cross_mode,
        "Configuration loaded"
    );

    let report = validate_config(&config);

    for default in &report.defaults_applied {
        debug!(field = %default.field, value = %default.value, "Default applied");
    }
    for warning in &report.warnings {
        warn!(field = %warning.field, message = %warning.message, "Configuration warning");
    }

    if !report.is_valid() {
        error!(
            error_count = report.errors.len(),
            "Configuration validation failed"
        );
        for err in &report.errors {
            error!("{}", err);
        }
        anyhow::bail!("Cannot compute rates due to configuration errors");
    }

    Ok(config)
}

async fn compute_command<P: AsRef<Path>>(
    config: &MasterConfig,
    context_path: P,
    calc: Option<String>,
    json: bool,
) -> Result<()> {
    let context_path = context_path.as_ref();
    let engine = FormulaEngine::from_config(&config.formula)?;

    let raw = tokio::fs::read_to_string(context_path)
        .await
        .with_context(|| format!("Failed to read context: {:?}", context_path))?;
    let mut context = QuoteContext::from_json(&raw)
        .with_context(|| format!("Failed to parse context: {:?}", context_path))?;

    if let Some(calc) = calc {
        context = context.with_calc_name(calc);
    }
    debug!(calc_name = context.calc_name(), quotes = context.len(), "Context loaded");

    let pair = match engine.resolve(context.calc_name())? {
        CalcTarget::Base => engine.base_pair().clone(),
        CalcTarget::Cross(pair) => pair.clone(),
    };
    let quote = engine.compute(&context)?;

    let rate = CalculatedRate {
        name: engine.published_name(&pair),
        calc_name: pair.code(),
        bid: quote.bid,
        ask: quote.ask,
        timestamp: Utc::now(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&rate)?);
    } else {
        println!("{}", rate);
    }

    Ok(())
}

async fn calculate_command<P: AsRef<Path>>(
    config: &MasterConfig,
    snapshot_path: P,
    json: bool,
) -> Result<()> {
    let snapshot_path = snapshot_path.as_ref();
    let calculator = RateCalculator::new(FormulaEngine::from_config(&config.formula)?);

    let raw = tokio::fs::read_to_string(snapshot_path)
        .await
        .with_context(|| format!("Failed to read snapshot: {:?}", snapshot_path))?;
    let snapshot: FeedSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse snapshot: {:?}", snapshot_path))?;

    let rates = calculator.calculate(&snapshot)?;

    if rates.is_empty() {
        warn!("No rates could be calculated from the snapshot");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rates)?);
    } else {
        for rate in &rates {
            println!("{}", rate);
        }
    }

    Ok(())
}

async fn validate_command<P: AsRef<Path>>(config_path: P) -> Result<()> {
    info!(path = ?config_path.as_ref(), "Validating configuration");

    let config = match load_config(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            anyhow::bail!(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    let formula = &config.formula;
    println!("[ok] Configuration is valid!");
    println!();
    println!("Base pair: {}", formula.base_pair);
    println!("Minimum sources: {}", formula.minimum_source_count);
    println!("Match mode: {}", formula.match_mode);
    println!("Cross mode: {}", formula.cross_mode);
    println!("Supported pairs: {}", formula.supported_pairs.join(", "));

    Ok(())
}

async fn init_command<P: AsRef<Path>>(output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created successfully!");
    println!();
    println!("Location: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Edit base_pair and supported_pairs for your feeds");
    println!(
        "  2. Run 'fxrate validate --config {:?}' to check configuration",
        output_path
    );
    println!(
        "  3. Run 'fxrate calculate --config {:?} --snapshot <file>' to compute rates",
        output_path
    );

    Ok(())
}
