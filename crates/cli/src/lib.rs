use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fxrate")]
#[command(about = "FxRate - multi-feed FX rate aggregation and cross-rate engine")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// Log output format (overrides logging.format from the configuration)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormatArg>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute one rate from a quote context
    Compute {
        /// Path to the configuration file
        #[arg(short, long, default_value = "master_config/rate_config.yaml")]
        config: PathBuf,

        /// Path to a JSON quote context ({"calc_name": ..., "quotes": {...}})
        #[arg(long)]
        context: PathBuf,

        /// Pair to compute instead of the context's calc_name
        #[arg(long)]
        calc: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute every supported pair from a snapshot of per-feed rates
    Calculate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "master_config/rate_config.yaml")]
        config: PathBuf,

        /// Path to a JSON snapshot ({"<feed>": {"<PAIR>": {"bid": .., "ask": ..}}})
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration without computing anything
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "master_config/rate_config.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "rate_config.yaml")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable, colored
    Pretty,

    /// One JSON object per line
    Json,

    /// Single-line, less verbose
    Compact,
}

impl LogFormatArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormatArg::Pretty => "pretty",
            LogFormatArg::Json => "json",
            LogFormatArg::Compact => "compact",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compute_args() {
        let cli = Cli::try_parse_from([
            "fxrate",
            "compute",
            "--context",
            "ctx.json",
            "--calc",
            "eurusd",
            "--json",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.log_format, Some(LogFormatArg::Json));
        match cli.command {
            Commands::Compute { config, context, calc, json } => {
                assert_eq!(config, PathBuf::from("master_config/rate_config.yaml"));
                assert_eq!(context, PathBuf::from("ctx.json"));
                assert_eq!(calc.as_deref(), Some("eurusd"));
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_calculate_requires_snapshot() {
        assert!(Cli::try_parse_from(["fxrate", "calculate"]).is_err());
        assert!(Cli::try_parse_from(["fxrate", "calculate", "-s", "snap.json"]).is_ok());
    }

    #[test]
    fn test_log_format_names() {
        assert_eq!(LogFormatArg::Compact.as_str(), "compact");
        assert!(Cli::try_parse_from(["fxrate", "--log-format", "xml", "validate"]).is_err());
    }
}
