use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MasterConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    parse_config(&content)
}

/// Parse configuration from YAML text, substituting environment variables first
pub fn parse_config(content: &str) -> Result<MasterConfig> {
    let substituted = substitution::substitute_env_vars(content)?;
    debug!("Environment variable substitution completed");

    let config: MasterConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!(
        base_pair = %config.formula.base_pair,
        pairs = config.formula.supported_pairs.len(),
        match_mode = %config.formula.match_mode,
        "Configuration loaded successfully"
    );
    Ok(config)
}

#[instrument]
pub fn generate_default_config() -> MasterConfig {
    MasterConfig {
        formula: FormulaConfig::default(),
        logging: LoggingConfig::default(),
    }
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &MasterConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_config() {
        let config = generate_default_config();

        assert_eq!(config.formula.base_pair, "USDTRY");
        assert_eq!(config.formula.minimum_source_count, 2);
        assert_eq!(config.formula.supported_pairs, vec!["USDTRY", "EURUSD", "GBPUSD"]);
        assert_eq!(config.logging.format, "pretty");
        assert!(validate_config(&config).is_valid());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "fxrate-config-test-{}.yaml",
            std::process::id()
        ));

        let mut config = generate_default_config();
        config.formula.cross_mode = CrossMode::MidRate;
        config.formula.supported_pairs.push("DOGEUSD".to_string());

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.formula.cross_mode, CrossMode::MidRate);
        assert_eq!(loaded.formula.supported_pairs.len(), 4);
        assert_eq!(loaded.formula.supported_pairs[3], "DOGEUSD");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/definitely/not/here/rate_config.yaml");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_config_substitutes_env() {
        std::env::set_var("FXRATE_PARSER_TEST_BASE", "USDTRY");

        let config = parse_config("formula:\n  base_pair: ${FXRATE_PARSER_TEST_BASE}\n").unwrap();
        assert_eq!(config.formula.base_pair, "USDTRY");
    }
}
