//! Config loading and a single pipeline run.

use std::path::Path;

use anyhow::{Context, Result};
use matchup_pipeline::{DerivedRecords, MatchupInput, MatchupProcessor, PipelineConfig};
use tracing::debug;

/// Load configuration from an optional YAML file, then apply `ATRAIN_*`
/// environment overrides and the CLI process mode.
pub fn load_config(path: Option<&str>, process_mode: Option<&str>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            let config = PipelineConfig::from_yaml_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path))?;
            debug!(path = %path, "Loaded pipeline config");
            config
        }
        None => PipelineConfig::default(),
    };

    config.apply_env();

    if let Some(mode) = process_mode {
        config.process_mode = mode
            .parse()
            .with_context(|| format!("Invalid process mode: {}", mode))?;
    }

    Ok(config)
}

/// Read the matchup input at `input_path` and derive its records.
pub fn run(config: PipelineConfig, input_path: impl AsRef<Path>) -> Result<DerivedRecords> {
    let input_path = input_path.as_ref();

    // Configuration errors must stop the run before the input is read
    let processor = MatchupProcessor::with_klm(config).context("Invalid configuration")?;

    let content = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read input file: {}", input_path.display()))?;
    let input = MatchupInput::from_json(&content)
        .with_context(|| format!("Failed to parse input file: {}", input_path.display()))?;

    let records = processor.process(input).context("Matchup derivation failed")?;
    Ok(records)
}
