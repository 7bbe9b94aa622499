pub mod cli;
pub mod toml_config;

use crate::core::inflation::{InflationTable, MAX_TARGET_YEAR, MIN_TARGET_YEAR};
use crate::core::ingest::{DEFAULT_MATERIAL_COLUMN, DEFAULT_PRICE_COLUMN};
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

pub const DEFAULT_PRICE_TARGET_YEAR: i32 = 2028;
pub const DEFAULT_REPLENISHMENT_TARGET_YEAR: i32 = 2040;
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_ARCHIVE_NAME: &str = "inventory_analysis.zip";

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "oem-inventory")]
#[command(about = "Analyse OEM inventory usage, forecast prices and predict replenishments")]
pub struct CliConfig {
    /// Inventory data file (.xlsx or .csv)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Target year for unit price prediction
    #[arg(long)]
    pub price_target_year: Option<i32>,

    /// Predict replenishments up to and including this year
    #[arg(long)]
    pub replenishment_target_year: Option<i32>,

    /// Forecast a single material instead of all of them
    #[arg(long)]
    pub material: Option<String>,

    /// Output formats: csv, tsv, json
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Write export files individually instead of one ZIP archive
    #[arg(long)]
    pub no_compress: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    /// Read the input and report detected columns without analysing
    #[arg(long)]
    pub dry_run: bool,
}

/// Resolved settings for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Label from `[analysis] name`, shown in logs and the report footer.
    pub name: Option<String>,
    pub input_path: Option<String>,
    pub output_path: String,
    pub material_column: String,
    pub price_column: String,
    pub price_target_year: i32,
    pub replenishment_target_year: i32,
    pub material: Option<String>,
    pub inflation: InflationTable,
    pub output_formats: Vec<String>,
    /// `None` writes files individually.
    pub archive_name: Option<String>,
    pub monitor: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            name: None,
            input_path: None,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            material_column: DEFAULT_MATERIAL_COLUMN.to_string(),
            price_column: DEFAULT_PRICE_COLUMN.to_string(),
            price_target_year: DEFAULT_PRICE_TARGET_YEAR,
            replenishment_target_year: DEFAULT_REPLENISHMENT_TARGET_YEAR,
            material: None,
            inflation: InflationTable::default(),
            output_formats: vec!["csv".to_string(), "json".to_string()],
            archive_name: Some(DEFAULT_ARCHIVE_NAME.to_string()),
            monitor: false,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml(config: &TomlConfig) -> Result<Self> {
        let defaults = Self::default();

        let archive_name = match &config.load.compression {
            Some(compression) if !compression.enabled => None,
            Some(compression) => Some(
                compression
                    .filename
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string()),
            ),
            None => defaults.archive_name,
        };

        Ok(Self {
            name: config
                .analysis
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            input_path: config.source.path.clone(),
            output_path: config
                .load
                .output_path
                .clone()
                .unwrap_or(defaults.output_path),
            material_column: config
                .source
                .material_column
                .clone()
                .unwrap_or(defaults.material_column),
            price_column: config
                .source
                .price_column
                .clone()
                .unwrap_or(defaults.price_column),
            price_target_year: config
                .analysis
                .price_target_year
                .unwrap_or(defaults.price_target_year),
            replenishment_target_year: config
                .analysis
                .replenishment_target_year
                .unwrap_or(defaults.replenishment_target_year),
            material: config.analysis.material.clone(),
            inflation: config.inflation_table()?,
            output_formats: config
                .load
                .output_formats
                .as_deref()
                .map(normalize_formats)
                .unwrap_or(defaults.output_formats),
            archive_name,
            monitor: config.monitoring_enabled(),
        })
    }

    /// 載入 `--config` 指定的 TOML (若有)，再套用命令列覆蓋
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                Self::from_toml(&TomlConfig::from_file(path)?)?
            }
            None => Self::default(),
        };
        config.apply_cli(cli);
        Ok(config)
    }

    /// 應用命令列覆蓋設定
    #[cfg(feature = "cli")]
    pub fn apply_cli(&mut self, cli: &CliConfig) {
        if let Some(input) = &cli.input {
            self.input_path = Some(input.clone());
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = output_path.clone();
        }
        if let Some(year) = cli.price_target_year {
            self.price_target_year = year;
        }
        if let Some(year) = cli.replenishment_target_year {
            self.replenishment_target_year = year;
        }
        if let Some(material) = &cli.material {
            self.material = Some(material.clone());
        }
        if !cli.formats.is_empty() {
            self.output_formats = normalize_formats(&cli.formats);
        }
        if cli.no_compress {
            self.archive_name = None;
        }
        if cli.monitor {
            self.monitor = true;
        }
    }
}

/// Lowercases and trims format names, keeping the first of any repeats so
/// each export file is written once.
pub fn normalize_formats(formats: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(formats.len());
    for format in formats {
        let format = format.trim().to_ascii_lowercase();
        if !normalized.contains(&format) {
            normalized.push(format);
        }
    }
    normalized
}

impl Validate for AnalysisConfig {
    fn validate(&self) -> Result<()> {
        let input = validation::validate_required_field("source.path", &self.input_path)?;
        validation::validate_path("source.path", input)?;
        validation::validate_file_extensions("source.path", std::slice::from_ref(input), &["csv", "xlsx"])?;
        validation::validate_path("load.output_path", &self.output_path)?;
        validation::validate_non_empty_string("source.material_column", &self.material_column)?;
        validation::validate_non_empty_string("source.price_column", &self.price_column)?;
        validation::validate_range(
            "analysis.price_target_year",
            self.price_target_year,
            MIN_TARGET_YEAR,
            MAX_TARGET_YEAR,
        )?;
        validation::validate_range(
            "analysis.replenishment_target_year",
            self.replenishment_target_year,
            MIN_TARGET_YEAR,
            MAX_TARGET_YEAR,
        )?;
        if let Some(material) = &self.material {
            validation::validate_non_empty_string("analysis.material", material)?;
        }
        validation::validate_output_formats("load.output_formats", &self.output_formats)?;
        if let Some(name) = &self.archive_name {
            validation::validate_path("load.compression.filename", name)?;
        }
        Ok(())
    }
}

impl ConfigProvider for AnalysisConfig {
    fn input_path(&self) -> &str {
        self.input_path.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn material_column(&self) -> &str {
        &self.material_column
    }

    fn price_column(&self) -> &str {
        &self.price_column
    }

    fn price_target_year(&self) -> i32 {
        self.price_target_year
    }

    fn replenishment_target_year(&self) -> i32 {
        self.replenishment_target_year
    }

    fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    fn inflation(&self) -> &InflationTable {
        &self.inflation
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn compression_filename(&self) -> Option<&str> {
        self.archive_name.as_deref()
    }

    fn analysis_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::AnalysisError;

    fn config_with_input(input: &str) -> AnalysisConfig {
        AnalysisConfig {
            input_path: Some(input.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_validates_with_input() {
        assert!(config_with_input("stock.xlsx").validate().is_ok());
    }

    #[test]
    fn test_missing_input_is_reported() {
        let err = AnalysisConfig::default().validate().unwrap_err();
        assert!(matches!(err, AnalysisError::MissingConfigError { .. }));
    }

    #[test]
    fn test_rejects_unsupported_input() {
        assert!(config_with_input("stock.ods").validate().is_err());
    }

    #[test]
    fn test_rejects_target_year_out_of_range() {
        let mut config = config_with_input("stock.csv");
        config.price_target_year = 2101;
        assert!(config.validate().is_err());

        let mut config = config_with_input("stock.csv");
        config.replenishment_target_year = 2022;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_disables_compression() {
        let toml = TomlConfig::from_toml_str(
            "[source]\npath = \"a.csv\"\n[load]\noutput_path = \"out\"\n[load.compression]\nenabled = false\n",
        )
        .unwrap();
        let config = AnalysisConfig::from_toml(&toml).unwrap();
        assert_eq!(config.input_path.as_deref(), Some("a.csv"));
        assert_eq!(config.output_path, "out");
        assert!(config.compression_filename().is_none());
        assert_eq!(config.price_target_year, DEFAULT_PRICE_TARGET_YEAR);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_overrides_toml() {
        let toml = TomlConfig::from_toml_str(
            "[analysis]\nprice_target_year = 2030\n[source]\npath = \"a.csv\"\n",
        )
        .unwrap();
        let mut config = AnalysisConfig::from_toml(&toml).unwrap();

        let cli = CliConfig::parse_from([
            "oem-inventory",
            "--input",
            "b.xlsx",
            "--price-target-year",
            "2035",
            "--formats",
            "CSV,tsv",
            "--no-compress",
        ]);
        config.apply_cli(&cli);

        assert_eq!(config.input_path.as_deref(), Some("b.xlsx"));
        assert_eq!(config.price_target_year, 2035);
        assert_eq!(config.replenishment_target_year, DEFAULT_REPLENISHMENT_TARGET_YEAR);
        assert_eq!(config.output_formats, vec!["csv", "tsv"]);
        assert!(config.archive_name.is_none());
    }

    #[test]
    fn test_toml_formats_are_normalized() {
        let toml = TomlConfig::from_toml_str(
            "[source]\npath = \"a.csv\"\n[load]\noutput_formats = [\"CSV\", \" Json \", \"csv\"]\n",
        )
        .unwrap();
        let config = AnalysisConfig::from_toml(&toml).unwrap();
        assert_eq!(config.output_formats, vec!["csv", "json"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_formats_are_collapsed() {
        let formats = vec!["csv".to_string(), "TSV".to_string(), "csv ".to_string()];
        assert_eq!(normalize_formats(&formats), vec!["csv", "tsv"]);
    }

    #[test]
    fn test_duplicate_formats_fail_validation() {
        let mut config = config_with_input("stock.csv");
        config.output_formats = vec!["csv".to_string(), "csv".to_string()];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_analysis_name_from_toml() {
        let toml = TomlConfig::from_toml_str("[analysis]\nname = \" plant-a \"\n").unwrap();
        let config = AnalysisConfig::from_toml(&toml).unwrap();
        assert_eq!(config.analysis_name(), Some("plant-a"));

        let toml = TomlConfig::from_toml_str("[analysis]\nname = \"  \"\n").unwrap();
        assert!(AnalysisConfig::from_toml(&toml).unwrap().name.is_none());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_formats_are_deduplicated() {
        let mut config = config_with_input("stock.csv");
        let cli = CliConfig::parse_from(["oem-inventory", "--formats", "csv,CSV,json"]);
        config.apply_cli(&cli);
        assert_eq!(config.output_formats, vec!["csv", "json"]);
        assert!(config.validate().is_ok());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_missing_config_file_exits_critical() {
        let cli = CliConfig::parse_from([
            "oem-inventory",
            "--config",
            "/nonexistent/oem-inventory/config.toml",
        ]);
        let err = AnalysisConfig::resolve(&cli).unwrap_err();
        assert!(matches!(err, AnalysisError::IoError(_)));
        assert_eq!(err.severity(), crate::utils::error::ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_invalid_config_file_exits_high() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[analysis\nname = 1").unwrap();
        let cli = CliConfig::parse_from(["oem-inventory", "--config", path.to_str().unwrap()]);
        let err = AnalysisConfig::resolve(&cli).unwrap_err();
        assert!(matches!(err, AnalysisError::ConfigValidationError { .. }));
        assert_eq!(err.exit_code(), 1);
    }
}
