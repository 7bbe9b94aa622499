use crate::core::inflation::InflationTable;
use crate::utils::error::{AnalysisError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub source: SourceSection,
    pub inflation: Option<InflationSection>,
    #[serde(default)]
    pub load: LoadSection,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub name: Option<String>,
    pub price_target_year: Option<i32>,
    pub replenishment_target_year: Option<i32>,
    pub material: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSection {
    pub path: Option<String>,
    pub material_column: Option<String>,
    pub price_column: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InflationSection {
    pub default_rate: Option<f64>,
    /// Keyed by year, e.g. `"2028" = 4.1`.
    pub rates: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadSection {
    pub output_path: Option<String>,
    pub output_formats: Option<Vec<String>>,
    pub compression: Option<CompressionSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionSection {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalysisError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AnalysisError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AnalysisError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Builds the inflation table: defaults overlaid with configured rates.
    pub fn inflation_table(&self) -> Result<InflationTable> {
        let mut table = InflationTable::default();
        let Some(section) = &self.inflation else {
            return Ok(table);
        };

        if let Some(default_rate) = section.default_rate {
            table = table.with_default_rate(default_rate);
        }

        if let Some(rates) = &section.rates {
            let mut parsed = Vec::with_capacity(rates.len());
            for (year, rate) in rates {
                let year: i32 = year.trim().parse().map_err(|_| {
                    AnalysisError::InvalidConfigValueError {
                        field: "inflation.rates".to_string(),
                        value: year.clone(),
                        reason: "Rate keys must be four digit years".to_string(),
                    }
                })?;
                if !rate.is_finite() {
                    return Err(AnalysisError::InvalidConfigValueError {
                        field: format!("inflation.rates.{}", year),
                        value: rate.to_string(),
                        reason: "Rate must be a finite percentage".to_string(),
                    });
                }
                parsed.push((year, *rate));
            }
            table = table.with_overrides(parsed);
        }

        Ok(table)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}
