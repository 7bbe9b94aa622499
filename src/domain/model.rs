use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw tabular input as read from a CSV file or the first XLSX worksheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryTable {
    pub source_name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl InventoryTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearColumn {
    pub header: String,
    pub index: usize,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearUsage {
    pub year: i32,
    pub units: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialHistory {
    pub material: String,
    pub unit_price: f64,
    /// Ascending by year, one entry per year, units always positive.
    pub usage: Vec<YearUsage>,
}

impl MaterialHistory {
    pub fn historical_years(&self) -> Vec<i32> {
        self.usage.iter().map(|u| u.year).collect()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.usage.last().map(|u| u.year)
    }

    pub fn usage_in(&self, year: i32) -> Option<&YearUsage> {
        self.usage.iter().find(|u| u.year == year)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_read: usize,
    pub dropped_missing_material: usize,
    pub dropped_invalid_price: usize,
    pub dropped_no_usage: usize,
    pub materials_kept: usize,
    pub years: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceForecast {
    pub material: String,
    pub base_price: f64,
    pub last_year: i32,
    pub target_year: i32,
    pub factor: f64,
    pub predicted_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedForecast {
    pub material: String,
    pub last_year: i32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentEvent {
    pub material: String,
    pub last_usage: i32,
    pub replenishment_year: i32,
    pub lifetime: i32,
    pub years_from_last_usage: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTrend {
    pub year: i32,
    pub materials_used: usize,
    pub total_units: f64,
    pub total_spend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
    Insufficient,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Flat => "flat",
            TrendDirection::Insufficient => "insufficient data",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialTrend {
    pub material: String,
    pub first_year: i32,
    pub last_year: i32,
    pub active_years: usize,
    pub total_units: f64,
    pub total_spend: f64,
    pub average_units: f64,
    pub slope: Option<f64>,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub analysis_name: Option<String>,
    pub source_name: String,
    pub generated_on: NaiveDate,
    pub cleaning: CleaningSummary,
    pub histories: Vec<MaterialHistory>,
    pub price_target_year: i32,
    pub forecasts: Vec<PriceForecast>,
    pub skipped_forecasts: Vec<SkippedForecast>,
    pub replenishment_target_year: i32,
    pub replenishments: Vec<ReplenishmentEvent>,
    pub yearly_trend: Vec<YearTrend>,
    pub material_trends: Vec<MaterialTrend>,
}
