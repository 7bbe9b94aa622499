use crate::domain::model::{MaterialHistory, PriceForecast};
use crate::utils::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_INFLATION_RATE: f64 = 4.5;
pub const MIN_TARGET_YEAR: i32 = 2023;
pub const MAX_TARGET_YEAR: i32 = 2100;

const DEFAULT_RATES: [(i32, f64); 7] = [
    (2021, 5.1),
    (2022, 6.7),
    (2023, 5.7),
    (2024, 4.9),
    (2025, 3.16),
    (2026, 4.5),
    (2027, 4.5),
];

/// Annual inflation rates in percent, keyed by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InflationTable {
    rates: BTreeMap<i32, f64>,
    default_rate: f64,
}

impl Default for InflationTable {
    fn default() -> Self {
        Self {
            rates: DEFAULT_RATES.into_iter().collect(),
            default_rate: DEFAULT_INFLATION_RATE,
        }
    }
}

impl InflationTable {
    pub fn new(rates: BTreeMap<i32, f64>, default_rate: f64) -> Self {
        Self {
            rates,
            default_rate,
        }
    }

    /// Overlays `rates` on top of the current table.
    pub fn with_overrides(mut self, rates: impl IntoIterator<Item = (i32, f64)>) -> Self {
        self.rates.extend(rates);
        self
    }

    pub fn with_default_rate(mut self, default_rate: f64) -> Self {
        self.default_rate = default_rate;
        self
    }

    pub fn rate(&self, year: i32) -> f64 {
        self.rates.get(&year).copied().unwrap_or(self.default_rate)
    }

    pub fn default_rate(&self) -> f64 {
        self.default_rate
    }

    pub fn rates(&self) -> &BTreeMap<i32, f64> {
        &self.rates
    }

    /// Compounded price multiplier from `base_year` to `target_year`.
    ///
    /// The base year's own rate is not applied; every year after it up to and
    /// including the target contributes `1 + rate / 100`.
    pub fn factor(&self, base_year: i32, target_year: i32) -> f64 {
        ((base_year + 1)..=target_year).fold(1.0, |factor, year| {
            factor * (1.0 + self.rate(year) / 100.0)
        })
    }
}

pub fn forecast_price(
    history: &MaterialHistory,
    target_year: i32,
    table: &InflationTable,
) -> Result<PriceForecast> {
    let last_year = history
        .last_year()
        .ok_or_else(|| AnalysisError::ProcessingError {
            message: format!("'{}' has no usage history", history.material),
        })?;

    if target_year <= last_year {
        return Err(AnalysisError::ForecastError {
            message: format!(
                "Target year must be after last historical year ({} for '{}')",
                last_year, history.material
            ),
        });
    }

    let factor = table.factor(last_year, target_year);
    Ok(PriceForecast {
        material: history.material.clone(),
        base_price: history.unit_price,
        last_year,
        target_year,
        factor,
        predicted_price: history.unit_price * factor,
    })
}
