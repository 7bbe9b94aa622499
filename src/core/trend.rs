use crate::domain::model::{MaterialHistory, MaterialTrend, TrendDirection, YearTrend};
use std::collections::BTreeMap;

const FLAT_SLOPE: f64 = 1e-9;

pub fn yearly_trend(histories: &[MaterialHistory]) -> Vec<YearTrend> {
    let mut by_year: BTreeMap<i32, YearTrend> = BTreeMap::new();

    for history in histories {
        for usage in &history.usage {
            let entry = by_year.entry(usage.year).or_insert_with(|| YearTrend {
                year: usage.year,
                materials_used: 0,
                total_units: 0.0,
                total_spend: 0.0,
            });
            entry.materials_used += 1;
            entry.total_units += usage.units;
            entry.total_spend += usage.total;
        }
    }

    by_year.into_values().collect()
}

pub fn material_trends(histories: &[MaterialHistory]) -> Vec<MaterialTrend> {
    histories
        .iter()
        .filter_map(|history| {
            let first = history.usage.first()?;
            let last = history.usage.last()?;
            let total_units: f64 = history.usage.iter().map(|u| u.units).sum();
            let total_spend: f64 = history.usage.iter().map(|u| u.total).sum();
            let slope = usage_slope(history);

            Some(MaterialTrend {
                material: history.material.clone(),
                first_year: first.year,
                last_year: last.year,
                active_years: history.usage.len(),
                total_units,
                total_spend,
                average_units: total_units / history.usage.len() as f64,
                slope,
                direction: direction_of(slope),
            })
        })
        .collect()
}

/// Least-squares slope of units against year.
fn usage_slope(history: &MaterialHistory) -> Option<f64> {
    if history.usage.len() < 2 {
        return None;
    }

    let n = history.usage.len() as f64;
    let mean_year = history.usage.iter().map(|u| u.year as f64).sum::<f64>() / n;
    let mean_units = history.usage.iter().map(|u| u.units).sum::<f64>() / n;

    let (covariance, variance) = history.usage.iter().fold((0.0, 0.0), |(cov, var), u| {
        let dx = u.year as f64 - mean_year;
        (cov + dx * (u.units - mean_units), var + dx * dx)
    });

    if variance == 0.0 {
        None
    } else {
        Some(covariance / variance)
    }
}

fn direction_of(slope: Option<f64>) -> TrendDirection {
    match slope {
        None => TrendDirection::Insufficient,
        Some(s) if s.abs() < FLAT_SLOPE => TrendDirection::Flat,
        Some(s) if s > 0.0 => TrendDirection::Increasing,
        Some(_) => TrendDirection::Decreasing,
    }
}
