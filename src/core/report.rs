use crate::core::lifecycle::events_per_year;
use crate::domain::model::AnalysisReport;
use std::fmt::Write as _;

const BAR_WIDTH: usize = 40;

/// Formats an amount the way Indian finance reports do: plain with thousands
/// separators below one lakh, then in lakh, then in crore.
pub fn format_indian_number(num: f64) -> String {
    if num.is_nan() {
        return "-".to_string();
    }
    let abs = num.abs();
    if abs < 100_000.0 {
        group_thousands(num)
    } else if abs < 10_000_000.0 {
        format!("{:.2} Lakh", num / 100_000.0)
    } else {
        format!("{:.2} Crore", num / 10_000_000.0)
    }
}

fn group_thousands(num: f64) -> String {
    let fixed = format!("{:.2}", num.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if num < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, grouped, frac_part)
}

/// Renders rows as a pipe table with a header separator.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let num_cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(3)).collect();
    for row in rows {
        for (i, cell) in row.iter().take(num_cols).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let mut push_row = |cells: &[String]| {
        output.push('|');
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let _ = write!(output, " {:width$} |", cell, width = width);
        }
        output.push('\n');
    };

    push_row(headers);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(separator.as_slice());
    for row in rows {
        push_row(row.as_slice());
    }
    output
}

pub fn usage_history_table(report: &AnalysisReport) -> String {
    let mut headers = vec!["Material".to_string(), "Unit Price".to_string()];
    for year in &report.cleaning.years {
        headers.push(format!("{} Units", year));
        headers.push(format!("{} Total", year));
    }

    let rows: Vec<Vec<String>> = report
        .histories
        .iter()
        .map(|history| {
            let mut row = vec![
                history.material.clone(),
                format_indian_number(history.unit_price),
            ];
            for year in &report.cleaning.years {
                match history.usage_in(*year) {
                    Some(usage) => {
                        row.push(format_indian_number(usage.units));
                        row.push(format_indian_number(usage.total));
                    }
                    None => {
                        row.push("-".to_string());
                        row.push("-".to_string());
                    }
                }
            }
            row
        })
        .collect();

    render_table(&headers, &rows)
}

pub fn forecast_table(report: &AnalysisReport) -> String {
    let headers: Vec<String> = [
        "Material",
        "Unit Price",
        "Last Usage",
        "Target Year",
        "Factor",
        "Predicted Price",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let rows: Vec<Vec<String>> = report
        .forecasts
        .iter()
        .map(|f| {
            vec![
                f.material.clone(),
                format_indian_number(f.base_price),
                f.last_year.to_string(),
                f.target_year.to_string(),
                format!("{:.4}", f.factor),
                format!("₹{}", format_indian_number(f.predicted_price)),
            ]
        })
        .collect();
    render_table(&headers, &rows)
}

pub fn replenishment_table(report: &AnalysisReport) -> String {
    let headers: Vec<String> = [
        "Inventory",
        "Last Usage",
        "Replenishment Year",
        "Lifetime (years)",
        "Years From Last Usage",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let rows: Vec<Vec<String>> = report
        .replenishments
        .iter()
        .map(|e| {
            vec![
                e.material.clone(),
                e.last_usage.to_string(),
                e.replenishment_year.to_string(),
                e.lifetime.to_string(),
                e.years_from_last_usage.to_string(),
            ]
        })
        .collect();
    render_table(&headers, &rows)
}

/// Horizontal text bar chart of replenishment events per year.
pub fn replenishment_chart(report: &AnalysisReport) -> String {
    let counts = events_per_year(&report.replenishments);
    let max = counts.values().copied().max().unwrap_or(0);
    if max == 0 {
        return String::new();
    }

    let mut chart = String::from("Replenishment Events by Year\n");
    for (year, count) in &counts {
        let bar_len = (count * BAR_WIDTH).div_ceil(max);
        let _ = writeln!(chart, "{} | {} {}", year, "█".repeat(bar_len), count);
    }
    chart
}

pub fn replenishment_message(report: &AnalysisReport) -> String {
    if report.replenishments.is_empty() {
        "No replenishment predicted for any inventory by the target year".to_string()
    } else {
        format!(
            "Found {} replenishment events by {}",
            report.replenishments.len(),
            report.replenishment_target_year
        )
    }
}

pub fn footer(report: &AnalysisReport) -> String {
    let title = match &report.analysis_name {
        Some(name) => format!("OEM Inventory Analysis System ({})", name),
        None => "OEM Inventory Analysis System".to_string(),
    };
    format!(
        "{} • Data from: {}\nAnalysis completed on {}\n",
        title,
        report.source_name,
        report.generated_on.format("%d-%m-%Y")
    )
}

/// Full console report, section by section.
pub fn render_console(report: &AnalysisReport) -> String {
    let mut out = String::new();

    let years: Vec<String> = report.cleaning.years.iter().map(|y| y.to_string()).collect();
    let _ = writeln!(out, "Detected year columns: {}\n", years.join(", "));

    let _ = writeln!(out, "🔮 Price Prediction (target {})", report.price_target_year);
    if report.forecasts.is_empty() {
        let _ = writeln!(out, "No material has usage before {}", report.price_target_year);
    } else {
        out.push_str(&forecast_table(report));
    }
    for skipped in &report.skipped_forecasts {
        let _ = writeln!(out, "  skipped {}: {}", skipped.material, skipped.reason);
    }
    out.push('\n');

    let _ = writeln!(out, "⏳ Replenishment Prediction (target {})", report.replenishment_target_year);
    let _ = writeln!(out, "{}", replenishment_message(report));
    if !report.replenishments.is_empty() {
        out.push_str(&replenishment_table(report));
        out.push('\n');
        out.push_str(&replenishment_chart(report));
    }
    out.push('\n');

    out.push_str("📋 Inventory Usage History\n");
    out.push_str(&usage_history_table(report));
    out.push('\n');

    out.push_str(&footer(report));
    out
}
