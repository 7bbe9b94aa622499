use crate::domain::model::{CleaningSummary, InventoryTable, MaterialHistory, YearColumn, YearUsage};
use crate::utils::error::{AnalysisError, Result};
use calamine::{open_workbook_from_rs, Reader, Xlsx};
use regex::Regex;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

pub const DEFAULT_MATERIAL_COLUMN: &str = "Material Discription";
pub const DEFAULT_PRICE_COLUMN: &str = "Unit Price";

static YEAR_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{4}|FY\d{2})$").expect("year header pattern"));
static YEAR_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2,4}").expect("year digits pattern"));

#[derive(Debug, Clone)]
pub struct CleanedInventory {
    pub year_columns: Vec<YearColumn>,
    pub histories: Vec<MaterialHistory>,
    pub summary: CleaningSummary,
}

/// Parses an uploaded inventory file. The format is chosen from the file
/// extension of `source_name`.
pub fn read_table(source_name: &str, bytes: &[u8]) -> Result<InventoryTable> {
    let extension = Path::new(source_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => read_csv(source_name, bytes),
        Some("xlsx") => read_xlsx(source_name, bytes),
        _ => Err(AnalysisError::UnsupportedFormat {
            path: source_name.to_string(),
        }),
    }
}

fn read_csv(source_name: &str, bytes: &[u8]) -> Result<InventoryTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = clean_headers(reader.headers()?.iter().map(str::to_string));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    tracing::debug!("📄 Read {} CSV rows from {}", rows.len(), source_name);
    Ok(InventoryTable {
        source_name: source_name.to_string(),
        headers,
        rows,
    })
}

fn read_xlsx(source_name: &str, bytes: &[u8]) -> Result<InventoryTable> {
    let mut workbook: Xlsx<Cursor<Vec<u8>>> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Ok(InventoryTable {
            source_name: source_name.to_string(),
            ..Default::default()
        });
    };
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut sheet_rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect::<Vec<_>>());

    let headers = clean_headers(sheet_rows.next().unwrap_or_default());
    let rows: Vec<Vec<String>> = sheet_rows
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    tracing::debug!(
        "📄 Read {} rows from sheet '{}' of {}",
        rows.len(),
        sheet_name,
        source_name
    );
    Ok(InventoryTable {
        source_name: source_name.to_string(),
        headers,
        rows,
    })
}

fn clean_headers(headers: impl IntoIterator<Item = String>) -> Vec<String> {
    headers
        .into_iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect()
}

/// Resolves a year header to a calendar year. Two digit years below 50 are
/// taken as 20xx, the rest as 19xx.
pub fn convert_to_year(header: &str) -> Option<i32> {
    let digits = YEAR_DIGITS.find(header)?.as_str();
    let value: i32 = digits.parse().ok()?;
    if digits.len() == 2 {
        Some(if value < 50 { 2000 + value } else { 1900 + value })
    } else {
        Some(value)
    }
}

pub fn detect_year_columns(headers: &[String]) -> Vec<YearColumn> {
    let mut columns: Vec<YearColumn> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| YEAR_HEADER.is_match(header.trim()))
        .filter_map(|(index, header)| {
            convert_to_year(header).map(|year| YearColumn {
                header: header.clone(),
                index,
                year,
            })
        })
        .collect();
    columns.sort_by_key(|column| column.year);
    columns
}

/// Lenient numeric parsing for spreadsheet cells: whitespace, thousands
/// separators and a leading rupee sign are accepted.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn clean(
    table: &InventoryTable,
    material_column: &str,
    price_column: &str,
) -> Result<CleanedInventory> {
    let material_idx = table.column_index(material_column);
    let price_idx = table.column_index(price_column);

    let (material_idx, price_idx) = match (material_idx, price_idx) {
        (Some(m), Some(p)) => (m, p),
        (m, p) => {
            let mut columns = Vec::new();
            if m.is_none() {
                columns.push(material_column.to_string());
            }
            if p.is_none() {
                columns.push(price_column.to_string());
            }
            return Err(AnalysisError::MissingColumns { columns });
        }
    };

    let year_columns = detect_year_columns(&table.headers);
    if year_columns.is_empty() {
        return Err(AnalysisError::NoYearColumns);
    }

    let mut years: Vec<i32> = year_columns.iter().map(|c| c.year).collect();
    years.dedup();

    let mut summary = CleaningSummary {
        years,
        ..Default::default()
    };
    let mut histories = Vec::new();

    for row in &table.rows {
        summary.rows_read += 1;
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");

        let material = cell(material_idx).trim();
        if material.is_empty() {
            summary.dropped_missing_material += 1;
            continue;
        }

        let Some(unit_price) = parse_number(cell(price_idx)).filter(|p| *p > 0.0) else {
            tracing::debug!("Dropping '{}': invalid unit price '{}'", material, cell(price_idx));
            summary.dropped_invalid_price += 1;
            continue;
        };

        // 同一年份的多個欄位 (如 2021 與 FY21) 數量相加
        let mut units_by_year: BTreeMap<i32, f64> = BTreeMap::new();
        for column in &year_columns {
            if let Some(units) = parse_number(cell(column.index)).filter(|q| *q > 0.0) {
                *units_by_year.entry(column.year).or_insert(0.0) += units;
            }
        }

        if units_by_year.is_empty() {
            summary.dropped_no_usage += 1;
            continue;
        }

        histories.push(MaterialHistory {
            material: material.to_string(),
            unit_price,
            usage: units_by_year
                .into_iter()
                .map(|(year, units)| YearUsage {
                    year,
                    units,
                    total: unit_price * units,
                })
                .collect(),
        });
    }

    summary.materials_kept = histories.len();
    if histories.is_empty() {
        return Err(AnalysisError::EmptyDataset {
            source_name: table.source_name.clone(),
        });
    }

    tracing::info!(
        "🧹 Cleaned {} rows: kept {}, dropped {} (no material), {} (invalid price), {} (no usage)",
        summary.rows_read,
        summary.materials_kept,
        summary.dropped_missing_material,
        summary.dropped_invalid_price,
        summary.dropped_no_usage
    );

    Ok(CleanedInventory {
        year_columns,
        histories,
        summary,
    })
}
