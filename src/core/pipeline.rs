use crate::core::inflation::forecast_price;
use crate::core::{ingest, lifecycle, trend};
use crate::core::{AnalysisReport, ConfigProvider, InventoryTable, Pipeline, Storage};
use crate::domain::model::{MaterialHistory, PriceForecast, SkippedForecast};
use crate::utils::error::{AnalysisError, Result};
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

const REPORT_JSON: &str = "analysis_report.json";

/// Reads the inventory file from `source` and writes exports to `sink`.
pub struct InventoryPipeline<S: Storage, C: ConfigProvider> {
    source: S,
    sink: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> InventoryPipeline<S, C> {
    pub fn new(source: S, sink: S, config: C) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }

    fn forecast(
        &self,
        histories: &[MaterialHistory],
    ) -> Result<(Vec<PriceForecast>, Vec<SkippedForecast>)> {
        let target_year = self.config.price_target_year();
        let table = self.config.inflation();

        // 指定單一物料時，找不到或目標年份無效皆視為錯誤
        if let Some(material) = self.config.material() {
            let wanted = material.trim();
            let history = histories
                .iter()
                .find(|h| h.material.eq_ignore_ascii_case(wanted))
                .ok_or_else(|| AnalysisError::MaterialNotFound {
                    material: wanted.to_string(),
                })?;
            return Ok((vec![forecast_price(history, target_year, table)?], Vec::new()));
        }

        let mut forecasts = Vec::new();
        let mut skipped = Vec::new();
        for history in histories {
            match forecast_price(history, target_year, table) {
                Ok(forecast) => forecasts.push(forecast),
                Err(AnalysisError::ForecastError { message }) => {
                    tracing::debug!("Skipping forecast for '{}': {}", history.material, message);
                    skipped.push(SkippedForecast {
                        material: history.material.clone(),
                        last_year: history.last_year().unwrap_or_default(),
                        reason: message,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok((forecasts, skipped))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for InventoryPipeline<S, C> {
    async fn extract(&self) -> Result<InventoryTable> {
        let input_path = self.config.input_path();
        tracing::debug!("Reading inventory data from: {}", input_path);

        let data = self.source.read_file(input_path).await?;
        let source_name = Path::new(input_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(input_path);

        ingest::read_table(source_name, &data)
    }

    async fn transform(&self, table: InventoryTable) -> Result<AnalysisReport> {
        let cleaned = ingest::clean(
            &table,
            self.config.material_column(),
            self.config.price_column(),
        )?;
        let years: Vec<String> = cleaned
            .year_columns
            .iter()
            .map(|c| c.header.clone())
            .collect();
        tracing::info!("📅 Detected year columns: {}", years.join(", "));

        let (forecasts, skipped_forecasts) = self.forecast(&cleaned.histories)?;
        if !skipped_forecasts.is_empty() {
            tracing::warn!(
                "⚠️ {} materials have usage in or after {}, no price forecast",
                skipped_forecasts.len(),
                self.config.price_target_year()
            );
        }

        let replenishment_target_year = self.config.replenishment_target_year();
        let replenishments =
            lifecycle::replenishment_schedule(&cleaned.histories, replenishment_target_year);

        Ok(AnalysisReport {
            analysis_name: self.config.analysis_name().map(str::to_string),
            source_name: table.source_name,
            generated_on: chrono::Local::now().date_naive(),
            price_target_year: self.config.price_target_year(),
            forecasts,
            skipped_forecasts,
            replenishment_target_year,
            replenishments,
            yearly_trend: trend::yearly_trend(&cleaned.histories),
            material_trends: trend::material_trends(&cleaned.histories),
            cleaning: cleaned.summary,
            histories: cleaned.histories,
        })
    }

    async fn load(&self, report: &AnalysisReport) -> Result<String> {
        let mut files: Vec<(String, Vec<u8>)> = Vec::new();
        let mut written: Vec<&str> = Vec::new();

        for format in self.config.output_formats() {
            // 同一格式只輸出一次
            if written.contains(&format.as_str()) {
                tracing::debug!("Skipping repeated output format {}", format);
                continue;
            }
            written.push(format.as_str());
            match format.as_str() {
                "csv" => files.extend(export_tables(report, b',', "csv")?),
                "tsv" => files.extend(export_tables(report, b'\t', "tsv")?),
                "json" => files.push((
                    REPORT_JSON.to_string(),
                    serde_json::to_vec_pretty(report)?,
                )),
                other => {
                    return Err(AnalysisError::InvalidConfigValueError {
                        field: "load.output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format".to_string(),
                    })
                }
            }
        }

        let Some(archive_name) = self.config.compression_filename() else {
            for (name, data) in &files {
                tracing::debug!("Writing {} ({} bytes)", name, data.len());
                self.sink.write_file(name, data).await?;
            }
            return Ok(self.config.output_path().to_string());
        };

        tracing::debug!("Creating ZIP file with {} files", files.len());

        // 創建ZIP文件
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in &files {
                zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                zip.write_all(data)?;
            }
            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.sink.write_file(archive_name, &zip_data).await?;

        Ok(self.sink.locate(archive_name))
    }
}

type Table = (&'static str, Vec<String>, Vec<Vec<String>>);

fn export_tables(
    report: &AnalysisReport,
    delimiter: u8,
    extension: &str,
) -> Result<Vec<(String, Vec<u8>)>> {
    [
        usage_history_rows(report),
        forecast_rows(report),
        replenishment_rows(report),
        yearly_trend_rows(report),
        material_trend_rows(report),
    ]
    .into_iter()
    .map(|(stem, headers, rows)| -> Result<(String, Vec<u8>)> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        writer.write_record(&headers)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| AnalysisError::IoError(e.into_error()))?;
        Ok((format!("{}.{}", stem, extension), data))
    })
    .collect()
}

fn strings<const N: usize>(headers: [&str; N]) -> Vec<String> {
    headers.iter().map(|s| s.to_string()).collect()
}

fn usage_history_rows(report: &AnalysisReport) -> Table {
    let mut headers = strings(["Material", "Unit Price"]);
    for year in &report.cleaning.years {
        headers.push(format!("{} Units", year));
        headers.push(format!("{} Total", year));
    }

    let rows = report
        .histories
        .iter()
        .map(|history| {
            let mut row = vec![history.material.clone(), history.unit_price.to_string()];
            for year in &report.cleaning.years {
                match history.usage_in(*year) {
                    Some(usage) => {
                        row.push(usage.units.to_string());
                        row.push(usage.total.to_string());
                    }
                    None => row.extend([String::new(), String::new()]),
                }
            }
            row
        })
        .collect();

    ("usage_history", headers, rows)
}

fn forecast_rows(report: &AnalysisReport) -> Table {
    let headers = strings([
        "Material",
        "Unit Price",
        "Last Usage",
        "Target Year",
        "Inflation Factor",
        "Predicted Unit Price",
    ]);
    let rows = report
        .forecasts
        .iter()
        .map(|f| {
            vec![
                f.material.clone(),
                f.base_price.to_string(),
                f.last_year.to_string(),
                f.target_year.to_string(),
                format!("{:.6}", f.factor),
                format!("{:.2}", f.predicted_price),
            ]
        })
        .collect();
    ("price_forecasts", headers, rows)
}

fn replenishment_rows(report: &AnalysisReport) -> Table {
    let headers = strings([
        "Inventory",
        "Last Usage",
        "Replenishment Year",
        "Lifetime (years)",
        "Years From Last Usage",
    ]);
    let rows = report
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
    ("replenishments", headers, rows)
}

fn yearly_trend_rows(report: &AnalysisReport) -> Table {
    let headers = strings(["Year", "Materials Used", "Total Units", "Total Spend"]);
    let rows = report
        .yearly_trend
        .iter()
        .map(|t| {
            vec![
                t.year.to_string(),
                t.materials_used.to_string(),
                t.total_units.to_string(),
                format!("{:.2}", t.total_spend),
            ]
        })
        .collect();
    ("yearly_trend", headers, rows)
}

fn material_trend_rows(report: &AnalysisReport) -> Table {
    let headers = strings([
        "Material",
        "First Year",
        "Last Year",
        "Active Years",
        "Total Units",
        "Total Spend",
        "Average Units",
        "Slope",
        "Direction",
    ]);
    let rows = report
        .material_trends
        .iter()
        .map(|t| {
            vec![
                t.material.clone(),
                t.first_year.to_string(),
                t.last_year.to_string(),
                t.active_years.to_string(),
                t.total_units.to_string(),
                format!("{:.2}", t.total_spend),
                format!("{:.2}", t.average_units),
                t.slope.map(|s| format!("{:.4}", s)).unwrap_or_default(),
                t.direction.to_string(),
            ]
        })
        .collect();
    ("material_trends", headers, rows)
}
