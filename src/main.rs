use anyhow::Context;
use clap::Parser;
use oem_inventory::core::{ingest, report, InventoryTable};
use oem_inventory::utils::error::AnalysisError;
use oem_inventory::utils::{logger, validation::Validate};
use oem_inventory::{AnalysisConfig, AnalysisEngine, CliConfig, InventoryPipeline, LocalStorage};
use std::io::Write;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting OEM inventory analysis");

    let config = AnalysisConfig::resolve(&cli).unwrap_or_else(|e| exit_with(&e));
    if let Some(name) = &config.name {
        tracing::info!("📋 Analysis: {}", name);
    }

    if cli.verbose {
        tracing::debug!("Analysis config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 創建存儲和管道
    let source = LocalStorage::new(".".to_string());
    let sink = LocalStorage::new(config.output_path.clone());
    let monitor_enabled = config.monitor;
    let material_column = config.material_column.clone();
    let price_column = config.price_column.clone();
    let pipeline = InventoryPipeline::new(source, sink, config);
    let engine = AnalysisEngine::new_with_monitoring(pipeline, monitor_enabled);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No analysis or output will be produced");
        match engine.inspect().await {
            Ok(table) => print_dry_run(&table, &material_column, &price_column),
            Err(e) => exit_with(&e),
        }
        return Ok(());
    }

    match engine.run().await {
        Ok(outcome) => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", report::render_console(&outcome.report))
                .and_then(|_| writeln!(stdout, "✅ Analysis completed successfully!"))
                .and_then(|_| writeln!(stdout, "📁 Output saved to: {}", outcome.output_path))
                .context("Failed to write the report to stdout")?;
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &AnalysisError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code())
}

fn print_dry_run(table: &InventoryTable, material_column: &str, price_column: &str) {
    println!("🔍 Dry Run Analysis:");
    println!("  Source: {}", table.source_name);
    println!("  Rows: {}", table.rows.len());
    println!("  Columns: {}", table.headers.join(", "));

    for required in [material_column, price_column] {
        let status = if table.column_index(required).is_some() {
            "✅"
        } else {
            "❌ missing"
        };
        println!("  Required column '{}': {}", required, status);
    }

    let years = ingest::detect_year_columns(&table.headers);
    if years.is_empty() {
        println!("  ❌ No year columns found in the data (e.g., 2021, FY21)");
    } else {
        let detected: Vec<String> = years
            .iter()
            .map(|c| format!("{} ({})", c.header, c.year))
            .collect();
        println!("  Detected year columns: {}", detected.join(", "));
    }
}
