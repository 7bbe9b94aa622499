use oem_inventory::core::ingest;
use oem_inventory::{AnalysisConfig, AnalysisEngine, InventoryPipeline, LocalStorage};
use std::io::{Cursor, Write};
use tempfile::TempDir;
use zip::write::{FileOptions, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Stock" sheetId="1" r:id="rId1"/><sheet name="Notes" sheetId="2" r:id="rId2"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/></Relationships>"#;

// 第三列刻意留空，年份標題 2021 與 2023 為數值儲存格
const STOCK_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Material Discription</t></is></c><c r="B1" t="inlineStr"><is><t> Unit Price </t></is></c><c r="C1"><v>2021</v></c><c r="D1" t="inlineStr"><is><t>FY22</t></is></c><c r="E1"><v>2023</v></c></row>
<row r="2"><c r="A2" t="inlineStr"><is><t>Hydraulic Pump</t></is></c><c r="B2"><v>12500</v></c><c r="C2"><v>2</v></c><c r="E2"><v>1</v></c></row>
<row r="4"><c r="A4" t="inlineStr"><is><t>Seal Kit</t></is></c><c r="B4"><v>350</v></c><c r="C4"><v>10</v></c><c r="D4"><v>12</v></c><c r="E4"><v>15</v></c></row>
</sheetData></worksheet>"#;

const NOTES_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Reviewed by</t></is></c><c r="B1"><v>2099</v></c></row>
</sheetData></worksheet>"#;

fn workbook_bytes() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", STOCK_SHEET),
        ("xl/worksheets/sheet2.xml", NOTES_SHEET),
    ] {
        zip.start_file::<_, ()>(name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

#[test]
fn test_read_xlsx_uses_first_sheet() {
    let table = ingest::read_table("plant_stock.xlsx", &workbook_bytes()).unwrap();

    assert_eq!(table.source_name, "plant_stock.xlsx");
    assert_eq!(
        table.headers,
        vec!["Material Discription", "Unit Price", "2021", "FY22", "2023"]
    );
    // 空白列被略過
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0], vec!["Hydraulic Pump", "12500", "2", "", "1"]);
    assert_eq!(table.rows[1][0], "Seal Kit");
    assert!(table.rows.iter().all(|row| row[0] != "Reviewed by"));
}

#[test]
fn test_xlsx_headers_detected_as_years() {
    let table = ingest::read_table("PLANT_STOCK.XLSX", &workbook_bytes()).unwrap();
    let years: Vec<i32> = ingest::detect_year_columns(&table.headers)
        .iter()
        .map(|c| c.year)
        .collect();
    assert_eq!(years, vec![2021, 2022, 2023]);

    let cleaned = ingest::clean(&table, "Material Discription", "Unit Price").unwrap();
    assert_eq!(cleaned.histories.len(), 2);
    assert_eq!(cleaned.histories[0].historical_years(), vec![2021, 2023]);
    assert_eq!(cleaned.histories[0].unit_price, 12500.0);
}

#[tokio::test]
async fn test_end_to_end_from_xlsx() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("plant_stock.xlsx");
    std::fs::write(&input_path, workbook_bytes()).unwrap();
    let output_path = temp_dir.path().join("output");

    let config = AnalysisConfig {
        input_path: Some(input_path.to_str().unwrap().to_string()),
        output_path: output_path.to_str().unwrap().to_string(),
        replenishment_target_year: 2030,
        output_formats: vec!["json".to_string()],
        archive_name: None,
        ..Default::default()
    };
    let source = LocalStorage::new(String::new());
    let sink = LocalStorage::new(config.output_path.clone());
    let outcome = AnalysisEngine::new(InventoryPipeline::new(source, sink, config))
        .run()
        .await
        .unwrap();

    let report = &outcome.report;
    assert_eq!(report.cleaning.years, vec![2021, 2022, 2023]);
    assert_eq!(report.forecasts.len(), 2);

    // Pump: 2021 and 2023, lifetime 2 -> 2025, 2027, 2029
    let pump_events: Vec<i32> = report
        .replenishments
        .iter()
        .filter(|e| e.material == "Hydraulic Pump")
        .map(|e| e.replenishment_year)
        .collect();
    assert_eq!(pump_events, vec![2025, 2027, 2029]);
    assert!(output_path.join("analysis_report.json").exists());
}
