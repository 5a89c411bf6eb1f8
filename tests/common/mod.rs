//! Shared test utilities and fixture generators

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rand::{Rng, SeedableRng};
use rfm_churn::pipeline::OrderRecord;
use std::path::PathBuf;
use tempfile::TempDir;

/// Midnight on the given day of January 2024
pub fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Three customers with hand-checkable RFM values
///
/// - A: orders on day 1 and day 10 worth 100 and 200
/// - B: one order on day 5 worth 50
/// - C: one order on day 10 worth 1000
pub fn three_customer_orders() -> Vec<OrderRecord> {
    vec![
        OrderRecord::new("A", "1", day(1), 100.0),
        OrderRecord::new("B", "2", day(5), 50.0),
        OrderRecord::new("A", "3", day(10), 200.0),
        OrderRecord::new("C", "4", day(10), 1000.0),
    ]
}

/// The three-customer scenario as an uploaded table, with the unused Name column
pub fn create_orders_dataframe() -> DataFrame {
    df! {
        "CustomerID" => ["A", "B", "A", "C"],
        "Name" => ["Ann", "Bob", "Ann", "Cy"],
        "OrderNumber" => [1i64, 2, 3, 4],
        "DateOfOrder" => ["2024-01-01", "2024-01-05", "2024-01-10", "2024-01-10"],
        "ValueOfOrder" => [100.0f64, 50.0, 200.0, 1000.0],
    }
    .unwrap()
}

/// Same scenario with a native Date column, as Parquet files carry it
pub fn create_typed_orders_dataframe() -> DataFrame {
    // Days since the Unix epoch; 19723 is 2024-01-01
    let dates = Column::new("DateOfOrder".into(), [19723i32, 19727, 19732, 19732])
        .cast(&DataType::Date)
        .unwrap();

    DataFrame::new(vec![
        Column::new("CustomerID".into(), ["A", "B", "A", "C"]),
        Column::new("OrderNumber".into(), ["1", "2", "3", "4"]),
        dates,
        Column::new("ValueOfOrder".into(), [100.0f64, 50.0, 200.0, 1000.0]),
    ])
    .unwrap()
}

/// Random order history: `customers` customers with 1..=8 orders each over 2024
pub fn random_orders(customers: usize, seed: u64) -> Vec<OrderRecord> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let start = day(1);
    let mut orders = Vec::new();
    let mut order_number = 0usize;

    for c in 0..customers {
        let n_orders = rng.gen_range(1..=8);
        for _ in 0..n_orders {
            order_number += 1;
            let offset = Duration::days(rng.gen_range(0..365));
            let value = (rng.gen::<f64>() * 500.0 * 100.0).round() / 100.0;
            orders.push(OrderRecord::new(
                format!("CUST{:04}", c),
                order_number.to_string(),
                start + offset,
                value,
            ));
        }
    }

    orders
}

/// Render order records as an uploaded table with ISO text dates
pub fn orders_to_dataframe(orders: &[OrderRecord]) -> DataFrame {
    let ids: Vec<&str> = orders.iter().map(|o| o.customer_id.as_str()).collect();
    let numbers: Vec<&str> = orders.iter().map(|o| o.order_number.as_str()).collect();
    let dates: Vec<String> = orders
        .iter()
        .map(|o| o.order_date.format("%Y-%m-%d %H:%M:%S").to_string())
        .collect();
    let values: Vec<f64> = orders.iter().map(|o| o.order_value).collect();

    DataFrame::new(vec![
        Column::new("CustomerID".into(), ids),
        Column::new("OrderNumber".into(), numbers),
        Column::new("DateOfOrder".into(), dates),
        Column::new("ValueOfOrder".into(), values),
    ])
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("orders.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("orders.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

const XLSX_CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const XLSX_ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const XLSX_WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Orders" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

const XLSX_WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

/// A worksheet cell for [`create_temp_xlsx`]
pub enum SheetCell<'a> {
    Text(&'a str),
    Number(f64),
}

fn sheet_xml(rows: &[Vec<SheetCell>]) -> String {
    let mut body = String::new();
    for (r, row) in rows.iter().enumerate() {
        body.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
            match cell {
                SheetCell::Text(s) => body.push_str(&format!(
                    "<c r=\"{reference}\" t=\"inlineStr\"><is><t>{s}</t></is></c>"
                )),
                SheetCell::Number(n) => {
                    body.push_str(&format!("<c r=\"{reference}\"><v>{n}</v></c>"))
                }
            }
        }
        body.push_str("</row>");
    }

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
         <sheetData>{body}</sheetData></worksheet>"
    )
}

/// Create a temporary directory with a single-sheet xlsx workbook
pub fn create_temp_xlsx(rows: &[Vec<SheetCell>]) -> (TempDir, PathBuf) {
    use std::io::Write;

    let temp_dir = TempDir::new().unwrap();
    let xlsx_path = temp_dir.path().join("orders.xlsx");

    let mut zip = ::zip::ZipWriter::new(std::fs::File::create(&xlsx_path).unwrap());
    let options = ::zip::write::SimpleFileOptions::default();
    let sheet = sheet_xml(rows);
    let parts = [
        ("[Content_Types].xml", XLSX_CONTENT_TYPES),
        ("_rels/.rels", XLSX_ROOT_RELS),
        ("xl/workbook.xml", XLSX_WORKBOOK),
        ("xl/_rels/workbook.xml.rels", XLSX_WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
    ];
    for (name, content) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();

    (temp_dir, xlsx_path)
}

/// The three-customer scenario as a worksheet with text dates
pub fn three_customer_sheet() -> Vec<Vec<SheetCell<'static>>> {
    use SheetCell::{Number, Text};

    vec![
        vec![
            Text("CustomerID"),
            Text("Name"),
            Text("OrderNumber"),
            Text("DateOfOrder"),
            Text("ValueOfOrder"),
        ],
        vec![Text("A"), Text("Ann"), Number(1.0), Text("2024-01-01"), Number(100.0)],
        vec![Text("B"), Text("Bob"), Number(2.0), Text("2024-01-05"), Number(50.0)],
        vec![Text("A"), Text("Ann"), Number(3.0), Text("2024-01-10"), Number(200.0)],
        vec![Text("C"), Text("Cy"), Number(4.0), Text("2024-01-10"), Number(1000.0)],
    ]
}
