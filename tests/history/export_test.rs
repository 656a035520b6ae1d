//! CSV export.

use chrono::{Local, NaiveDate, TimeZone, Utc};
use order_parser::history::export::{
    csv_header, default_export_filename, export_to_file, write_csv, ExportError, TIME_FORMAT,
};
use order_parser::history::ParseResult;
use order_parser::order::OrderBlock;

fn full_row(name: &str, qty: &str) -> String {
    [
        "", "", "", name, "", "1 Elm St, Apt 2", "Austin", "TX", "78701", "US", "5125550100",
        "BLACK-WT-XL", qty,
    ]
    .join("\t")
}

fn entry(blocks: Vec<OrderBlock>) -> ParseResult {
    let mut result = ParseResult::new("order", blocks);
    result.timestamp = Utc
        .with_ymd_and_hms(2025, 3, 1, 12, 30, 0)
        .single()
        .expect("valid timestamp");
    result
}

fn export(results: &[ParseResult]) -> String {
    let mut out = Vec::new();
    write_csv(results, &mut out).expect("export should succeed");
    String::from_utf8(out).expect("CSV should be UTF-8")
}

fn local_time(result: &ParseResult) -> String {
    result
        .timestamp
        .with_timezone(&Local)
        .format(TIME_FORMAT)
        .to_string()
}

#[test]
fn header_lists_time_then_named_columns() {
    assert_eq!(
        csv_header().join(","),
        "Time,Name,Address1,City,State,Zip,Country,Phone,ColorSize,Quantity"
    );
}

#[test]
fn one_record_per_block_with_every_field_quoted() {
    let result = entry(vec![
        OrderBlock::new(full_row("Jane Doe", "1"), "\u{2705} ok"),
        OrderBlock::new(full_row("John \"JJ\" Roe", "3"), "\u{2705} ok"),
    ]);
    let csv = export(std::slice::from_ref(&result));
    let lines: Vec<&str> = csv.lines().collect();
    let time = local_time(&result);

    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "\"Time\",\"Name\",\"Address1\",\"City\",\"State\",\"Zip\",\"Country\",\"Phone\",\"ColorSize\",\"Quantity\""
    );
    assert_eq!(
        lines[1],
        format!("\"{time}\",\"Jane Doe\",\"1 Elm St, Apt 2\",\"Austin\",\"TX\",\"78701\",\"US\",\"5125550100\",\"BLACK-WT-XL\",\"1\"")
    );
    assert!(lines[2].contains("\"John \"\"JJ\"\" Roe\""));
    assert!(lines[2].ends_with(",\"3\""));
}

#[test]
fn short_rows_export_empty_fields() {
    let result = entry(vec![OrderBlock::new("\t\t\tOnly Name", "")]);
    let csv = export(&[result.clone()]);
    let record = csv.lines().nth(1).expect("data record");
    assert_eq!(
        record,
        format!(
            "\"{}\",\"Only Name\",\"\",\"\",\"\",\"\",\"\",\"\",\"\",\"\"",
            local_time(&result)
        )
    );
}

#[test]
fn results_export_in_history_order() {
    let newer = entry(vec![OrderBlock::new(full_row("Newer", "1"), "")]);
    let older = entry(vec![OrderBlock::new(full_row("Older", "1"), "")]);
    let csv = export(&[newer, older]);
    let names: Vec<&str> = csv
        .lines()
        .skip(1)
        .filter_map(|l| l.split(',').nth(1))
        .collect();
    assert_eq!(names, vec!["\"Newer\"", "\"Older\""]);
}

#[test]
fn write_csv_counts_records() {
    let results = vec![
        entry(vec![
            OrderBlock::new(full_row("A", "1"), ""),
            OrderBlock::new(full_row("B", "1"), ""),
        ]),
        entry(vec![OrderBlock::new(full_row("C", "1"), "")]),
    ];
    let mut out = Vec::new();
    assert_eq!(write_csv(&results, &mut out).expect("export"), 3);
}

#[test]
fn empty_history_is_an_error_and_writes_nothing() {
    let mut out = Vec::new();
    assert!(matches!(write_csv(&[], &mut out), Err(ExportError::Empty)));
    assert!(out.is_empty());

    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("out.csv");
    assert!(matches!(export_to_file(&[], &path), Err(ExportError::Empty)));
    assert!(!path.exists());
}

#[test]
fn export_to_file_writes_csv() {
    let tmp = tempfile::tempdir().expect("should create temp dir");
    let path = tmp.path().join("orders.csv");
    let rows = export_to_file(
        &[entry(vec![OrderBlock::new(full_row("Jane", "2"), "")])],
        &path,
    )
    .expect("export");
    assert_eq!(rows, 1);
    let written = std::fs::read_to_string(&path).expect("should read");
    assert!(written.starts_with("\"Time\","));
    assert!(written.contains("\"Jane\""));
}

#[test]
fn default_filename_uses_date() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
    assert_eq!(default_export_filename(date), "etsy_orders_2025-03-01.csv");
}
