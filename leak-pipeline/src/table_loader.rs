//! Table loader.
//!
//! Resolves a path to a `Table`, dispatching on the file extension:
//!   .csv    header row, one record per line; common null tokens (NA, NaN, null, ...) read as missing
//!   .jsonl  one JSON object per line
//!   .json   an array of objects, or an object of equal-length column arrays
//!
//! Any other extension (including columnar .parquet) is rejected.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use leak_engine::{Cell, Table};
use serde_json::{Map, Value};

use crate::error::{PipelineError, PipelineResult};

/// Load a table from a file path.
pub fn read_table(name: &str, path: &Path) -> PipelineResult<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let open = || {
        File::open(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    let table = match ext.as_deref() {
        Some("csv") => load_csv(name, open()?, path)?,
        Some("jsonl") => load_jsonl(name, BufReader::new(open()?), path)?,
        Some("json") => load_json(name, open()?, path)?,
        _ => {
            return Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    log::info!(
        "loaded {} rows x {} columns into {} from '{}'",
        table.len(),
        table.columns().len(),
        name,
        path.display()
    );
    Ok(table)
}

/// Load an input that may not have been supplied. No path, or a path that
/// does not exist, yields an empty table.
pub fn read_optional_table(name: &str, path: Option<&Path>) -> PipelineResult<Table> {
    match path {
        None => Ok(Table::empty(name)),
        Some(p) if !p.exists() => {
            log::warn!("{} table '{}' not found, using an empty table", name, p.display());
            Ok(Table::empty(name))
        }
        Some(p) => read_table(name, p),
    }
}

/// Load a CSV table from a reader. `origin` is only used in error messages.
pub fn load_csv<R: Read>(name: &str, reader: R, origin: &Path) -> PipelineResult<Table> {
    let csv_err = |source| PipelineError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = Table::new(name, columns);
    for result in csv_reader.records() {
        let record = result.map_err(csv_err)?;
        table.push_row(record.iter().map(csv_cell).collect());
    }
    Ok(table)
}

/// Field values that CSV exports use for a missing value.
const CSV_NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn csv_cell(field: &str) -> Cell {
    if CSV_NULL_TOKENS.contains(&field) {
        Cell::Null
    } else {
        Cell::Text(field.to_string())
    }
}

/// Load a JSON-lines table from a reader. Blank lines are skipped.
pub fn load_jsonl<R: BufRead>(name: &str, reader: R, origin: &Path) -> PipelineResult<Table> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| PipelineError::Io {
            path: origin.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line).map_err(|source| PipelineError::Json {
            path: origin.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        match value {
            Value::Object(map) => records.push(map),
            other => {
                return Err(PipelineError::Shape {
                    path: origin.to_path_buf(),
                    reason: format!("line {} is {} rather than an object", idx + 1, kind(&other)),
                })
            }
        }
    }
    Ok(from_records(name, records))
}

/// Load a JSON table from a reader.
pub fn load_json<R: Read>(name: &str, reader: R, origin: &Path) -> PipelineResult<Table> {
    let shape = |reason: String| PipelineError::Shape {
        path: origin.to_path_buf(),
        reason,
    };

    let value: Value = serde_json::from_reader(reader).map_err(|source| PipelineError::Json {
        path: origin.to_path_buf(),
        line: source.line(),
        source,
    })?;

    match value {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for (idx, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(map) => records.push(map),
                    other => {
                        return Err(shape(format!("element {} is {}", idx, kind(&other))));
                    }
                }
            }
            Ok(from_records(name, records))
        }
        Value::Object(columns) => from_columns(name, columns).map_err(shape),
        other => Err(shape(format!("top level is {}", kind(&other)))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn json_cell(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(b),
        Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
        Value::String(s) => Cell::Text(s),
        nested => Cell::Text(nested.to_string()),
    }
}

/// Records may disagree on keys; columns are the union in first-seen order.
fn from_records(name: &str, records: Vec<Map<String, Value>>) -> Table {
    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(name, columns.clone());
    for mut record in records {
        let row = columns
            .iter()
            .map(|c| record.remove(c).map(json_cell).unwrap_or(Cell::Null))
            .collect();
        table.push_row(row);
    }
    table
}

fn from_columns(name: &str, columns: Map<String, Value>) -> Result<Table, String> {
    let mut names = Vec::with_capacity(columns.len());
    let mut data: Vec<Vec<Value>> = Vec::with_capacity(columns.len());
    for (column, values) in columns {
        match values {
            Value::Array(values) => {
                names.push(column);
                data.push(values);
            }
            other => return Err(format!("column '{}' is {}", column, kind(&other))),
        }
    }

    let height = data.first().map(Vec::len).unwrap_or(0);
    if let Some(idx) = data.iter().position(|col| col.len() != height) {
        return Err(format!(
            "column '{}' has {} values, expected {}",
            names[idx],
            data[idx].len(),
            height
        ));
    }

    let mut columns_iter: Vec<_> = data.into_iter().map(Vec::into_iter).collect();
    let mut table = Table::new(name, names);
    for _ in 0..height {
        let row = columns_iter
            .iter_mut()
            .map(|col| col.next().map(json_cell).unwrap_or(Cell::Null))
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
order_id,customer_id,order_ts,gross_revenue,discount_amount,net_revenue,shipping_cost,cogs_total
O-1001,C-7,2024-05-02T10:00:00Z,120.00,20.00,100.00,8.50,40.00
O-1002,C-9,2024-05-03T11:30:00Z, 80.00 ,0,80.00,6.00,31.00
O-1003,,2024-05-04T09:15:00Z,50.00,5.00,45.00,,
";

    fn origin() -> &'static Path {
        Path::new("inline")
    }

    #[test]
    fn load_sample_csv() {
        let table = load_csv("orders", SAMPLE_CSV.as_bytes(), origin()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns().len(), 8);
        let net = table.numeric_column("net_revenue").unwrap();
        assert!((net[1] - 80.0).abs() < 0.01);
        let gross = table.numeric_column("gross_revenue").unwrap();
        assert!((gross[1] - 80.0).abs() < 0.01);
        let shipping = table.numeric_column("shipping_cost").unwrap();
        assert_eq!(shipping[2], 0.0);
        assert_eq!(table.text_column("customer_id")[2], None);
    }

    #[test]
    fn csv_null_tokens_read_as_missing() {
        let csv_data = "order_id,refund_amount,refund_reason\nO1,NaN,damaged\nO2,null,N/A\nO3,NA,late\nO4,12.50,\n";
        let table = load_csv("refunds", csv_data.as_bytes(), origin()).unwrap();
        assert_eq!(
            table.numeric_column("refund_amount").unwrap(),
            vec![0.0, 0.0, 0.0, 12.5]
        );
        let reasons = table.text_column("refund_reason");
        assert_eq!(reasons[0].as_deref(), Some("damaged"));
        assert_eq!(reasons[1], None);
        assert_eq!(reasons[3], None);
    }

    #[test]
    fn csv_non_numeric_money_is_still_an_error() {
        let csv_data = "order_id,net_revenue\nO1,twelve\n";
        let table = load_csv("orders", csv_data.as_bytes(), origin()).unwrap();
        let err = table.numeric_column("net_revenue").unwrap_err();
        assert_eq!(err.column_path(), "orders.net_revenue");
    }

    #[test]
    fn csv_ragged_rows_are_accepted() {
        let csv_data = "order_id,refund_amount,refund_ts\nO-1,25.00\n";
        let table = load_csv("refunds", csv_data.as_bytes(), origin()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.timestamp_column("refund_ts").unwrap()[0].is_none());
    }

    #[test]
    fn jsonl_unions_keys_and_skips_blank_lines() {
        let data = "{\"order_id\": 1001, \"amount\": 12.5, \"status\": \"failed\"}\n\n{\"order_id\": 1002, \"dispute_amount\": 3}\n";
        let table = load_jsonl("payments", data.as_bytes(), origin()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), ["order_id", "amount", "status", "dispute_amount"]);
        assert_eq!(table.text_column("order_id")[0].as_deref(), Some("1001"));
        assert_eq!(table.numeric_column("amount").unwrap(), vec![12.5, 0.0]);
        assert_eq!(table.numeric_column("dispute_amount").unwrap(), vec![0.0, 3.0]);
    }

    #[test]
    fn jsonl_reports_bad_line_number() {
        let data = "{\"a\": 1}\n{not json}\n";
        let err = load_jsonl("t", data.as_bytes(), origin()).unwrap_err();
        assert!(matches!(err, PipelineError::Json { line: 2, .. }));
    }

    #[test]
    fn jsonl_rejects_non_objects() {
        let err = load_jsonl("t", "[1, 2]\n".as_bytes(), origin()).unwrap_err();
        assert!(matches!(err, PipelineError::Shape { .. }));
    }

    #[test]
    fn json_record_array() {
        let data = r#"[{"customer_id": "C1", "created_ts": "2024-05-01", "topic": "refund"},
                      {"customer_id": "C2", "created_ts": null, "topic": "shipping"}]"#;
        let table = load_json("tickets", data.as_bytes(), origin()).unwrap();
        assert_eq!(table.len(), 2);
        let ts = table.timestamp_column("created_ts").unwrap();
        assert!(ts[0].is_some());
        assert!(ts[1].is_none());
    }

    #[test]
    fn json_column_object() {
        let data = r#"{"coupon_code": ["A", "B"], "discount_value": [1.5, 2.5]}"#;
        let table = load_json("discounts", data.as_bytes(), origin()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.numeric_column("discount_value").unwrap(), vec![1.5, 2.5]);
    }

    #[test]
    fn json_column_object_rejects_uneven_columns() {
        let data = r#"{"a": [1, 2], "b": [1]}"#;
        let err = load_json("t", data.as_bytes(), origin()).unwrap_err();
        assert!(matches!(err, PipelineError::Shape { .. }));
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        for name in ["orders.parquet", "orders.xlsx", "orders"] {
            let err = read_table("orders", Path::new(name)).unwrap_err();
            assert!(matches!(err, PipelineError::UnsupportedFormat { .. }), "{}", name);
        }
    }

    #[test]
    fn optional_table_falls_back_to_empty() {
        let table = read_optional_table("refunds", None).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.name(), "refunds");
        let table =
            read_optional_table("refunds", Some(Path::new("/definitely/not/here.csv"))).unwrap();
        assert!(table.is_empty());
    }
}
