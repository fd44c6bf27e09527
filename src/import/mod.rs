//! Bulk Import Module
//!
//! # Structure
//!
//! - [`spreadsheet`] - workbook/CSV parsing into normalized row maps
//! - [`reconcile`] - identity reconciliation (dedup, ensure-exists, merge)
//! - [`importer`] - row-by-row import execution with progress reporting
//!
//! An import run is strictly sequential: parse, dedupe, ensure brands and
//! flavours, reconcile against persisted products, then insert row by row in
//! input order. Nothing here is concurrent on purpose: the duplicate and id
//! checks rely on seeing the effects of the rows just processed.

pub mod importer;
pub mod reconcile;
pub mod spreadsheet;

pub use importer::{ImportAllReport, ImportReport, ImportService, ProgressFn};
pub use reconcile::dedupe_product_rows;
pub use spreadsheet::{ParsedWorkbook, parse_csv, parse_import_file, parse_workbook};

use serde_json::Value;

/// One normalized spreadsheet row: header name → coerced cell value
pub type Row = serde_json::Map<String, Value>;

/// The import dedup key: lower-cased, trimmed `name`
pub fn row_name_key(row: &Row) -> Option<String> {
    let name = row_str(row, "name")?;
    let key = name.trim().to_lowercase();
    if key.is_empty() { None } else { Some(key) }
}

/// String view of a cell, stringifying scalars the way spreadsheets do
pub fn row_str(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn row_f64(row: &Row, key: &str) -> Option<f64> {
    match row.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn row_i64(row: &Row, key: &str) -> Option<i64> {
    row_f64(row, key).map(|f| f as i64)
}

pub fn row_bool(row: &Row, key: &str) -> Option<bool> {
    match row.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

/// Cell as a list of strings: arrays pass through, scalar strings are
/// comma-split. Used for the positional `flavour`/`flavour_ids` columns.
pub fn row_str_list(row: &Row, key: &str) -> Vec<String> {
    match row.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(',').map(|p| p.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Positional `(flavour name, optional flavour id)` pairs of a product row.
/// Ids are matched to names by position; missing or empty ids become `None`.
pub fn row_flavour_pairs(row: &Row) -> Vec<(String, Option<String>)> {
    let names = row_str_list(row, "flavour");
    let ids = row_str_list(row, "flavour_ids");
    names
        .into_iter()
        .enumerate()
        .filter(|(_, n)| !n.is_empty())
        .map(|(i, name)| {
            let id = ids.get(i).filter(|id| !id.is_empty()).cloned();
            (name, id)
        })
        .collect()
}
