//! Spreadsheet Parser
//!
//! Converts an uploaded workbook (`.xlsx`/`.xls`) or legacy CSV blob into
//! normalized row maps per collection. Individual malformed rows are skipped
//! with a warning; only a structurally empty file (zero rows across every
//! collection) is a terminal parse error, raised before any write happens.

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde_json::Value;
use std::io::Cursor;

use super::Row;
use crate::utils::{AppError, AppResult};

/// Parsed import file, one row list per collection
#[derive(Debug, Default)]
pub struct ParsedWorkbook {
    pub products: Vec<Row>,
    pub brands: Vec<Row>,
    pub flavours: Vec<Row>,
}

impl ParsedWorkbook {
    pub fn total_rows(&self) -> usize {
        self.products.len() + self.brands.len() + self.flavours.len()
    }
}

/// Which collection a sheet or CSV block belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Products,
    Brands,
    Flavours,
}

/// Case-insensitive sheet-name → collection matching, accepting singular,
/// plural and both spellings of flavour
fn match_collection(name: &str) -> Option<Collection> {
    match name.trim().to_lowercase().as_str() {
        "products" | "product" => Some(Collection::Products),
        "brands" | "brand" => Some(Collection::Brands),
        "flavours" | "flavors" | "flavour" | "flavor" => Some(Collection::Flavours),
        _ => None,
    }
}

// =============================================================================
// Header normalization
// =============================================================================

/// Fixed alias table applied after basic normalization
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("product_name", "name"),
    ("flavour_name", "name"),
    ("flavor_name", "name"),
    ("brand_name", "brand"),
    ("flavor_id", "flavorId"),
    ("flavour_id", "flavorId"),
    ("flavor_ids", "flavour_ids"),
    ("product_id", "productId"),
    ("flavors", "flavour"),
    ("flavours", "flavour"),
    ("flavor", "flavour"),
    ("quantity", "stock"),
    ("qty", "stock"),
    ("image_url", "image"),
    ("display_order", "displayOrder"),
    ("sort_order", "displayOrder"),
    ("created_at", "createdAt"),
    ("createdat", "createdAt"),
];

/// Trim, lower-case, spaces→underscores, then map through the alias table
pub fn normalize_header(raw: &str) -> String {
    let base = raw.trim().to_lowercase().replace(' ', "_");
    for (from, to) in HEADER_ALIASES {
        if base == *from {
            return (*to).to_string();
        }
    }
    base
}

/// Id-like columns keep empty strings instead of being omitted, so an
/// explicitly blank id is distinguishable from a missing column
fn is_id_like(key: &str) -> bool {
    key == "id" || key.ends_with("Id")
}

// =============================================================================
// Cell coercion
// =============================================================================

/// Coercion order for text cells: float, boolean words, bracket-delimited
/// JSON, else string
pub fn coerce_string(s: &str) -> Value {
    let trimmed = s.trim();

    if let Ok(f) = trimmed.parse::<f64>()
        && let Some(n) = serde_json::Number::from_f64(f)
    {
        return Value::Number(n);
    }

    match trimmed.to_lowercase().as_str() {
        "true" | "yes" => return Value::Bool(true),
        "false" | "no" => return Value::Bool(false),
        _ => {}
    }

    let looks_like_json = (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'));
    if looks_like_json
        && let Ok(v) = serde_json::from_str::<Value>(trimmed)
    {
        return v;
    }

    Value::String(trimmed.to_string())
}

/// Workbook cell → JSON value; `None` for cells that should be omitted
fn cell_to_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(coerce_string(s))
            }
        }
        Data::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        Data::Int(i) => Some(Value::Number((*i).into())),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => serde_json::Number::from_f64(dt.as_f64()).map(Value::Number),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(Value::String(s.clone())),
        Data::Error(e) => {
            tracing::warn!(error = ?e, "Skipping error cell");
            None
        }
    }
}

/// Assemble a row from normalized headers and raw cell values
fn build_row(
    headers: &[String],
    values: impl Iterator<Item = Option<Value>>,
    collection: Collection,
) -> Row {
    let mut row = Row::new();
    for (key, value) in headers.iter().zip(values) {
        if key.is_empty() {
            continue;
        }
        match value {
            Some(v) => {
                row.insert(key.clone(), v);
            }
            None => {
                // Empty cells vanish, except id-like fields which keep ""
                if is_id_like(key) {
                    row.insert(key.clone(), Value::String(String::new()));
                }
            }
        }
    }

    // Product rows carry positional flavour name/id lists as comma-joined
    // cells; split them here so downstream code always sees arrays
    if collection == Collection::Products {
        for key in ["flavour", "flavour_ids"] {
            if let Some(Value::String(s)) = row.get(key) {
                let parts: Vec<Value> = s
                    .split(',')
                    .map(|p| Value::String(p.trim().to_string()))
                    .collect();
                row.insert(key.to_string(), Value::Array(parts));
            }
        }
    }

    row
}

// =============================================================================
// Workbook path
// =============================================================================

/// Parse a binary workbook. Unrecognized sheets are logged and skipped.
pub fn parse_workbook(bytes: &[u8]) -> AppResult<ParsedWorkbook> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| AppError::parse(format!("Unreadable workbook: {e}")))?;

    let mut parsed = ParsedWorkbook::default();
    let sheet_names = workbook.sheet_names().to_vec();

    for sheet_name in sheet_names {
        let Some(collection) = match_collection(&sheet_name) else {
            tracing::warn!(sheet = %sheet_name, "Unrecognized sheet, skipping");
            continue;
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| AppError::parse(format!("Failed to read sheet '{sheet_name}': {e}")))?;

        let mut rows_iter = range.rows();
        let Some(header_row) = rows_iter.next() else {
            tracing::warn!(sheet = %sheet_name, "Empty sheet, skipping");
            continue;
        };
        let headers: Vec<String> = header_row
            .iter()
            .map(|c| match c {
                Data::String(s) => normalize_header(s),
                other => normalize_header(&other.to_string()),
            })
            .collect();

        let target = match collection {
            Collection::Products => &mut parsed.products,
            Collection::Brands => &mut parsed.brands,
            Collection::Flavours => &mut parsed.flavours,
        };

        for cells in rows_iter {
            let row = build_row(&headers, cells.iter().map(cell_to_value), collection);
            if !row.is_empty() {
                target.push(row);
            }
        }

        tracing::info!(sheet = %sheet_name, rows = target.len(), "Sheet parsed");
    }

    if parsed.total_rows() == 0 {
        return Err(AppError::parse(
            "No importable rows found: expected sheets named products, brands or flavours",
        ));
    }
    Ok(parsed)
}

// =============================================================================
// Legacy CSV path
// =============================================================================

/// Detect a CSV header row by the `<collection>_` prefix on its first column.
/// Returns the collection and the per-column prefix to strip.
fn detect_csv_header(first_field: &str) -> Option<(Collection, &'static str)> {
    let lowered = first_field.trim().to_lowercase();
    for prefix in [
        "products_", "product_", "brands_", "brand_", "flavours_", "flavour_", "flavors_",
        "flavor_",
    ] {
        if lowered.starts_with(prefix) {
            let collection = match_collection(prefix.trim_end_matches('_'))?;
            return Some((collection, prefix));
        }
    }
    None
}

/// Parse the legacy CSV framing: `<collection>_<field>` header rows open a
/// block; data rows belong to the most recent block. Quoting follows
/// RFC 4180 (embedded commas, `""` → `"`).
pub fn parse_csv(text: &str) -> AppResult<ParsedWorkbook> {
    if text.trim().is_empty() {
        return Err(AppError::parse("Import file is empty"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedWorkbook::default();
    let mut current: Option<(Collection, Vec<String>)> = None;

    for (line_no, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(line = line_no + 1, error = %e, "Skipping malformed CSV line");
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let first = record.get(0).unwrap_or_default();
        if let Some((collection, prefix)) = detect_csv_header(first) {
            let headers: Vec<String> = record
                .iter()
                .map(|h| {
                    let lowered = h.trim().to_lowercase();
                    let stripped = lowered.strip_prefix(prefix).unwrap_or(&lowered);
                    normalize_header(stripped)
                })
                .collect();
            current = Some((collection, headers));
            continue;
        }

        let Some((collection, headers)) = &current else {
            tracing::warn!(
                line = line_no + 1,
                "Data row before any collection header, skipping"
            );
            continue;
        };

        let values = record.iter().map(|f| {
            if f.trim().is_empty() {
                None
            } else {
                Some(coerce_string(f))
            }
        });
        let row = build_row(headers, values, *collection);
        if row.is_empty() {
            continue;
        }
        match collection {
            Collection::Products => parsed.products.push(row),
            Collection::Brands => parsed.brands.push(row),
            Collection::Flavours => parsed.flavours.push(row),
        }
    }

    if parsed.total_rows() == 0 {
        return Err(AppError::parse(
            "No importable rows found in CSV: expected <collection>_<field> header rows",
        ));
    }
    Ok(parsed)
}

/// Dispatch on file name: `.csv` takes the legacy path, everything else is
/// treated as a binary workbook
pub fn parse_import_file(file_name: &str, bytes: &[u8]) -> AppResult<ParsedWorkbook> {
    if file_name.to_lowercase().ends_with(".csv") {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| AppError::parse("CSV file is not valid UTF-8"))?;
        parse_csv(text)
    } else {
        parse_workbook(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_normalization_applies_aliases() {
        assert_eq!(normalize_header("  Product Name "), "name");
        assert_eq!(normalize_header("FLAVOR_ID"), "flavorId");
        assert_eq!(normalize_header("Flavor IDs"), "flavour_ids");
        assert_eq!(normalize_header("Stock"), "stock");
        assert_eq!(normalize_header("Created At"), "createdAt");
    }

    #[test]
    fn coercion_order_float_bool_json_string() {
        assert_eq!(coerce_string("12.5"), serde_json::json!(12.5));
        assert_eq!(coerce_string("YES"), Value::Bool(true));
        assert_eq!(coerce_string("no"), Value::Bool(false));
        assert_eq!(coerce_string(r#"["a","b"]"#), serde_json::json!(["a", "b"]));
        assert_eq!(coerce_string("Mango Ice"), Value::String("Mango Ice".into()));
        // "1" parses as a number before the boolean words get a chance
        assert_eq!(coerce_string("1"), serde_json::json!(1.0));
    }

    #[test]
    fn csv_quoted_fields_keep_embedded_commas() {
        let csv = "products_name,products_brand,products_description\n\"A\",\"B,C\",D\n";
        let parsed = parse_csv(csv).unwrap();
        assert_eq!(parsed.products.len(), 1);
        let row = &parsed.products[0];
        assert_eq!(row["name"], Value::String("A".into()));
        assert_eq!(row["brand"], Value::String("B,C".into()));
        assert_eq!(row["description"], Value::String("D".into()));
    }

    #[test]
    fn csv_doubled_quotes_unescape() {
        let csv = "products_name,products_description\n\"Say \"\"hi\"\"\",x\n";
        let parsed = parse_csv(csv).unwrap();
        assert_eq!(
            parsed.products[0]["name"],
            Value::String("Say \"hi\"".into())
        );
    }

    #[test]
    fn csv_blocks_switch_collections() {
        let csv = "\
brands_name,brands_description
Naked 100,Fruity range
products_name,products_brand
Lava Flow,Naked 100
Hawaiian POG,Naked 100
";
        let parsed = parse_csv(csv).unwrap();
        assert_eq!(parsed.brands.len(), 1);
        assert_eq!(parsed.products.len(), 2);
    }

    #[test]
    fn empty_csv_is_a_terminal_parse_error() {
        assert!(matches!(parse_csv("   "), Err(AppError::Parse(_))));
        assert!(matches!(
            parse_csv("unrelated,columns\n1,2\n"),
            Err(AppError::Parse(_))
        ));
    }

    #[test]
    fn product_flavour_cells_become_positional_arrays() {
        let csv = "products_name,products_flavour,products_flavor_ids\nJuice,\"Mango, Berry\",\"F1,F2\"\n";
        let parsed = parse_csv(csv).unwrap();
        let row = &parsed.products[0];
        assert_eq!(row["flavour"], serde_json::json!(["Mango", "Berry"]));
        assert_eq!(row["flavour_ids"], serde_json::json!(["F1", "F2"]));
    }
}
