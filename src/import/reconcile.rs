//! Identity Reconciliation
//!
//! The reconciliation passes run before any product row is inserted:
//!
//! 1. intra-file dedup of product rows (first occurrence is canonical, later
//!    duplicates fold their flavour and brand data into it)
//! 2. ensure every referenced brand exists, creating missing ones
//! 3. ensure every referenced `(brand, flavour)` pair exists, creating
//!    flavour documents only when the file supplies an explicit id
//! 4. match product rows against persisted products by the case-insensitive
//!    trimmed name and turn matches into merge updates instead of inserts
//!
//! Per-entity failures in steps 2 and 3 are logged and counted, never fatal;
//! the run continues with whatever could be ensured.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::{Row, row_flavour_pairs, row_name_key, row_str};
use crate::core::CatalogState;
use crate::db::models::{BrandCreate, FlavourCreate, FlavourEntry, Product, ProductUpdate};
use crate::utils::AppResult;

// =============================================================================
// Step 1: intra-file dedup
// =============================================================================

/// Collapse duplicate product rows inside one file.
///
/// The first row with a given name key stays canonical; later rows are
/// removed after merging into it. Returns `row index → reason` for the
/// removed rows so the report can count them as skips.
pub fn dedupe_product_rows(rows: &mut Vec<Row>) -> HashMap<usize, String> {
    let mut canonical_by_key: HashMap<String, usize> = HashMap::new();
    let mut skipped: HashMap<usize, String> = HashMap::new();
    let mut keep: Vec<Row> = Vec::with_capacity(rows.len());

    for (index, row) in rows.drain(..).enumerate() {
        let Some(key) = row_name_key(&row) else {
            keep.push(row);
            continue;
        };

        match canonical_by_key.get(&key) {
            None => {
                canonical_by_key.insert(key, keep.len());
                keep.push(row);
            }
            Some(&canonical_index) => {
                merge_duplicate_row(&mut keep[canonical_index], &row);
                let name = row_str(&row, "name").unwrap_or_default();
                skipped.insert(index, format!("Duplicate of '{name}' within the file"));
            }
        }
    }

    *rows = keep;
    skipped
}

/// Fold a duplicate row into its canonical row: union the flavour pairs
/// (position-matched names and ids) and fill an empty brand. The canonical
/// row wins every other field.
fn merge_duplicate_row(canonical: &mut Row, duplicate: &Row) {
    let mut pairs = row_flavour_pairs(canonical);
    let mut seen: HashSet<String> = pairs.iter().map(|(n, _)| n.to_lowercase()).collect();
    for (name, id) in row_flavour_pairs(duplicate) {
        if seen.insert(name.to_lowercase()) {
            pairs.push((name, id));
        }
    }
    if !pairs.is_empty() {
        let (names, ids): (Vec<Value>, Vec<Value>) = pairs
            .into_iter()
            .map(|(n, id)| {
                (
                    Value::String(n),
                    Value::String(id.unwrap_or_default()),
                )
            })
            .unzip();
        canonical.insert("flavour".into(), Value::Array(names));
        canonical.insert("flavour_ids".into(), Value::Array(ids));
    }

    let canonical_brand = row_str(canonical, "brand").unwrap_or_default();
    if canonical_brand.trim().is_empty()
        && let Some(brand) = row_str(duplicate, "brand")
        && !brand.trim().is_empty()
    {
        canonical.insert("brand".into(), Value::String(brand));
    }
}

// =============================================================================
// Steps 2 and 3: ensure brands and flavours exist
// =============================================================================

/// Create every brand the product rows reference that does not exist yet
/// (exact name match), then ensure a flavour document per `(brand, flavour)`
/// pair that carries an explicit id. Pairs without an id are logged and left
/// alone; an existing flavour missing its id gets it backfilled, while a
/// conflicting id keeps the persisted one.
pub async fn ensure_brands_and_flavours(
    state: &CatalogState,
    product_rows: &[Row],
    errors: &mut Vec<String>,
) -> AppResult<()> {
    let brand_repo = state.brands();
    let flavour_repo = state.flavours();

    // brand name → flavour pairs referenced under it, first mention order
    let mut by_brand: Vec<(String, Vec<(String, Option<String>)>)> = Vec::new();
    for row in product_rows {
        let brand = row_str(row, "brand").unwrap_or_default();
        let brand = brand.trim().to_string();
        if brand.is_empty() {
            continue;
        }
        let pairs = row_flavour_pairs(row);
        match by_brand.iter_mut().find(|(b, _)| *b == brand) {
            Some((_, existing)) => existing.extend(pairs),
            None => by_brand.push((brand, pairs)),
        }
    }

    for (brand_name, pairs) in by_brand {
        let existing = match brand_repo.find_by_name(&brand_name).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(brand = %brand_name, error = %e, "Brand lookup failed");
                errors.push(format!("Brand '{brand_name}': lookup failed: {e}"));
                continue;
            }
        };
        if existing.is_none() {
            let create = BrandCreate {
                name: brand_name.clone(),
                description: None,
                display_order: None,
                created_at: None,
            };
            match brand_repo.create(create).await {
                Ok(_) => tracing::info!(brand = %brand_name, "Brand created during import"),
                Err(e) => {
                    tracing::warn!(brand = %brand_name, error = %e, "Brand create failed");
                    errors.push(format!("Brand '{brand_name}': create failed: {e}"));
                    continue;
                }
            }
        }

        let mut seen: HashSet<String> = HashSet::new();
        for (flavour_name, flavor_id) in pairs {
            if !seen.insert(flavour_name.to_lowercase()) {
                continue;
            }
            if let Err(e) =
                ensure_flavour(&flavour_repo, &brand_name, &flavour_name, flavor_id).await
            {
                tracing::warn!(
                    brand = %brand_name,
                    flavour = %flavour_name,
                    error = %e,
                    "Flavour ensure failed"
                );
                errors.push(format!(
                    "Flavour '{flavour_name}' (brand '{brand_name}'): {e}"
                ));
            }
        }
    }

    Ok(())
}

async fn ensure_flavour(
    repo: &crate::db::repository::FlavourRepository,
    brand: &str,
    name: &str,
    flavor_id: Option<String>,
) -> AppResult<()> {
    match repo.find_by_brand_and_name(brand, name).await? {
        Some(existing) => {
            let Some(incoming_id) = flavor_id else {
                return Ok(());
            };
            if existing.flavor_id.is_empty() {
                // Backfill a missing id, everything else untouched
                let id = existing
                    .id
                    .as_ref()
                    .map(|t| t.id.to_raw())
                    .unwrap_or_default();
                repo.update(
                    &id,
                    crate::db::models::FlavourUpdate {
                        flavor_id: Some(incoming_id),
                        ..Default::default()
                    },
                )
                .await?;
            } else if existing.flavor_id != incoming_id {
                tracing::warn!(
                    brand, flavour = name,
                    existing_id = %existing.flavor_id,
                    incoming_id = %incoming_id,
                    "Conflicting flavour id in file; keeping the persisted one"
                );
            }
        }
        None => {
            let Some(incoming_id) = flavor_id else {
                // Without an id the flavour cannot participate in identity
                // checks later; creating it would only mint an orphan
                tracing::warn!(brand, flavour = name, "Flavour row has no id, not created");
                return Ok(());
            };
            repo.create(FlavourCreate {
                name: name.to_string(),
                brand: Some(brand.to_string()),
                flavor_id: Some(incoming_id),
                product_id: None,
                image: None,
                created_at: None,
            })
            .await?;
            tracing::info!(brand, flavour = name, "Flavour created during import");
        }
    }
    Ok(())
}

// =============================================================================
// Step 4: reconcile against persisted products
// =============================================================================

/// Planned action for one product row after matching against the store
#[derive(Debug)]
pub enum RowPlan {
    /// No persisted match; insert as a new product
    Insert,
    /// Persisted match; apply this merge update instead of inserting
    Merge { id: String, update: ProductUpdate },
}

/// Match each row against persisted products by the case-insensitive trimmed
/// name. A match becomes a [`RowPlan::Merge`] that backfills empty fields and
/// unions flavour entries; everything else stays an insert.
pub async fn reconcile_existing_products(
    state: &CatalogState,
    rows: &[Row],
) -> AppResult<Vec<RowPlan>> {
    let repo = state.products();
    let mut plans = Vec::with_capacity(rows.len());

    for row in rows {
        let Some(name) = row_str(row, "name") else {
            plans.push(RowPlan::Insert);
            continue;
        };
        match repo.find_by_name_ci(&name).await? {
            Some(existing) => {
                let id = existing
                    .id
                    .as_ref()
                    .map(|t| t.id.to_raw())
                    .unwrap_or_default();
                let update = merge_update_for(&existing, row);
                plans.push(RowPlan::Merge { id, update });
            }
            None => plans.push(RowPlan::Insert),
        }
    }

    Ok(plans)
}

/// Build the merge update for a matched product.
///
/// Incoming flavour pairs are merged by id; brand overwrites when supplied;
/// price, stock and description only fill empty or zero fields. The persisted
/// record always wins a populated field.
fn merge_update_for(existing: &Product, row: &Row) -> ProductUpdate {
    let mut update = ProductUpdate::default();

    let incoming = row_flavour_pairs(row);
    if !incoming.is_empty() {
        let merged = merge_flavour_entries(&existing.flavour, &incoming);
        if merged != existing.flavour {
            update.flavour = Some(merged);
        }
    }

    if let Some(brand) = row_str(row, "brand") {
        let brand = brand.trim().to_string();
        if !brand.is_empty() && brand != existing.brand {
            update.brand = Some(brand);
        }
    }

    use rust_decimal::Decimal;
    use rust_decimal::prelude::FromPrimitive;
    if existing.price == Decimal::ZERO
        && let Some(price) = super::row_f64(row, "price")
        && let Some(price) = Decimal::from_f64(price)
        && price > Decimal::ZERO
    {
        update.price = Some(price);
    }
    if existing.stock == 0
        && let Some(stock) = super::row_i64(row, "stock")
        && stock > 0
    {
        update.stock = Some(stock);
    }
    if existing.description.is_empty()
        && let Some(description) = row_str(row, "description")
        && !description.trim().is_empty()
    {
        update.description = Some(description);
    }

    update
}

/// Union persisted flavour entries with incoming `(name, id)` pairs.
///
/// Entries are keyed by flavour id: an incoming pair whose id matches a
/// persisted entry overwrites that entry's name. Id-less incoming pairs are
/// kept as legacy entries, deduplicated against every existing name
/// case-insensitively. Persisted order is preserved; new entries append in
/// file order.
pub fn merge_flavour_entries(
    existing: &[FlavourEntry],
    incoming: &[(String, Option<String>)],
) -> Vec<FlavourEntry> {
    let mut merged: Vec<FlavourEntry> = existing.to_vec();

    for (name, id) in incoming {
        match id {
            Some(id) if !id.is_empty() => {
                if let Some(slot) = merged
                    .iter_mut()
                    .find(|e| e.flavor_id() == Some(id.as_str()))
                {
                    *slot = FlavourEntry::Entry {
                        name: name.clone(),
                        flavor_id: id.clone(),
                    };
                } else {
                    merged.push(FlavourEntry::Entry {
                        name: name.clone(),
                        flavor_id: id.clone(),
                    });
                }
            }
            _ => {
                let already = merged
                    .iter()
                    .any(|e| e.name().eq_ignore_ascii_case(name));
                if !already {
                    merged.push(FlavourEntry::Legacy(name.clone()));
                }
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn dedup_keeps_first_occurrence_and_unions_flavours() {
        let mut rows = vec![
            row(json!({"name": "Lava Flow", "flavour": ["Mango"], "flavour_ids": ["F1"]})),
            row(json!({"name": "lava flow ", "brand": "Naked 100", "flavour": ["Berry"], "flavour_ids": ["F2"]})),
            row(json!({"name": "Other"})),
        ];
        let skipped = dedupe_product_rows(&mut rows);

        assert_eq!(rows.len(), 2);
        assert_eq!(skipped.len(), 1);
        assert!(skipped[&1].contains("Duplicate"));

        let canonical = &rows[0];
        assert_eq!(canonical["flavour"], json!(["Mango", "Berry"]));
        assert_eq!(canonical["flavour_ids"], json!(["F1", "F2"]));
        // Empty brand backfilled from the duplicate
        assert_eq!(canonical["brand"], json!("Naked 100"));
    }

    #[test]
    fn dedup_rows_without_names_pass_through() {
        let mut rows = vec![row(json!({"price": 9.99})), row(json!({"price": 4.99}))];
        let skipped = dedupe_product_rows(&mut rows);
        assert_eq!(rows.len(), 2);
        assert!(skipped.is_empty());
    }

    #[test]
    fn merge_overwrites_same_id_and_keeps_idless_as_legacy() {
        let existing = vec![
            FlavourEntry::Entry {
                name: "Mango".into(),
                flavor_id: "F1".into(),
            },
            FlavourEntry::Legacy("Berry".into()),
        ];
        let incoming = vec![
            ("Mango Ice".to_string(), Some("F1".to_string())),
            ("berry".to_string(), None),
            ("Lime".to_string(), None),
        ];
        let merged = merge_flavour_entries(&existing, &incoming);

        assert_eq!(merged.len(), 3);
        assert_eq!(
            merged[0],
            FlavourEntry::Entry {
                name: "Mango Ice".into(),
                flavor_id: "F1".into()
            }
        );
        // "berry" deduplicated case-insensitively against the legacy entry
        assert_eq!(merged[1], FlavourEntry::Legacy("Berry".into()));
        assert_eq!(merged[2], FlavourEntry::Legacy("Lime".into()));
    }

    #[test]
    fn merge_update_backfills_only_empty_fields() {
        let mut existing = Product::new("Lava Flow".into());
        existing.description = "Coconut pineapple".into();
        existing.stock = 7;

        let r = row(json!({
            "name": "Lava Flow",
            "description": "Should not win",
            "stock": 99,
            "price": 19.99
        }));
        let update = merge_update_for(&existing, &r);

        assert!(update.description.is_none());
        assert!(update.stock.is_none());
        assert_eq!(update.price, Some(rust_decimal::Decimal::new(1999, 2)));
    }
}
