//! Import Execution
//!
//! Runs the reconciled row plans against the store, strictly in input order,
//! reporting progress after every row and throttling between batches so the
//! UI stays responsive during large files.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::reconcile::{RowPlan, dedupe_product_rows, ensure_brands_and_flavours,
    reconcile_existing_products};
use super::{ParsedWorkbook, Row, row_bool, row_f64, row_flavour_pairs, row_i64, row_str};
use crate::core::CatalogState;
use crate::core::config::IMPORT_THROTTLE_EVERY;
use crate::db::models::{BrandCreate, FlavourCreate, FlavourEntry, ProductCreate, ProductStatus};
use crate::db::repository::{BRANDS_TABLE, FLAVOURS_TABLE, PRODUCTS_TABLE, RepoError};
use crate::feed::ChangeAction;
use crate::utils::{AppError, AppResult};

/// Progress callback: `(rows processed so far, total rows)`
pub type ProgressFn<'a> = dyn Fn(usize, usize) + Send + Sync + 'a;

/// Outcome of importing one collection
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
    pub error_details: Vec<String>,
}

impl ImportReport {
    fn error(&mut self, detail: String) {
        tracing::warn!(detail = %detail, "Import row failed");
        self.errors += 1;
        self.error_details.push(detail);
    }
}

/// Combined outcome of a whole-file import
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportAllReport {
    pub brands: ImportReport,
    pub flavours: ImportReport,
    pub products: ImportReport,
}

/// Bulk import service. One instance per run is fine; all state lives in
/// [`CatalogState`].
pub struct ImportService {
    state: CatalogState,
}

impl ImportService {
    pub fn new(state: CatalogState) -> Self {
        Self { state }
    }

    /// Import a parsed file in dependency order: brands, flavours, products.
    /// Each collection reports independently; a failed row never aborts the
    /// run.
    pub async fn import_all(
        &self,
        parsed: ParsedWorkbook,
        progress: Option<&ProgressFn<'_>>,
    ) -> AppResult<ImportAllReport> {
        let total = parsed.total_rows();
        let mut processed = 0usize;

        let tick = |processed: usize| {
            if let Some(f) = progress {
                f(processed, total);
            }
        };

        let brands = self
            .import_brands_inner(parsed.brands, &mut processed, &tick)
            .await?;
        let flavours = self
            .import_flavours_inner(parsed.flavours, &mut processed, &tick)
            .await?;
        let products = self
            .import_products_inner(parsed.products, &mut processed, &tick)
            .await?;

        tracing::info!(
            brands_imported = brands.imported,
            flavours_imported = flavours.imported,
            products_imported = products.imported,
            total_errors = brands.errors + flavours.errors + products.errors,
            "Import run finished"
        );

        Ok(ImportAllReport {
            brands,
            flavours,
            products,
        })
    }

    pub async fn import_products(
        &self,
        rows: Vec<Row>,
        progress: Option<&ProgressFn<'_>>,
    ) -> AppResult<ImportReport> {
        let total = rows.len();
        let mut processed = 0usize;
        let tick = |processed: usize| {
            if let Some(f) = progress {
                f(processed, total);
            }
        };
        self.import_products_inner(rows, &mut processed, &tick)
            .await
    }

    pub async fn import_brands(
        &self,
        rows: Vec<Row>,
        progress: Option<&ProgressFn<'_>>,
    ) -> AppResult<ImportReport> {
        let total = rows.len();
        let mut processed = 0usize;
        let tick = |processed: usize| {
            if let Some(f) = progress {
                f(processed, total);
            }
        };
        self.import_brands_inner(rows, &mut processed, &tick)
            .await
    }

    pub async fn import_flavours(
        &self,
        rows: Vec<Row>,
        progress: Option<&ProgressFn<'_>>,
    ) -> AppResult<ImportReport> {
        let total = rows.len();
        let mut processed = 0usize;
        let tick = |processed: usize| {
            if let Some(f) = progress {
                f(processed, total);
            }
        };
        self.import_flavours_inner(rows, &mut processed, &tick)
            .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    async fn import_products_inner(
        &self,
        mut rows: Vec<Row>,
        processed: &mut usize,
        tick: &dyn Fn(usize),
    ) -> AppResult<ImportReport> {
        let mut report = ImportReport::default();

        // Step 1: collapse duplicates inside the file
        let original_len = rows.len();
        let dedup_skips: HashMap<usize, String> = dedupe_product_rows(&mut rows);
        // Collapsed rows still count as processed, one tick each
        for reason in dedup_skips.values() {
            tracing::info!(reason = %reason, "Product row skipped");
            report.skipped += 1;
            *processed += 1;
            tick(*processed);
        }
        debug_assert_eq!(original_len, rows.len() + dedup_skips.len());

        // Steps 2 and 3: referenced brands and flavours must exist first
        let mut ensure_errors = Vec::new();
        ensure_brands_and_flavours(&self.state, &rows, &mut ensure_errors).await?;
        for detail in ensure_errors {
            report.error(detail);
        }

        // Step 4: match against persisted products
        let plans = reconcile_existing_products(&self.state, &rows).await?;

        let repo = self.state.products();
        for (row, plan) in rows.into_iter().zip(plans) {
            *processed += 1;
            match self.execute_product_plan(&repo, &row, plan, &mut report).await {
                Ok(()) => {}
                Err(e) => {
                    let name = row_str(&row, "name").unwrap_or_default();
                    report.error(format!("Product '{name}': {e}"));
                }
            }
            tick(*processed);
            self.throttle(*processed).await;
        }

        Ok(report)
    }

    async fn execute_product_plan(
        &self,
        repo: &crate::db::repository::ProductRepository,
        row: &Row,
        plan: RowPlan,
        report: &mut ImportReport,
    ) -> AppResult<()> {
        let Some(name) = row_str(row, "name").filter(|n| !n.trim().is_empty()) else {
            report.error("Product row has no name".to_string());
            return Ok(());
        };

        match plan {
            RowPlan::Merge { id, update } => {
                repo.update(&id, update).await?;
                let updated = repo.find_by_id(&id).await?;
                self.state.broadcast_change(
                    PRODUCTS_TABLE,
                    ChangeAction::Updated,
                    &id,
                    updated.as_ref(),
                );
                tracing::info!(product = %name, "Existing product merged");
                report.skipped += 1;
            }
            RowPlan::Insert => {
                // Rows earlier in this run may have created the product
                if let Some(existing) = repo.find_by_name_ci(&name).await? {
                    let id = existing
                        .id
                        .as_ref()
                        .map(|t| t.id.to_raw())
                        .unwrap_or_default();
                    tracing::info!(product = %name, id = %id, "Product appeared mid-run, skipping insert");
                    report.skipped += 1;
                    return Ok(());
                }

                let create = product_create_from_row(row, name.clone())?;
                let created = repo.create(create).await?;
                let id = created
                    .id
                    .as_ref()
                    .map(|t| t.id.to_raw())
                    .unwrap_or_default();
                self.state.broadcast_change(
                    PRODUCTS_TABLE,
                    ChangeAction::Created,
                    &id,
                    Some(&created),
                );
                report.imported += 1;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Brands
    // =========================================================================

    async fn import_brands_inner(
        &self,
        rows: Vec<Row>,
        processed: &mut usize,
        tick: &dyn Fn(usize),
    ) -> AppResult<ImportReport> {
        let mut report = ImportReport::default();
        let repo = self.state.brands();

        for row in rows {
            *processed += 1;

            let name = row_str(&row, "name").unwrap_or_default();
            if name.trim().is_empty() {
                report.error("Brand row has no name".to_string());
                tick(*processed);
                continue;
            }

            // The only skip condition is an explicit id that already exists;
            // name collisions insert anyway (duplicate brand names are the
            // operator's problem to clean up, not the importer's)
            let explicit_id = row_str(&row, "id").filter(|id| !id.trim().is_empty());
            if let Some(id) = explicit_id
                && repo.find_by_id(&id).await?.is_some()
            {
                tracing::info!(brand = %name, id = %id, "Brand id already present, skipping");
                report.skipped += 1;
                tick(*processed);
                continue;
            }

            let create = BrandCreate {
                name: name.trim().to_string(),
                description: row_str(&row, "description"),
                display_order: row_i64(&row, "displayOrder").map(|v| v as i32),
                created_at: row_i64(&row, "createdAt"),
            };
            match repo.insert(create).await {
                Ok(created) => {
                    let id = created
                        .id
                        .as_ref()
                        .map(|t| t.id.to_raw())
                        .unwrap_or_default();
                    self.state.broadcast_change(
                        BRANDS_TABLE,
                        ChangeAction::Created,
                        &id,
                        Some(&created),
                    );
                    report.imported += 1;
                }
                Err(e) => report.error(format!("Brand '{name}': {e}")),
            }

            tick(*processed);
            self.throttle(*processed).await;
        }

        Ok(report)
    }

    // =========================================================================
    // Flavours
    // =========================================================================

    async fn import_flavours_inner(
        &self,
        rows: Vec<Row>,
        processed: &mut usize,
        tick: &dyn Fn(usize),
    ) -> AppResult<ImportReport> {
        let mut report = ImportReport::default();
        let repo = self.state.flavours();
        let products = self.state.products();

        for row in rows {
            *processed += 1;

            let name = row_str(&row, "name").unwrap_or_default();
            let flavor_id = row_str(&row, "flavorId").unwrap_or_default();
            if name.trim().is_empty() || flavor_id.trim().is_empty() {
                report.error(format!(
                    "Flavour row needs both name and flavorId (got name='{name}')"
                ));
                tick(*processed);
                continue;
            }

            // An identical flavour is a re-import, not an error
            let brand = row_str(&row, "brand").unwrap_or_default();
            if let Some(existing) = repo.find_by_brand_and_name(&brand, name.trim()).await?
                && existing.flavor_id == flavor_id.trim()
            {
                tracing::info!(flavour = %name, brand = %brand, "Flavour already present, skipping");
                report.skipped += 1;
                tick(*processed);
                continue;
            }

            // productId may come directly or via a product name column; a
            // flavour that resolves to no product cannot participate in the
            // pair-uniqueness check, so the row is rejected
            let mut product_id = row_str(&row, "productId").unwrap_or_default();
            if product_id.trim().is_empty()
                && let Some(product_name) = row_str(&row, "product")
                && let Some(product) = products.find_by_name_ci(&product_name).await?
            {
                product_id = product
                    .id
                    .as_ref()
                    .map(|t| t.id.to_raw())
                    .unwrap_or_default();
            }
            if product_id.trim().is_empty() {
                report.error(format!(
                    "Flavour '{name}': no productId and no resolvable product name"
                ));
                tick(*processed);
                continue;
            }

            let create = FlavourCreate {
                name: name.trim().to_string(),
                brand: row_str(&row, "brand"),
                flavor_id: Some(flavor_id.trim().to_string()),
                product_id: Some(product_id),
                image: row_str(&row, "image"),
                created_at: row_i64(&row, "createdAt"),
            };
            match repo.create(create).await {
                Ok(created) => {
                    let id = created
                        .id
                        .as_ref()
                        .map(|t| t.id.to_raw())
                        .unwrap_or_default();
                    self.state.broadcast_change(
                        FLAVOURS_TABLE,
                        ChangeAction::Created,
                        &id,
                        Some(&created),
                    );
                    report.imported += 1;
                }
                // The uniqueness pair already exists: a skip, not an error
                Err(RepoError::Duplicate(msg)) => {
                    tracing::info!(flavour = %name, reason = %msg, "Duplicate flavour skipped");
                    report.skipped += 1;
                }
                Err(e) => report.error(format!("Flavour '{name}': {e}")),
            }

            tick(*processed);
            self.throttle(*processed).await;
        }

        Ok(report)
    }

    /// Yield between batches so long imports do not starve everything else
    async fn throttle(&self, processed: usize) {
        if processed > 0
            && processed % IMPORT_THROTTLE_EVERY == 0
            && self.state.config.import_throttle_ms > 0
        {
            tokio::time::sleep(Duration::from_millis(self.state.config.import_throttle_ms)).await;
        }
    }
}

/// Build the insert payload for a fresh product row
fn product_create_from_row(row: &Row, name: String) -> AppResult<ProductCreate> {
    use rust_decimal::Decimal;
    use rust_decimal::prelude::FromPrimitive;

    let price = match row_f64(row, "price") {
        Some(p) if p < 0.0 => {
            return Err(AppError::validation(format!(
                "Product '{name}': price must be >= 0"
            )));
        }
        Some(p) => Decimal::from_f64(p),
        None => None,
    };

    let flavour: Vec<FlavourEntry> = row_flavour_pairs(row)
        .into_iter()
        .map(|(flavour_name, id)| match id {
            Some(flavor_id) => FlavourEntry::Entry {
                name: flavour_name,
                flavor_id,
            },
            None => FlavourEntry::Legacy(flavour_name),
        })
        .collect();

    let status = row_str(row, "status").and_then(|s| {
        serde_json::from_value::<ProductStatus>(Value::String(s.trim().to_string())).ok()
    });

    Ok(ProductCreate {
        name: name.trim().to_string(),
        price,
        brand: row_str(row, "brand").map(|b| b.trim().to_string()),
        flavour: if flavour.is_empty() {
            None
        } else {
            Some(flavour)
        },
        description: row_str(row, "description"),
        stock: row_i64(row, "stock"),
        status,
        featured: row_bool(row, "featured"),
        image: row_str(row, "image"),
        created_at: row_i64(row, "createdAt"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn product_create_maps_positional_flavour_pairs() {
        let r = row(json!({
            "name": "Lava Flow",
            "brand": "Naked 100",
            "price": 24.99,
            "flavour": ["Mango", "Berry"],
            "flavour_ids": ["F1"]
        }));
        let create = product_create_from_row(&r, "Lava Flow".into()).unwrap();
        assert_eq!(
            create.flavour.unwrap(),
            vec![
                FlavourEntry::Entry {
                    name: "Mango".into(),
                    flavor_id: "F1".into()
                },
                FlavourEntry::Legacy("Berry".into()),
            ]
        );
    }

    #[test]
    fn product_create_rejects_negative_price() {
        let r = row(json!({"name": "X", "price": -1.0}));
        assert!(matches!(
            product_create_from_row(&r, "X".into()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn product_status_parses_display_strings() {
        let r = row(json!({"name": "X", "status": "Out of Stock"}));
        let create = product_create_from_row(&r, "X".into()).unwrap();
        assert_eq!(create.status, Some(ProductStatus::OutOfStock));
    }
}
