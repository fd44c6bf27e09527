//! Catalog Export
//!
//! Serializes the whole catalog either as a versioned JSON document (the
//! backup format the importer can read back) or as a workbook with one sheet
//! per collection for spreadsheet round-trips.

use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};

use crate::core::CatalogState;
use crate::db::models::{Brand, Flavour, Product};
use crate::utils::{AppError, AppResult, iso_now};

/// Format version written into every export; bump on breaking shape changes
pub const EXPORT_VERSION: u32 = 1;

/// Full catalog snapshot
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogExport {
    pub version: u32,
    pub exported_at: String,
    pub brands: Vec<Brand>,
    pub products: Vec<Product>,
    pub flavours: Vec<Flavour>,
}

/// Snapshot the store into an export document
pub async fn snapshot(state: &CatalogState) -> AppResult<CatalogExport> {
    Ok(CatalogExport {
        version: EXPORT_VERSION,
        exported_at: iso_now(),
        brands: state.brands().find_all().await?,
        products: state.products().find_all().await?,
        flavours: state.flavours().find_all().await?,
    })
}

/// Export the catalog as pretty-printed JSON
pub async fn export_json(state: &CatalogState) -> AppResult<String> {
    let export = snapshot(state).await?;
    serde_json::to_string_pretty(&export)
        .map_err(|e| AppError::internal(format!("Export serialization failed: {e}")))
}

/// Export the catalog as an `.xlsx` workbook with `products`, `brands` and
/// `flavours` sheets. Flavour entry lists flatten into comma-joined parallel
/// name and id columns, the inverse of the import parser's positional split.
pub async fn export_xlsx(state: &CatalogState) -> AppResult<Vec<u8>> {
    let export = snapshot(state).await?;
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    write_products_sheet(&mut workbook, &header, &export.products)?;
    write_brands_sheet(&mut workbook, &header, &export.brands)?;
    write_flavours_sheet(&mut workbook, &header, &export.flavours)?;

    workbook
        .save_to_buffer()
        .map_err(|e| AppError::internal(format!("Workbook write failed: {e}")))
}

fn write_products_sheet(
    workbook: &mut Workbook,
    header: &Format,
    products: &[Product],
) -> AppResult<()> {
    let sheet = workbook.add_worksheet();
    sheet
        .set_name("products")
        .map_err(|e| AppError::internal(format!("Workbook write failed: {e}")))?;

    let headers = [
        "name", "brand", "price", "stock", "status", "featured", "description", "image",
        "flavour", "flavour_ids",
    ];
    for (col, title) in headers.iter().enumerate() {
        sheet
            .write_with_format(0, col as u16, *title, header)
            .map_err(|e| AppError::internal(format!("Workbook write failed: {e}")))?;
    }

    for (i, product) in products.iter().enumerate() {
        let r = (i + 1) as u32;
        let status = serde_json::to_value(product.status)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let names: Vec<&str> = product.flavour.iter().map(|f| f.name()).collect();
        let ids: Vec<&str> = product
            .flavour
            .iter()
            .map(|f| f.flavor_id().unwrap_or(""))
            .collect();

        sheet
            .write(r, 0, product.name.clone())
            .and_then(|s| s.write(r, 1, product.brand.clone()))
            .and_then(|s| s.write(r, 2, product.price.to_string()))
            .and_then(|s| s.write(r, 3, product.stock.to_string()))
            .and_then(|s| s.write(r, 4, status))
            .and_then(|s| s.write(r, 5, product.featured.to_string()))
            .and_then(|s| s.write(r, 6, product.description.clone()))
            .and_then(|s| s.write(r, 7, product.image.clone()))
            .and_then(|s| s.write(r, 8, names.join(", ")))
            .and_then(|s| s.write(r, 9, ids.join(", ")))
            .map_err(|e| AppError::internal(format!("Workbook write failed: {e}")))?;
    }
    Ok(())
}

fn write_brands_sheet(
    workbook: &mut Workbook,
    header: &Format,
    brands: &[Brand],
) -> AppResult<()> {
    let sheet = workbook.add_worksheet();
    sheet
        .set_name("brands")
        .map_err(|e| AppError::internal(format!("Workbook write failed: {e}")))?;

    // The id column makes re-importing an export a no-op for brands
    for (col, title) in ["id", "name", "description", "display_order"]
        .iter()
        .enumerate()
    {
        sheet
            .write_with_format(0, col as u16, *title, header)
            .map_err(|e| AppError::internal(format!("Workbook write failed: {e}")))?;
    }
    for (i, brand) in brands.iter().enumerate() {
        let r = (i + 1) as u32;
        let id = brand
            .id
            .as_ref()
            .map(|t| t.id.to_raw())
            .unwrap_or_default();
        sheet
            .write(r, 0, id)
            .and_then(|s| s.write(r, 1, brand.name.clone()))
            .and_then(|s| s.write(r, 2, brand.description.clone()))
            .and_then(|s| s.write(r, 3, brand.display_order as f64))
            .map_err(|e| AppError::internal(format!("Workbook write failed: {e}")))?;
    }
    Ok(())
}

fn write_flavours_sheet(
    workbook: &mut Workbook,
    header: &Format,
    flavours: &[Flavour],
) -> AppResult<()> {
    let sheet = workbook.add_worksheet();
    sheet
        .set_name("flavours")
        .map_err(|e| AppError::internal(format!("Workbook write failed: {e}")))?;

    for (col, title) in ["name", "brand", "flavor_id", "product_id", "image"]
        .iter()
        .enumerate()
    {
        sheet
            .write_with_format(0, col as u16, *title, header)
            .map_err(|e| AppError::internal(format!("Workbook write failed: {e}")))?;
    }
    for (i, flavour) in flavours.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet
            .write(r, 0, flavour.name.clone())
            .and_then(|s| s.write(r, 1, flavour.brand.clone()))
            .and_then(|s| s.write(r, 2, flavour.flavor_id.clone()))
            .and_then(|s| s.write(r, 3, flavour.product_id.clone()))
            .and_then(|s| s.write(r, 4, flavour.image.clone()))
            .map_err(|e| AppError::internal(format!("Workbook write failed: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_document_round_trips_through_json() {
        let export = CatalogExport {
            version: EXPORT_VERSION,
            exported_at: iso_now(),
            brands: vec![Brand::new("Naked 100".into())],
            products: vec![Product::new("Lava Flow".into())],
            flavours: vec![Flavour::new("Mango".into(), "Naked 100".into())],
        };
        let json = serde_json::to_string(&export).unwrap();
        let back: CatalogExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, EXPORT_VERSION);
        assert_eq!(back.brands[0].name, "Naked 100");
        assert_eq!(back.products[0].name, "Lava Flow");
        assert_eq!(back.flavours[0].name, "Mango");
    }
}
