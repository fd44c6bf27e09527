//! Export snapshots and their round-trip back through the importer

use serde_json::json;
use std::collections::BTreeSet;

use flavour_catalog::core::{CatalogState, Config};
use flavour_catalog::export::{self, CatalogExport, EXPORT_VERSION};
use flavour_catalog::import::{ImportService, Row, parse_workbook};

async fn test_state() -> CatalogState {
    let mut config = Config::with_work_dir("/tmp/flavour-catalog-export-test");
    config.import_throttle_ms = 0;
    CatalogState::in_memory(&config)
        .await
        .expect("in-memory store")
}

fn row(value: serde_json::Value) -> Row {
    value.as_object().unwrap().clone()
}

async fn seed(state: &CatalogState) {
    let service = ImportService::new(state.clone());
    let rows = vec![
        row(json!({
            "name": "Lava Flow",
            "brand": "Naked 100",
            "price": 24.99,
            "flavour": ["Coconut", "Pineapple"],
            "flavour_ids": ["N1", "N2"]
        })),
        row(json!({
            "name": "Blue Raz Ice",
            "brand": "Coastal Clouds",
            "price": 15.99,
            "flavour": ["Blue Raspberry"],
            "flavour_ids": ["C1"]
        })),
    ];
    let report = service.import_products(rows, None).await.unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.errors, 0);
}

#[tokio::test]
async fn json_export_carries_version_and_every_collection() {
    let state = test_state().await;
    seed(&state).await;

    let json_text = export::export_json(&state).await.unwrap();
    let export: CatalogExport = serde_json::from_str(&json_text).unwrap();

    assert_eq!(export.version, EXPORT_VERSION);
    assert_eq!(export.products.len(), 2);
    assert_eq!(export.brands.len(), 2);
    assert_eq!(export.flavours.len(), 3);
    assert!(!export.exported_at.is_empty());
}

#[tokio::test]
async fn xlsx_export_reimports_with_the_same_name_sets() {
    let state = test_state().await;
    seed(&state).await;

    let bytes = export::export_xlsx(&state).await.unwrap();
    let parsed = parse_workbook(&bytes).unwrap();
    assert_eq!(parsed.products.len(), 2);
    assert_eq!(parsed.brands.len(), 2);
    assert_eq!(parsed.flavours.len(), 3);

    // Import the workbook into a fresh store
    let fresh = test_state().await;
    let service = ImportService::new(fresh.clone());
    let report = service.import_all(parsed, None).await.unwrap();

    // Brand-level flavour docs export without an owning product, so their
    // rows are rejected; the same flavours re-enter through the product
    // rows' ensure step
    assert_eq!(report.flavours.imported, 0);
    assert_eq!(report.flavours.errors, 3);
    assert_eq!(fresh.flavours().find_all().await.unwrap().len(), 3);

    let names = |p: &[flavour_catalog::db::models::Product]| -> BTreeSet<String> {
        p.iter().map(|x| x.name.clone()).collect()
    };
    let original = state.products().find_all().await.unwrap();
    let round_tripped = fresh.products().find_all().await.unwrap();
    assert_eq!(names(&original), names(&round_tripped));

    let brand_names: BTreeSet<String> = fresh
        .brands()
        .find_all()
        .await
        .unwrap()
        .iter()
        .map(|b| b.name.clone())
        .collect();
    assert_eq!(
        brand_names,
        BTreeSet::from(["Naked 100".to_string(), "Coastal Clouds".to_string()])
    );
}

#[tokio::test]
async fn reimporting_an_export_into_the_same_store_changes_nothing() {
    let state = test_state().await;
    seed(&state).await;

    let bytes = export::export_xlsx(&state).await.unwrap();
    let parsed = parse_workbook(&bytes).unwrap();
    let service = ImportService::new(state.clone());
    let report = service.import_all(parsed, None).await.unwrap();

    // Brands skip on their exported ids, flavours on brand+name+id, and
    // every product matches itself by name and merges instead of inserting
    assert_eq!(report.brands.imported, 0);
    assert_eq!(report.brands.skipped, 2);
    assert_eq!(report.flavours.imported, 0);
    assert_eq!(report.flavours.skipped, 3);
    assert_eq!(report.products.imported, 0);
    assert_eq!(report.products.skipped, 2);

    let products = state.products().find_all().await.unwrap();
    assert_eq!(products.len(), 2);
    // Flavour entries did not duplicate on the merge
    for product in &products {
        let ids: BTreeSet<_> = product
            .flavour
            .iter()
            .filter_map(|f| f.flavor_id())
            .collect();
        assert_eq!(ids.len(), product.flavour.len());
    }
}
