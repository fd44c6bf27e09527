//! End-to-end import flows against an in-memory store

use serde_json::json;

use flavour_catalog::core::{CatalogState, Config};
use flavour_catalog::import::{ImportService, Row, parse_csv};

async fn test_state() -> CatalogState {
    let mut config = Config::with_work_dir("/tmp/flavour-catalog-test");
    config.import_throttle_ms = 0;
    CatalogState::in_memory(&config)
        .await
        .expect("in-memory store")
}

fn row(value: serde_json::Value) -> Row {
    value.as_object().unwrap().clone()
}

#[tokio::test]
async fn duplicate_rows_in_one_file_collapse_into_one_product() {
    let state = test_state().await;
    let service = ImportService::new(state.clone());

    let rows = vec![
        row(json!({
            "name": "Lava Flow",
            "brand": "Naked 100",
            "flavour": ["Mango"],
            "flavour_ids": ["F1"]
        })),
        row(json!({
            "name": "LAVA FLOW",
            "flavour": ["Berry"],
            "flavour_ids": ["F2"]
        })),
    ];
    let report = service.import_products(rows, None).await.unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);

    let products = state.products().find_all().await.unwrap();
    assert_eq!(products.len(), 1);
    let names: Vec<&str> = products[0].flavour.iter().map(|f| f.name()).collect();
    assert_eq!(names, vec!["Mango", "Berry"]);
}

#[tokio::test]
async fn matching_persisted_product_merges_instead_of_inserting() {
    let state = test_state().await;
    let service = ImportService::new(state.clone());

    // Seed a product with a populated description
    let seed = vec![row(json!({
        "name": "Hawaiian POG",
        "brand": "Naked 100",
        "description": "Passion orange guava"
    }))];
    service.import_products(seed, None).await.unwrap();

    // Same name, different case, conflicting description, new flavour
    let rows = vec![row(json!({
        "name": "  hawaiian pog ",
        "description": "Should not overwrite",
        "flavour": ["Guava"],
        "flavour_ids": ["G1"]
    }))];
    let report = service.import_products(rows, None).await.unwrap();

    assert_eq!(report.imported, 0);
    assert_eq!(report.skipped, 1);

    let products = state.products().find_all().await.unwrap();
    assert_eq!(products.len(), 1);
    let product = &products[0];
    // Populated fields survive; the flavour union lands
    assert_eq!(product.description, "Passion orange guava");
    assert_eq!(product.flavour.len(), 1);
    assert_eq!(product.flavour[0].name(), "Guava");
}

#[tokio::test]
async fn empty_description_is_backfilled_on_merge() {
    let state = test_state().await;
    let service = ImportService::new(state.clone());

    service
        .import_products(vec![row(json!({"name": "Foo"}))], None)
        .await
        .unwrap();
    service
        .import_products(
            vec![row(json!({"name": "foo", "description": "Now described"}))],
            None,
        )
        .await
        .unwrap();

    let products = state.products().find_all().await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].description, "Now described");
}

#[tokio::test]
async fn brands_are_created_but_idless_flavours_are_not() {
    let state = test_state().await;
    let service = ImportService::new(state.clone());

    let rows = vec![row(json!({
        "name": "Peach Pear",
        "brand": "Juice Head",
        "flavour": ["Peach", "Pear"]
    }))];
    service.import_products(rows, None).await.unwrap();

    let brands = state.brands().find_all().await.unwrap();
    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0].name, "Juice Head");

    // Flavour names without ids never become flavour documents
    let flavours = state.flavours().find_all().await.unwrap();
    assert!(flavours.is_empty());

    // They still land on the product as legacy entries
    let products = state.products().find_all().await.unwrap();
    assert_eq!(products[0].flavour.len(), 2);
    assert!(products[0].flavour.iter().all(|f| f.flavor_id().is_none()));
}

#[tokio::test]
async fn flavour_rows_skip_duplicate_product_flavour_pairs() {
    let state = test_state().await;
    let service = ImportService::new(state.clone());

    let rows = vec![
        row(json!({
            "name": "Mango",
            "brand": "Juice Head",
            "flavorId": "F1",
            "productId": "products:p1"
        })),
        row(json!({
            "name": "Mango Again",
            "brand": "Juice Head",
            "flavorId": "F1",
            "productId": "products:p1"
        })),
        // Same flavour id under a different product is legitimate
        row(json!({
            "name": "Mango Elsewhere",
            "brand": "Juice Head",
            "flavorId": "F1",
            "productId": "products:p2"
        })),
    ];
    let report = service.import_flavours(rows, None).await.unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);
}

#[tokio::test]
async fn supplied_created_at_survives_the_import() {
    let state = test_state().await;
    let service = ImportService::new(state.clone());

    let stamp = 1_577_836_800_000_i64;
    let rows = vec![row(json!({
        "name": "Lava Flow",
        "brand": "Naked 100",
        "createdAt": stamp
    }))];
    let report = service.import_products(rows, None).await.unwrap();
    assert_eq!(report.imported, 1);

    let products = state.products().find_all().await.unwrap();
    assert_eq!(products[0].created_at, stamp);

    // A row without the column still gets a server-side stamp
    let brands = state.brands().find_all().await.unwrap();
    assert_eq!(brands.len(), 1);
    assert!(brands[0].created_at > stamp);
}

#[tokio::test]
async fn flavour_rows_without_a_resolvable_product_are_rejected() {
    let state = test_state().await;
    let service = ImportService::new(state.clone());

    // Neither a productId column nor a product name that resolves
    let rows = vec![
        row(json!({"name": "Mango", "brand": "Juice Head", "flavorId": "F1"})),
        row(json!({
            "name": "Berry",
            "brand": "Juice Head",
            "flavorId": "F2",
            "product": "No Such Product"
        })),
    ];
    let report = service.import_flavours(rows, None).await.unwrap();

    assert_eq!(report.imported, 0);
    assert_eq!(report.errors, 2);
    assert!(state.flavours().find_all().await.unwrap().is_empty());

    // In particular, two productless rows sharing a flavorId never persist
    // as a duplicated pair
    let rows = vec![
        row(json!({"name": "One", "brand": "Juice Head", "flavorId": "F1"})),
        row(json!({"name": "Two", "brand": "Juice Head", "flavorId": "F1"})),
    ];
    let report = service.import_flavours(rows, None).await.unwrap();
    assert_eq!(report.imported, 0);
    assert_eq!(report.errors, 2);
    assert!(state.flavours().find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn prefixed_and_raw_product_ids_hit_the_same_uniqueness_pair() {
    let state = test_state().await;
    let service = ImportService::new(state.clone());

    let rows = vec![
        row(json!({
            "name": "Mango",
            "brand": "Juice Head",
            "flavorId": "F1",
            "productId": "products:p1"
        })),
        // Same logical product spelled without the table prefix
        row(json!({
            "name": "Mango Again",
            "brand": "Juice Head",
            "flavorId": "F1",
            "productId": "p1"
        })),
    ];
    let report = service.import_flavours(rows, None).await.unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 1);

    let flavours = state.flavours().find_all().await.unwrap();
    assert_eq!(flavours.len(), 1);
    // Stored in raw form
    assert_eq!(flavours[0].product_id, "p1");
}

#[tokio::test]
async fn progress_reports_every_row_in_order() {
    use std::sync::Mutex;

    let state = test_state().await;
    let service = ImportService::new(state.clone());

    let rows: Vec<Row> = (0..5)
        .map(|i| row(json!({"name": format!("Product {i}")})))
        .collect();

    let seen = Mutex::new(Vec::new());
    let progress = |processed: usize, total: usize| {
        seen.lock().unwrap().push((processed, total));
    };
    service
        .import_products(rows, Some(&progress))
        .await
        .unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen, vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]);
}

#[tokio::test]
async fn dedup_collapsed_rows_still_tick_the_progress_callback() {
    use std::sync::Mutex;

    let state = test_state().await;
    let service = ImportService::new(state.clone());

    let rows = vec![
        row(json!({"name": "Lava Flow", "brand": "Naked 100"})),
        row(json!({"name": "lava flow"})),
    ];

    let seen = Mutex::new(Vec::new());
    let progress = |processed: usize, total: usize| {
        seen.lock().unwrap().push((processed, total));
    };
    let report = service
        .import_products(rows, Some(&progress))
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 1);
    // The collapsed duplicate reports before the surviving row executes
    let seen = seen.into_inner().unwrap();
    assert_eq!(seen, vec![(1, 2), (2, 2)]);
}

#[tokio::test]
async fn csv_file_imports_end_to_end() {
    let state = test_state().await;
    let service = ImportService::new(state.clone());

    let csv = "\
brands_name,brands_description
Twist,Lemonade range
products_name,products_brand,products_price,products_flavour,products_flavor_ids
\"Pink Punch, Iced\",Twist,21.99,\"Pink Punch\",\"T1\"
";
    let parsed = parse_csv(csv).unwrap();
    let report = service.import_all(parsed, None).await.unwrap();

    assert_eq!(report.brands.imported, 1);
    assert_eq!(report.products.imported, 1);
    assert_eq!(report.products.errors, 0);

    let products = state.products().find_all().await.unwrap();
    // Quoted comma preserved in the product name
    assert_eq!(products[0].name, "Pink Punch, Iced");
    assert_eq!(products[0].brand, "Twist");

    let flavours = state.flavours().find_all().await.unwrap();
    assert_eq!(flavours.len(), 1);
    assert_eq!(flavours[0].flavor_id, "T1");
}

#[tokio::test]
async fn import_rows_without_names_count_as_errors_not_aborts() {
    let state = test_state().await;
    let service = ImportService::new(state.clone());

    let rows = vec![
        row(json!({"price": 9.99})),
        row(json!({"name": "Valid Product"})),
    ];
    let report = service.import_products(rows, None).await.unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.errors, 1);
    assert!(report.error_details[0].contains("no name"));
}
