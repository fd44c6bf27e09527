//! Admin controller flows, ancillary collections and on-disk initialization

use flavour_catalog::controllers::{
    FEATURED_SOFT_LIMIT, ProductAdmin, WIPE_CONFIRMATION_PHRASE, wipe_catalog,
};
use flavour_catalog::core::{CatalogState, Config};
use flavour_catalog::db::models::{BrandCreate, FlavourCreate, ProductCreate, SliderDoc};
use flavour_catalog::utils::AppError;

async fn test_state() -> CatalogState {
    let config = Config::with_work_dir("/tmp/flavour-catalog-admin-test");
    CatalogState::in_memory(&config)
        .await
        .expect("in-memory store")
}

fn product(name: &str, featured: bool) -> ProductCreate {
    ProductCreate {
        name: name.into(),
        price: None,
        brand: None,
        flavour: None,
        description: None,
        stock: None,
        status: None,
        featured: Some(featured),
        image: None,
        created_at: None,
    }
}

#[tokio::test]
async fn on_disk_store_opens_under_the_work_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_work_dir(dir.path().to_string_lossy().to_string());
    let state = CatalogState::initialize(&config).await.unwrap();

    state
        .brands()
        .create(BrandCreate {
            name: "Naked 100".into(),
            description: None,
            display_order: None,
            created_at: None,
        })
        .await
        .unwrap();
    assert_eq!(state.brands().find_all().await.unwrap().len(), 1);
    assert!(config.database_dir().exists());
}

#[tokio::test]
async fn featuring_past_the_soft_limit_needs_confirmation() {
    let state = test_state().await;
    let mut admin = ProductAdmin::new(state.clone()).await.unwrap();

    for i in 0..FEATURED_SOFT_LIMIT {
        admin.create(product(&format!("Featured {i}"), true)).await.unwrap();
    }
    let next = admin.create(product("One More", false)).await.unwrap();
    let id = next.id.as_ref().unwrap().id.to_raw();

    let denied = admin.set_featured(&id, true, false).await;
    assert!(matches!(denied, Err(AppError::BusinessRule(_))));

    let allowed = admin.set_featured(&id, true, true).await.unwrap();
    assert!(allowed.featured);
    assert_eq!(
        state.products().count_featured().await.unwrap(),
        FEATURED_SOFT_LIMIT + 1
    );

    // Un-featuring is never guarded
    admin.set_featured(&id, false, false).await.unwrap();
}

#[tokio::test]
async fn wipe_requires_the_exact_phrase_and_empties_every_collection() {
    let state = test_state().await;
    let mut admin = ProductAdmin::new(state.clone()).await.unwrap();
    admin.create(product("Doomed", false)).await.unwrap();
    state
        .brands()
        .create(BrandCreate {
            name: "Doomed Brand".into(),
            description: None,
            display_order: None,
            created_at: None,
        })
        .await
        .unwrap();
    state
        .flavours()
        .create(FlavourCreate {
            name: "Doomed Flavour".into(),
            brand: Some("Doomed Brand".into()),
            flavor_id: Some("D1".into()),
            product_id: None,
            image: None,
            created_at: None,
        })
        .await
        .unwrap();

    let denied = wipe_catalog(&state, "delete all products").await;
    assert!(matches!(denied, Err(AppError::Validation(_))));
    assert_eq!(state.products().find_all().await.unwrap().len(), 1);

    wipe_catalog(&state, WIPE_CONFIRMATION_PHRASE).await.unwrap();
    assert!(state.products().find_all().await.unwrap().is_empty());
    assert!(state.brands().find_all().await.unwrap().is_empty());
    assert!(state.flavours().find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn mutations_publish_to_the_change_feed() {
    let state = test_state().await;
    let mut rx = state.feed.subscribe();
    let mut admin = ProductAdmin::new(state.clone()).await.unwrap();

    admin.create(product("Watched", false)).await.unwrap();
    let event = rx.recv().await.unwrap();
    assert_eq!(event.collection, "products");
    assert_eq!(event.version, 1);
    assert!(event.data.is_some());
}

#[tokio::test]
async fn slider_doc_keeps_numeric_image_order() {
    let state = test_state().await;
    let sliders = state.sliders();

    let mut doc = SliderDoc::default();
    doc.set_image(10, "images/s10.jpg");
    doc.set_image(2, "images/s2.jpg");
    doc.set_image(1, "images/s1.jpg");
    sliders.set(doc).await.unwrap();

    let stored = sliders.get().await.unwrap();
    assert_eq!(
        stored.ordered_images(),
        vec!["images/s1.jpg", "images/s2.jpg", "images/s10.jpg"]
    );

    sliders.set_image(3, "images/s3.jpg").await.unwrap();
    assert_eq!(sliders.get().await.unwrap().ordered_images().len(), 4);
}

#[tokio::test]
async fn stale_visitors_are_pruned_and_active_ones_kept() {
    let state = test_state().await;
    let visitors = state.visitors();

    visitors.heartbeat("session-a", "/products").await.unwrap();
    visitors.heartbeat("session-b", "/brands").await.unwrap();
    // Second heartbeat for the same session upserts, never duplicates
    visitors.heartbeat("session-a", "/checkout").await.unwrap();

    let active = visitors.find_active(90).await.unwrap();
    assert_eq!(active.len(), 2);

    // A zero TTL makes every already-recorded heartbeat stale
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let pruned = visitors.prune_stale(0).await.unwrap();
    assert_eq!(pruned, 2);
    assert!(visitors.find_active(90).await.unwrap().is_empty());
}
