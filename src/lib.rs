//! Flavour Catalog
//!
//! Embedded product catalog for a flavour-centric storefront: brands,
//! products and per-product flavour variants over an embedded document
//! store, with spreadsheet bulk import, identity reconciliation, catalog
//! export and image resolution.
//!
//! # Structure
//!
//! - [`core`] - configuration, shared state, background tasks
//! - [`db`] - models and repositories over the embedded store
//! - [`import`] - spreadsheet parsing, reconciliation, import execution
//! - [`export`] - JSON and workbook catalog exports
//! - [`images`] - static image catalog and similarity-based resolution
//! - [`controllers`] - admin flows and storefront queries
//! - [`feed`] - collection change feed for view-layer refreshes
//! - [`utils`] - errors, logging, time, validation helpers

pub mod controllers;
pub mod core;
pub mod db;
pub mod export;
pub mod feed;
pub mod images;
pub mod import;
pub mod utils;

pub use controllers::{
    BrandAdmin, FEATURED_SOFT_LIMIT, FlavourAdmin, ProductAdmin, StorefrontQuery,
    WIPE_CONFIRMATION_PHRASE, wipe_catalog,
};
pub use crate::core::{CatalogState, Config};
pub use export::{CatalogExport, export_json, export_xlsx};
pub use feed::{ChangeAction, ChangeBus, ChangeEvent};
pub use images::{ImageKind, ImageResolver};
pub use import::{ImportAllReport, ImportReport, ImportService, parse_import_file};
pub use utils::{AppError, AppResult};
