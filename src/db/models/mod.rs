//! Database Models

// Serde helpers
pub mod serde_thing;

// Catalog domain
pub mod brand;
pub mod flavour;
pub mod product;

// Storefront ancillary
pub mod slider;
pub mod visitor;

// Re-exports
pub use brand::{Brand, BrandCreate, BrandId, BrandUpdate, FlavourRef};
pub use flavour::{Flavour, FlavourCreate, FlavourId, FlavourUpdate};
pub use product::{
    FlavourEntry, Product, ProductCreate, ProductId, ProductStatus, ProductUpdate,
};
pub use slider::{SLIDER_DOC_ID, SliderDoc};
pub use visitor::ActiveVisitor;
