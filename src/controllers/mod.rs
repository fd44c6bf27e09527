//! Controllers
//!
//! # Structure
//!
//! - [`brands`] - admin brand management
//! - [`products`] - admin product management, featured limit, bulk wipe
//! - [`flavours`] - admin flavour management with on-the-fly creation
//! - [`storefront`] - read-only filtering, searching and sorting
//!
//! Admin controllers hold an explicit in-memory snapshot of their collection
//! and `refresh()` it from the store after every mutation or feed event. The
//! storefront functions are pure: they take a snapshot and return views.

pub mod brands;
pub mod flavours;
pub mod products;
pub mod storefront;

pub use brands::BrandAdmin;
pub use flavours::FlavourAdmin;
pub use products::{FEATURED_SOFT_LIMIT, ProductAdmin, WIPE_CONFIRMATION_PHRASE, wipe_catalog};
pub use storefront::{ProductFilter, ProductSort, SortDirection, StorefrontQuery};
