//! Repository Module
//!
//! Per-collection CRUD over the embedded document store. This layer is the
//! catalog store adapter: callers get plain async operations that either
//! succeed or fail with a [`RepoError`]; no retries happen here.

pub mod brand;
pub mod flavour;
pub mod product;
pub mod slider;
pub mod visitor;

// Re-exports
pub use brand::BrandRepository;
pub use flavour::FlavourRepository;
pub use product::ProductRepository;
pub use slider::SliderRepository;
pub use visitor::VisitorRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Thing;
use thiserror::Error;

/// Collection (table) names, matching the persisted collections of the
/// original storefront
pub const BRANDS_TABLE: &str = "brands";
pub const PRODUCTS_TABLE: &str = "products";
pub const FLAVOURS_TABLE: &str = "flavours";
pub const SLIDERS_TABLE: &str = "sliders";
pub const VISITORS_TABLE: &str = "active_visitors";

/// Underlying platform limit on batched deletes
pub const BATCH_DELETE_CHUNK: usize = 500;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Common repository trait for basic CRUD
#[allow(async_fn_in_trait)]
pub trait Repository<T, CreateDto, UpdateDto> {
    async fn find_all(&self) -> RepoResult<Vec<T>>;
    async fn find_by_id(&self, id: &str) -> RepoResult<Option<T>>;
    async fn create(&self, data: CreateDto) -> RepoResult<T>;
    async fn update(&self, id: &str, data: UpdateDto) -> RepoResult<T>;
    async fn delete(&self, id: &str) -> RepoResult<()>;
}

/// Build a `Thing` from a table name and an id that may already carry the
/// `table:` prefix
pub fn make_thing(table: &str, id: &str) -> Thing {
    let pure_id = strip_table_prefix(table, id);
    Thing::from((table.to_string(), pure_id.to_string()))
}

/// Strip a `table:` prefix from an id if present
pub fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(&format!("{table}:") as &str).unwrap_or(id)
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// Delete a set of records from one table, chunked at
    /// [`BATCH_DELETE_CHUNK`] ids per statement.
    ///
    /// Returns the number of chunks that were issued. A failing chunk aborts
    /// the remainder; already-deleted chunks stay deleted (no transaction, by
    /// contract with the underlying store).
    pub async fn batch_delete(&self, table: &str, ids: &[String]) -> RepoResult<usize> {
        let mut chunks = 0;
        for chunk in ids.chunks(BATCH_DELETE_CHUNK) {
            let things: Vec<Thing> = chunk.iter().map(|id| make_thing(table, id)).collect();
            self.db
                .query("DELETE $ids")
                .bind(("ids", things))
                .await?
                .check()?;
            chunks += 1;
        }
        Ok(chunks)
    }

    /// Count all records in a table
    pub async fn count(&self, table: &str) -> RepoResult<usize> {
        #[derive(serde::Deserialize)]
        struct Count {
            count: usize,
        }
        let mut result = self
            .db
            .query(format!("SELECT count() AS count FROM {table} GROUP ALL"))
            .await?;
        let counts: Vec<Count> = result.take(0)?;
        Ok(counts.into_iter().next().map(|c| c.count).unwrap_or(0))
    }

    /// Remove every record of a table (used by the destructive bulk wipe)
    pub async fn delete_all(&self, table: &str) -> RepoResult<()> {
        self.db
            .query(format!("DELETE {table}"))
            .await?
            .check()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_only_for_matching_table() {
        assert_eq!(strip_table_prefix("products", "products:abc"), "abc");
        assert_eq!(strip_table_prefix("products", "abc"), "abc");
        assert_eq!(strip_table_prefix("products", "brands:abc"), "brands:abc");
    }
}
