//! Catalog state: shared handles for every controller and service
//!
//! Replaces the original's ambient module-level globals with one explicit
//! state object: configuration, the embedded store, and the change feed.
//! `Clone` is shallow (Arc-backed), so passing it around is cheap.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::config::Config;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::db::DbService;
use crate::db::repository::{
    BrandRepository, FlavourRepository, ProductRepository, SliderRepository, VisitorRepository,
};
use crate::feed::{ChangeAction, ChangeBus};
use crate::utils::AppError;

#[derive(Clone)]
pub struct CatalogState {
    pub config: Config,
    /// Embedded document store
    pub db: Surreal<Db>,
    /// Change feed the view layer subscribes to
    pub feed: Arc<ChangeBus>,
}

impl CatalogState {
    /// Initialize against the on-disk store under `config.work_dir`
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("catalog.db");
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;

        Ok(Self {
            config: config.clone(),
            db: db_service.db,
            feed: Arc::new(ChangeBus::new()),
        })
    }

    /// Initialize against an in-memory store (tests)
    pub async fn in_memory(config: &Config) -> Result<Self, AppError> {
        let db_service = DbService::memory().await?;
        Ok(Self {
            config: config.clone(),
            db: db_service.db,
            feed: Arc::new(ChangeBus::new()),
        })
    }

    // ── Repository accessors ────────────────────────────────────────

    pub fn brands(&self) -> BrandRepository {
        BrandRepository::new(self.db.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.db.clone())
    }

    pub fn flavours(&self) -> FlavourRepository {
        FlavourRepository::new(self.db.clone())
    }

    pub fn sliders(&self) -> SliderRepository {
        SliderRepository::new(self.db.clone())
    }

    pub fn visitors(&self) -> VisitorRepository {
        VisitorRepository::new(self.db.clone())
    }

    /// Publish a change event to feed subscribers
    pub fn broadcast_change<T: serde::Serialize>(
        &self,
        collection: &str,
        action: ChangeAction,
        id: &str,
        data: Option<&T>,
    ) {
        self.feed.publish(collection, action, id, data);
    }

    /// Start the background tasks. Currently:
    /// - periodic visitor sweep (prunes presence docs idle past the TTL)
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();
        let shutdown = tasks.shutdown_token();

        let visitors = self.visitors();
        let ttl = self.config.visitor_ttl_secs;
        let sweep_secs = self.config.visitor_sweep_secs;
        tasks.spawn("visitor_sweep", TaskKind::Periodic, async move {
            let mut interval =
                tokio::time::interval(std::time::Duration::from_secs(sweep_secs.max(1)));
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        match visitors.prune_stale(ttl).await {
                            Ok(0) => {}
                            Ok(pruned) => {
                                tracing::info!(pruned, "Stale visitor sessions pruned");
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Visitor sweep failed");
                            }
                        }
                    }
                }
            }
        });

        tasks
    }
}
