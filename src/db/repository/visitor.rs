//! Active Visitor Repository
//!
//! Presence docs keyed by session id. Heartbeats upsert; a periodic sweep
//! prunes sessions idle past the TTL.

use super::{BaseRepository, RepoResult, VISITORS_TABLE};
use crate::db::models::ActiveVisitor;
use crate::utils::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct VisitorRepository {
    base: BaseRepository,
}

impl VisitorRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Record a heartbeat for a session, creating its presence doc on first
    /// sight. The session id doubles as the record key.
    pub async fn heartbeat(&self, session_id: &str, page: &str) -> RepoResult<ActiveVisitor> {
        let visitor = ActiveVisitor {
            id: None,
            session_id: session_id.to_string(),
            page: page.to_string(),
            last_seen: now_millis(),
        };
        let saved: Option<ActiveVisitor> = self
            .base
            .db()
            .upsert((VISITORS_TABLE, session_id))
            .content(visitor)
            .await?;
        saved.ok_or_else(|| super::RepoError::Database("Failed to record heartbeat".into()))
    }

    /// Sessions seen within the last `ttl_secs`
    pub async fn find_active(&self, ttl_secs: u64) -> RepoResult<Vec<ActiveVisitor>> {
        let cutoff = now_millis() - (ttl_secs as i64) * 1000;
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM active_visitors WHERE last_seen >= $cutoff")
            .bind(("cutoff", cutoff))
            .await?;
        let visitors: Vec<ActiveVisitor> = result.take(0)?;
        Ok(visitors)
    }

    /// Drop presence docs idle for longer than `ttl_secs`.
    /// Returns how many were pruned.
    pub async fn prune_stale(&self, ttl_secs: u64) -> RepoResult<usize> {
        let cutoff = now_millis() - (ttl_secs as i64) * 1000;
        let mut result = self
            .base
            .db()
            .query("DELETE active_visitors WHERE last_seen < $cutoff RETURN BEFORE")
            .bind(("cutoff", cutoff))
            .await?;
        let pruned: Vec<ActiveVisitor> = result.take(0)?;
        Ok(pruned.len())
    }
}
