//! Active Visitor Model
//!
//! Ephemeral presence documents keyed by session id. A periodic sweep prunes
//! documents whose `last_seen` is older than the configured TTL (90 s by
//! default).

use super::serde_thing;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveVisitor {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_thing::option"
    )]
    pub id: Option<Thing>,
    /// Browser session id (uuid v4)
    pub session_id: String,
    /// Page the visitor last reported from
    #[serde(default)]
    pub page: String,
    /// Unix millis of the last heartbeat
    pub last_seen: i64,
}
