// [libs/domain/models/src/events.rs]
/*!
 * APARATO: STREAM EVENT PAYLOADS
 * CLASIFICACIÓN: DOMAIN LAYER (ESTRATO L2)
 *
 * Formas exactas de §6.4: publicadas por el Gateway hacia el stream
 * durable y consumidas por el Worker. Sin orden global; los
 * duplicados se tratan como válidos (at-least-once).
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

use crate::leaderboard::{SortOrder, UpdateMode};

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdatedEvent {
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub leaderboard_id: Uuid,
    pub user_id: String,
    pub score: f64,
    pub increment: bool,
    pub timestamp: DateTime<Utc>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardCreatedEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub leaderboard_id: Uuid,
    pub project_id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub sort_order: SortOrder,
    pub update_mode: UpdateMode,
    pub ttl_days: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardDeletedEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub leaderboard_id: Uuid,
    pub project_id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

/// Subject + payload, tal como se serializa en un único campo `data`
/// de la entrada del stream (`XADD`). El Worker despacha por `subject`.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "subject", rename_all = "snake_case")]
pub enum StreamEvent {
    #[serde(rename = "score.updated")]
    ScoreUpdated(ScoreUpdatedEvent),
    #[serde(rename = "leaderboard.created")]
    LeaderboardCreated(LeaderboardCreatedEvent),
    #[serde(rename = "leaderboard.deleted")]
    LeaderboardDeleted(LeaderboardDeletedEvent),
}

impl StreamEvent {
    /// Nombre del subject, usado como clave de despacho del Worker y
    /// como sufijo del nombre de stream Redis.
    pub fn subject(&self) -> &'static str {
        match self {
            StreamEvent::ScoreUpdated(_) => "score.updated",
            StreamEvent::LeaderboardCreated(_) => "leaderboard.created",
            StreamEvent::LeaderboardDeleted(_) => "leaderboard.deleted",
        }
    }
}
