// [libs/domain/models/src/leaderboard.rs]
/*!
 * APARATO: LEADERBOARD ENTITY
 * CLASIFICACIÓN: DOMAIN LAYER (ESTRATO L2)
 *
 * Metadatos de control-plane para un leaderboard. El espacio de
 * nombres del sorted-set vive en la caché (ver `ledger-infra-cache`)
 * y se deriva determinísticamente de `(tenantId, projectId, id)`.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    Replace,
    Increment,
    Best,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub id: Uuid,
    pub project_id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: SortOrder,
    pub update_mode: UpdateMode,
    pub reset_schedule: Option<String>,
    pub ttl_days: Option<i64>,
    pub is_active: bool,
    pub metadata: Value,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaderboardPayload {
    pub name: String,
    pub description: Option<String>,
    pub sort_order: SortOrder,
    pub update_mode: UpdateMode,
    pub ttl_days: Option<i64>,
    pub metadata: Option<Value>,
}

/// Subconjunto mutable por `PUT /leaderboards/{id}`. `None` deja el
/// campo sin cambios.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaderboardPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub update_mode: Option<UpdateMode>,
    pub reset_schedule: Option<String>,
    pub ttl_days: Option<i64>,
    pub is_active: Option<bool>,
    pub metadata: Option<Value>,
}

impl UpdateLeaderboardPayload {
    /// Verdadero si el cambio toca un campo relevante para el hash de
    /// metadatos en la caché, disparando el re-sync hacia el Worker.
    pub fn touches_metadata_hash(&self) -> bool {
        self.name.is_some()
            || self.sort_order.is_some()
            || self.update_mode.is_some()
            || self.ttl_days.is_some()
    }
}
