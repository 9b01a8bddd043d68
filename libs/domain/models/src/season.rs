// [libs/domain/models/src/season.rs]
/*!
 * APARATO: SEASON ENTITY
 * CLASIFICACIÓN: DOMAIN LAYER (ESTRATO L2)
 *
 * Concepto puro de control-plane: no tiene efectos secundarios sobre
 * el sorted-set. Solapamiento entre temporadas se permite; la
 * disciplina de no-solapamiento queda a criterio del llamador.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: Uuid,
    pub leaderboard_id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub metadata: Value,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSeasonPayload {
    pub leaderboard_id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub metadata: Option<Value>,
}
