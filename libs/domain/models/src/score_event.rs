// [libs/domain/models/src/score_event.rs]
/*!
 * APARATO: SCORE EVENT ENTITY (APPEND-ONLY)
 * CLASIFICACIÓN: DOMAIN LAYER (ESTRATO L2)
 *
 * Registro inmutable de una sumisión de puntaje, proyectado por el
 * Worker a partir del evento `score.updated`. Los duplicados se
 * toleran: la agregación aguas abajo trata el log como un stream
 * append-only.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEvent {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub leaderboard_id: Uuid,
    pub user_id: String,
    pub score: f64,
    pub increment: bool,
    pub created_at: DateTime<Utc>,
}
