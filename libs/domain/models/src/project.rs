// [libs/domain/models/src/project.rs]
/*!
 * APARATO: PROJECT ENTITY
 * CLASIFICACIÓN: DOMAIN LAYER (ESTRATO L2)
 *
 * Alcance intermedio entre tenant y los recursos operativos
 * (leaderboards, api keys). Toda consulta de scoring o control de
 * leaderboards está acotada a un project_id.
 */

use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    pub tenant_id: Uuid,
    pub name: String,
}
