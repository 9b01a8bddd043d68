// [libs/domain/models/src/tenant.rs]
/*!
 * APARATO: TENANT ENTITY
 * CLASIFICACIÓN: DOMAIN LAYER (ESTRATO L2)
 *
 * Raíz de propiedad del sistema. Un tenant posee proyectos y, a lo
 * sumo, una suscripción activa. Su borrado es en cascada sobre
 * proyectos, leaderboards, keys y registros de uso.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Carga de creación de un tenant. `email` debe ser único.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantPayload {
    pub name: String,
    pub email: String,
}
