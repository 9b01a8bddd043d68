// [libs/domain/models/src/api_key.rs]
/*!
 * APARATO: API KEY ENTITY
 * CLASIFICACIÓN: DOMAIN LAYER (ESTRATO L2)
 *
 * El texto plano de una key NUNCA se persiste; solo `key_hash`
 * sobrevive. Exactamente una key utilizable por `id` en cualquier
 * momento: la rotación es revoke-then-create, no un update in place.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyPayload {
    pub project_id: Uuid,
    pub name: String,
}

/// Respuesta única: la única ocasión en que el texto plano de la key
/// es visible. El llamador debe almacenarlo; el servidor no lo retiene.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub plaintext: String,
    pub created_at: DateTime<Utc>,
}

/// Resultado de `ValidateApiKey`. `valid=false` no distingue entre
/// "no existe" y "revocada": ambas son `Unauthenticated` en el Gateway.
#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyValidation {
    pub valid: bool,
    pub tenant_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub plan_type: Option<crate::subscription::PlanType>,
}

impl ApiKeyValidation {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            tenant_id: None,
            project_id: None,
            plan_type: None,
        }
    }
}
