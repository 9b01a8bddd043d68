// [libs/infra/db/src/repositories/api_key.rs]
/*!
 * APARATO: API KEY REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE CLAVES Y SOPORTE A VALIDACIÓN
 *
 * El repositorio nunca ve el texto plano: recibe `key_hash` ya
 * calculado por la capa de servicio del Gateway (bcrypt, work factor
 * ≥ 10). `find_all_active` existe para soportar `ValidateApiKey`,
 * que no conoce el tenant de antemano y debe iterar el conjunto
 * revocado-filtrado-primero comparando en tiempo constante (§4.1).
 */

use crate::errors::DbError;
use crate::RelationalClient;
use chrono::Utc;
use ledger_domain_models::ApiKey;
use libsql::params;
use tracing::instrument;
use uuid::Uuid;

pub struct ApiKeyRepository {
    database_client: RelationalClient,
}

impl ApiKeyRepository {
    pub fn new(client: RelationalClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self, key_hash))]
    pub async fn create(&self, project_id: Uuid, name: &str, key_hash: &str) -> Result<ApiKey, DbError> {
        let connection = self.database_client.get_connection()?;
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        connection
            .execute(
                "INSERT INTO api_keys (id, project_id, name, key_hash, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id.to_string(), project_id.to_string(), name, key_hash, created_at.to_rfc3339()],
            )
            .await?;

        Ok(ApiKey {
            id,
            project_id,
            name: name.to_string(),
            key_hash: key_hash.to_string(),
            created_at,
            last_used_at: None,
            revoked_at: None,
        })
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ApiKey>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, project_id, name, key_hash, created_at, last_used_at, revoked_at
                 FROM api_keys WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_api_key_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Todas las keys no revocadas, filtro aplicado primero para minimizar
    /// el conjunto sobre el que la capa de servicio ejecuta la comparación
    /// de texto plano en tiempo constante.
    #[instrument(skip(self))]
    pub async fn find_all_active(&self) -> Result<Vec<ApiKey>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, project_id, name, key_hash, created_at, last_used_at, revoked_at
                 FROM api_keys WHERE revoked_at IS NULL",
                (),
            )
            .await?;

        let mut keys = Vec::new();
        while let Some(row) = rows.next().await? {
            keys.push(map_api_key_row(&row)?);
        }
        Ok(keys)
    }

    #[instrument(skip(self))]
    pub async fn list_by_project(&self, project_id: Uuid) -> Result<Vec<ApiKey>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, project_id, name, key_hash, created_at, last_used_at, revoked_at
                 FROM api_keys WHERE project_id = ?1 ORDER BY created_at DESC",
                params![project_id.to_string()],
            )
            .await?;

        let mut keys = Vec::new();
        while let Some(row) = rows.next().await? {
            keys.push(map_api_key_row(&row)?);
        }
        Ok(keys)
    }

    #[instrument(skip(self))]
    pub async fn count_active_by_project(&self, project_id: Uuid) -> Result<i64, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT COUNT(*) FROM api_keys WHERE project_id = ?1 AND revoked_at IS NULL",
                params![project_id.to_string()],
            )
            .await?;

        let count: i64 = rows.next().await?.map(|row| row.get(0)).transpose()?.unwrap_or(0);
        Ok(count)
    }

    #[instrument(skip(self))]
    pub async fn touch_last_used(&self, id: Uuid) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        connection
            .execute(
                "UPDATE api_keys SET last_used_at = ?2 WHERE id = ?1",
                params![id.to_string(), Utc::now().to_rfc3339()],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn revoke(&self, id: Uuid) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        let changed = connection
            .execute(
                "UPDATE api_keys SET revoked_at = ?2 WHERE id = ?1 AND revoked_at IS NULL",
                params![id.to_string(), Utc::now().to_rfc3339()],
            )
            .await?;

        if changed == 0 {
            return Err(DbError::ApiKeyAlreadyRevoked);
        }
        Ok(())
    }
}

fn map_api_key_row(row: &libsql::Row) -> Result<ApiKey, DbError> {
    let id: String = row.get(0)?;
    let project_id: String = row.get(1)?;
    let name: String = row.get(2)?;
    let key_hash: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    let last_used_at: Option<String> = row.get(5)?;
    let revoked_at: Option<String> = row.get(6)?;

    Ok(ApiKey {
        id: Uuid::parse_str(&id).map_err(|e| DbError::MappingError(e.to_string()))?,
        project_id: Uuid::parse_str(&project_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        name,
        key_hash,
        created_at: parse_timestamp(&created_at)?,
        last_used_at: last_used_at.map(|s| parse_timestamp(&s)).transpose()?,
        revoked_at: revoked_at.map(|s| parse_timestamp(&s)).transpose()?,
    })
}

fn parse_timestamp(raw: &str) -> Result<chrono::DateTime<Utc>, DbError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::MappingError(e.to_string()))
}
