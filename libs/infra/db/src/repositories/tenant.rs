// [libs/infra/db/src/repositories/tenant.rs]
/*!
 * APARATO: TENANT REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA DE LA RAÍZ DE PROPIEDAD DEL SISTEMA
 */

use crate::errors::DbError;
use crate::RelationalClient;
use chrono::Utc;
use ledger_domain_models::Tenant;
use libsql::params;
use tracing::instrument;
use uuid::Uuid;

pub struct TenantRepository {
    database_client: RelationalClient,
}

impl TenantRepository {
    pub fn new(client: RelationalClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, name: &str, email: &str) -> Result<Tenant, DbError> {
        let connection = self.database_client.get_connection()?;
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        connection
            .execute(
                "INSERT INTO tenants (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id.to_string(), name, email, created_at.to_rfc3339()],
            )
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE") {
                    DbError::DuplicateTenantEmail
                } else {
                    DbError::QueryError(e)
                }
            })?;

        Ok(Tenant { id, name: name.to_string(), email: email.to_string(), created_at })
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Tenant>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, name, email, created_at FROM tenants WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_tenant_row(&row)?)),
            None => Ok(None),
        }
    }
}

fn map_tenant_row(row: &libsql::Row) -> Result<Tenant, DbError> {
    let id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let created_at: String = row.get(3)?;

    Ok(Tenant {
        id: Uuid::parse_str(&id).map_err(|e| DbError::MappingError(e.to_string()))?,
        name,
        email,
        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| DbError::MappingError(e.to_string()))?
            .with_timezone(&Utc),
    })
}
