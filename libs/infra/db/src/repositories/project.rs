// [libs/infra/db/src/repositories/project.rs]
/*!
 * APARATO: PROJECT REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 */

use crate::errors::DbError;
use crate::RelationalClient;
use ledger_domain_models::Project;
use libsql::params;
use tracing::instrument;
use uuid::Uuid;

pub struct ProjectRepository {
    database_client: RelationalClient,
}

impl ProjectRepository {
    pub fn new(client: RelationalClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, tenant_id: Uuid, name: &str) -> Result<Project, DbError> {
        let connection = self.database_client.get_connection()?;
        let id = Uuid::new_v4();

        connection
            .execute(
                "INSERT INTO projects (id, tenant_id, name) VALUES (?1, ?2, ?3)",
                params![id.to_string(), tenant_id.to_string(), name],
            )
            .await?;

        Ok(Project { id, tenant_id, name: name.to_string() })
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, tenant_id, name FROM projects WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_project_row(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_by_tenant(&self, tenant_id: Uuid) -> Result<Vec<Project>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, tenant_id, name FROM projects WHERE tenant_id = ?1 ORDER BY name",
                params![tenant_id.to_string()],
            )
            .await?;

        let mut projects = Vec::new();
        while let Some(row) = rows.next().await? {
            projects.push(map_project_row(&row)?);
        }
        Ok(projects)
    }
}

fn map_project_row(row: &libsql::Row) -> Result<Project, DbError> {
    let id: String = row.get(0)?;
    let tenant_id: String = row.get(1)?;
    let name: String = row.get(2)?;

    Ok(Project {
        id: Uuid::parse_str(&id).map_err(|e| DbError::MappingError(e.to_string()))?,
        tenant_id: Uuid::parse_str(&tenant_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        name,
    })
}
