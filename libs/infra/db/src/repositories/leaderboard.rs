// [libs/infra/db/src/repositories/leaderboard.rs]
/*!
 * APARATO: LEADERBOARD REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CRUD DE METADATOS DE LEADERBOARD (CONTROL-PLANE)
 *
 * El sorted-set en sí no vive aquí (ver `ledger-infra-cache`); este
 * repositorio es la fuente de verdad para el nombre, el modo de
 * actualización y el orden de un leaderboard, y es lo que el Worker
 * consulta para repoblar el hash de metadatos tras `leaderboard.created`.
 */

use crate::errors::DbError;
use crate::RelationalClient;
use chrono::Utc;
use ledger_domain_models::{Leaderboard, SortOrder, UpdateMode, UpdateLeaderboardPayload};
use libsql::params;
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

pub struct LeaderboardRepository {
    database_client: RelationalClient,
}

impl LeaderboardRepository {
    pub fn new(client: RelationalClient) -> Self {
        Self { database_client: client }
    }

    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, metadata))]
    pub async fn create(
        &self,
        project_id: Uuid,
        tenant_id: Uuid,
        name: &str,
        description: Option<&str>,
        sort_order: SortOrder,
        update_mode: UpdateMode,
        ttl_days: Option<i64>,
        metadata: Value,
    ) -> Result<Leaderboard, DbError> {
        let connection = self.database_client.get_connection()?;
        let id = Uuid::new_v4();

        connection
            .execute(
                "INSERT INTO leaderboards
                    (id, project_id, tenant_id, name, description, sort_order, update_mode, ttl_days, is_active, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9)",
                params![
                    id.to_string(),
                    project_id.to_string(),
                    tenant_id.to_string(),
                    name,
                    description,
                    sort_order_label(sort_order),
                    update_mode_label(update_mode),
                    ttl_days,
                    metadata.to_string(),
                ],
            )
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE") {
                    DbError::DuplicateLeaderboardName
                } else {
                    DbError::QueryError(e)
                }
            })?;

        Ok(Leaderboard {
            id,
            project_id,
            tenant_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            sort_order,
            update_mode,
            reset_schedule: None,
            ttl_days,
            is_active: true,
            metadata,
        })
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Leaderboard>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, project_id, tenant_id, name, description, sort_order, update_mode,
                        reset_schedule, ttl_days, is_active, metadata
                 FROM leaderboards WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_leaderboard_row(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_by_project(&self, project_id: Uuid) -> Result<Vec<Leaderboard>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, project_id, tenant_id, name, description, sort_order, update_mode,
                        reset_schedule, ttl_days, is_active, metadata
                 FROM leaderboards WHERE project_id = ?1 ORDER BY name",
                params![project_id.to_string()],
            )
            .await?;

        let mut leaderboards = Vec::new();
        while let Some(row) = rows.next().await? {
            leaderboards.push(map_leaderboard_row(&row)?);
        }
        Ok(leaderboards)
    }

    #[instrument(skip(self))]
    pub async fn count_by_project(&self, project_id: Uuid) -> Result<i64, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT COUNT(*) FROM leaderboards WHERE project_id = ?1",
                params![project_id.to_string()],
            )
            .await?;

        let count: i64 = rows.next().await?.map(|row| row.get(0)).transpose()?.unwrap_or(0);
        Ok(count)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: Uuid, patch: &UpdateLeaderboardPayload) -> Result<Leaderboard, DbError> {
        let existing = self.find_by_id(id).await?.ok_or(DbError::LeaderboardNotFound)?;
        let connection = self.database_client.get_connection()?;

        let name = patch.name.clone().unwrap_or(existing.name);
        let description = patch.description.clone().or(existing.description);
        let sort_order = patch.sort_order.unwrap_or(existing.sort_order);
        let update_mode = patch.update_mode.unwrap_or(existing.update_mode);
        let reset_schedule = patch.reset_schedule.clone().or(existing.reset_schedule);
        let ttl_days = patch.ttl_days.or(existing.ttl_days);
        let is_active = patch.is_active.unwrap_or(existing.is_active);
        let metadata = patch.metadata.clone().unwrap_or(existing.metadata);

        connection
            .execute(
                "UPDATE leaderboards SET
                    name = ?2, description = ?3, sort_order = ?4, update_mode = ?5,
                    reset_schedule = ?6, ttl_days = ?7, is_active = ?8, metadata = ?9,
                    updated_at = ?10
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    name.clone(),
                    description.clone(),
                    sort_order_label(sort_order),
                    update_mode_label(update_mode),
                    reset_schedule.clone(),
                    ttl_days,
                    is_active,
                    metadata.to_string(),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await?;

        Ok(Leaderboard {
            id,
            project_id: existing.project_id,
            tenant_id: existing.tenant_id,
            name,
            description,
            sort_order,
            update_mode,
            reset_schedule,
            ttl_days,
            is_active,
            metadata,
        })
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<Leaderboard, DbError> {
        let existing = self.find_by_id(id).await?.ok_or(DbError::LeaderboardNotFound)?;
        let connection = self.database_client.get_connection()?;

        connection
            .execute("DELETE FROM leaderboards WHERE id = ?1", params![id.to_string()])
            .await?;

        Ok(existing)
    }
}

fn sort_order_label(sort_order: SortOrder) -> &'static str {
    match sort_order {
        SortOrder::Asc => "asc",
        SortOrder::Desc => "desc",
    }
}

fn parse_sort_order(raw: &str) -> Result<SortOrder, DbError> {
    match raw {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        other => Err(DbError::MappingError(format!("unknown sort_order '{}'", other))),
    }
}

fn update_mode_label(update_mode: UpdateMode) -> &'static str {
    match update_mode {
        UpdateMode::Replace => "replace",
        UpdateMode::Increment => "increment",
        UpdateMode::Best => "best",
    }
}

fn parse_update_mode(raw: &str) -> Result<UpdateMode, DbError> {
    match raw {
        "replace" => Ok(UpdateMode::Replace),
        "increment" => Ok(UpdateMode::Increment),
        "best" => Ok(UpdateMode::Best),
        other => Err(DbError::MappingError(format!("unknown update_mode '{}'", other))),
    }
}

fn map_leaderboard_row(row: &libsql::Row) -> Result<Leaderboard, DbError> {
    let id: String = row.get(0)?;
    let project_id: String = row.get(1)?;
    let tenant_id: String = row.get(2)?;
    let name: String = row.get(3)?;
    let description: Option<String> = row.get(4)?;
    let sort_order: String = row.get(5)?;
    let update_mode: String = row.get(6)?;
    let reset_schedule: Option<String> = row.get(7)?;
    let ttl_days: Option<i64> = row.get(8)?;
    let is_active: i64 = row.get(9)?;
    let metadata: String = row.get(10)?;

    Ok(Leaderboard {
        id: Uuid::parse_str(&id).map_err(|e| DbError::MappingError(e.to_string()))?,
        project_id: Uuid::parse_str(&project_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        tenant_id: Uuid::parse_str(&tenant_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        name,
        description,
        sort_order: parse_sort_order(&sort_order)?,
        update_mode: parse_update_mode(&update_mode)?,
        reset_schedule,
        ttl_days,
        is_active: is_active != 0,
        metadata: serde_json::from_str(&metadata).map_err(|e| DbError::MappingError(e.to_string()))?,
    })
}
