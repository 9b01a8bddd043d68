// [libs/infra/db/src/repositories/score_event.rs]
/*!
 * APARATO: SCORE EVENT REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PROYECCIÓN APPEND-ONLY DEL EVENTO `score.updated`
 *
 * El Worker invoca `insert` por cada mensaje consumido. Los
 * duplicados se toleran (§4.5): no hay restricción de unicidad sobre
 * el contenido, solo sobre `id` si el publicador decide incluir uno.
 */

use crate::errors::DbError;
use crate::RelationalClient;
use chrono::{DateTime, Utc};
use ledger_domain_models::ScoreEvent;
use libsql::params;
use tracing::instrument;
use uuid::Uuid;

pub struct ScoreEventRepository {
    database_client: RelationalClient,
}

impl ScoreEventRepository {
    pub fn new(client: RelationalClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self))]
    pub async fn insert(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        leaderboard_id: Uuid,
        user_id: &str,
        score: f64,
        increment: bool,
    ) -> Result<ScoreEvent, DbError> {
        let connection = self.database_client.get_connection()?;
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        connection
            .execute(
                "INSERT INTO score_events (id, tenant_id, project_id, leaderboard_id, user_id, score, increment, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id.to_string(),
                    tenant_id.to_string(),
                    project_id.to_string(),
                    leaderboard_id.to_string(),
                    user_id,
                    score,
                    increment,
                    created_at.to_rfc3339(),
                ],
            )
            .await?;

        Ok(ScoreEvent { id, tenant_id, project_id, leaderboard_id, user_id: user_id.to_string(), score, increment, created_at })
    }

    #[instrument(skip(self))]
    pub async fn list_by_leaderboard(&self, leaderboard_id: Uuid, limit: i64) -> Result<Vec<ScoreEvent>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, tenant_id, project_id, leaderboard_id, user_id, score, increment, created_at
                 FROM score_events WHERE leaderboard_id = ?1 ORDER BY created_at DESC LIMIT ?2",
                params![leaderboard_id.to_string(), limit],
            )
            .await?;

        let mut events = Vec::new();
        while let Some(row) = rows.next().await? {
            events.push(map_score_event_row(&row)?);
        }
        Ok(events)
    }
}

fn map_score_event_row(row: &libsql::Row) -> Result<ScoreEvent, DbError> {
    let id: String = row.get(0)?;
    let tenant_id: String = row.get(1)?;
    let project_id: String = row.get(2)?;
    let leaderboard_id: String = row.get(3)?;
    let user_id: String = row.get(4)?;
    let score: f64 = row.get(5)?;
    let increment: i64 = row.get(6)?;
    let created_at: String = row.get(7)?;

    Ok(ScoreEvent {
        id: Uuid::parse_str(&id).map_err(|e| DbError::MappingError(e.to_string()))?,
        tenant_id: Uuid::parse_str(&tenant_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        project_id: Uuid::parse_str(&project_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        leaderboard_id: Uuid::parse_str(&leaderboard_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        user_id,
        score,
        increment: increment != 0,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::MappingError(e.to_string()))
}
