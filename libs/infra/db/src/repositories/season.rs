// [libs/infra/db/src/repositories/season.rs]
/*!
 * APARATO: SEASON REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CONTROL-PLANE PURO, SIN EFECTOS EN EL SORTED-SET
 */

use crate::errors::DbError;
use crate::RelationalClient;
use chrono::{DateTime, Utc};
use ledger_domain_models::Season;
use libsql::params;
use serde_json::Value;
use tracing::instrument;
use uuid::Uuid;

pub struct SeasonRepository {
    database_client: RelationalClient,
}

impl SeasonRepository {
    pub fn new(client: RelationalClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self, metadata))]
    pub async fn create(
        &self,
        leaderboard_id: Uuid,
        name: &str,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        metadata: Value,
    ) -> Result<Season, DbError> {
        let connection = self.database_client.get_connection()?;
        let id = Uuid::new_v4();

        connection
            .execute(
                "INSERT INTO seasons (id, leaderboard_id, name, start_date, end_date, is_active, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
                params![
                    id.to_string(),
                    leaderboard_id.to_string(),
                    name,
                    start_date.to_rfc3339(),
                    end_date.to_rfc3339(),
                    metadata.to_string(),
                ],
            )
            .await?;

        Ok(Season { id, leaderboard_id, name: name.to_string(), start_date, end_date, is_active: true, metadata })
    }

    #[instrument(skip(self))]
    pub async fn list_by_leaderboard(&self, leaderboard_id: Uuid) -> Result<Vec<Season>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, leaderboard_id, name, start_date, end_date, is_active, metadata
                 FROM seasons WHERE leaderboard_id = ?1 ORDER BY start_date",
                params![leaderboard_id.to_string()],
            )
            .await?;

        let mut seasons = Vec::new();
        while let Some(row) = rows.next().await? {
            seasons.push(map_season_row(&row)?);
        }
        Ok(seasons)
    }

    #[instrument(skip(self))]
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<Season, DbError> {
        let connection = self.database_client.get_connection()?;
        let changed = connection
            .execute(
                "UPDATE seasons SET is_active = ?2 WHERE id = ?1",
                params![id.to_string(), is_active],
            )
            .await?;

        if changed == 0 {
            return Err(DbError::SeasonNotFound);
        }

        self.find_by_id(id).await?.ok_or(DbError::SeasonNotFound)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Season>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, leaderboard_id, name, start_date, end_date, is_active, metadata
                 FROM seasons WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_season_row(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let connection = self.database_client.get_connection()?;
        let changed = connection
            .execute("DELETE FROM seasons WHERE id = ?1", params![id.to_string()])
            .await?;

        if changed == 0 {
            return Err(DbError::SeasonNotFound);
        }
        Ok(())
    }
}

fn map_season_row(row: &libsql::Row) -> Result<Season, DbError> {
    let id: String = row.get(0)?;
    let leaderboard_id: String = row.get(1)?;
    let name: String = row.get(2)?;
    let start_date: String = row.get(3)?;
    let end_date: String = row.get(4)?;
    let is_active: i64 = row.get(5)?;
    let metadata: String = row.get(6)?;

    Ok(Season {
        id: Uuid::parse_str(&id).map_err(|e| DbError::MappingError(e.to_string()))?,
        leaderboard_id: Uuid::parse_str(&leaderboard_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        name,
        start_date: parse_timestamp(&start_date)?,
        end_date: parse_timestamp(&end_date)?,
        is_active: is_active != 0,
        metadata: serde_json::from_str(&metadata).map_err(|e| DbError::MappingError(e.to_string()))?,
    })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::MappingError(e.to_string()))
}
