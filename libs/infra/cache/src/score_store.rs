// [libs/infra/cache/src/score_store.rs]
/*!
 * =================================================================
 * APARATO: SCORE STORE (SORTED-SET ADAPTER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: OPERACIONES ATÓMICAS DE PUNTAJE Y RANKING (§4.3)
 *
 * Claves (§6.3):
 *   l:{tenantId}:{projectId}:{leaderboardId}       sorted-set, member=userId
 *   l:meta:{tenantId}:{projectId}:{leaderboardId}  hash de metadatos, sin TTL
 *
 * `update_score` en modo `best` NO es atómico a través de clientes
 * concurrentes (lectura-luego-escritura): el spec documenta esto
 * como aceptable, las escrituras convergen una vez ambas comprometen.
 * =================================================================
 */

use crate::errors::CacheError;
use crate::CachePool;
use deadpool_redis::Connection;
use ledger_domain_models::{SortOrder, UpdateMode};
use redis::AsyncCommands;
use tracing::instrument;
use uuid::Uuid;

/// Metadatos colocados junto al sorted-set. Escritos por el Worker en
/// `leaderboard.created`; persisten sin TTL (solo el score set expira).
#[derive(Debug, Clone)]
pub struct LeaderboardMetadata {
    pub name: String,
    pub project_id: Uuid,
    pub tenant_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub ttl_days: Option<i64>,
    pub update_mode: UpdateMode,
    pub sort_order: SortOrder,
}

impl LeaderboardMetadata {
    fn defaults() -> (UpdateMode, SortOrder, Option<i64>) {
        (UpdateMode::Replace, SortOrder::Desc, None)
    }
}

#[derive(Debug, Clone)]
pub struct TopResult {
    pub entries: Vec<(u64, String, f64)>,
    pub total: u64,
}

#[derive(Debug, Clone)]
pub struct RankResult {
    pub rank: Option<u64>,
    pub score: Option<f64>,
    pub above: Vec<(u64, String, f64)>,
    pub below: Vec<(u64, String, f64)>,
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateOutcome {
    pub final_score: f64,
    pub rank: u64,
    pub applied_mode: UpdateMode,
}

/// Una entrada de `BatchUpdateScore` (§4.3.2), previa a su agrupación.
#[derive(Debug, Clone)]
pub struct BatchScoreUpdate {
    pub leaderboard_id: Uuid,
    pub user_id: String,
    pub score: f64,
    pub force_increment: bool,
}

pub struct ScoreStore {
    pool: CachePool,
}

impl ScoreStore {
    pub fn new(pool: CachePool) -> Self {
        Self { pool }
    }

    pub fn score_key(tenant_id: Uuid, project_id: Uuid, leaderboard_id: Uuid) -> String {
        format!("l:{}:{}:{}", tenant_id, project_id, leaderboard_id)
    }

    pub fn meta_key(tenant_id: Uuid, project_id: Uuid, leaderboard_id: Uuid) -> String {
        format!("l:meta:{}:{}:{}", tenant_id, project_id, leaderboard_id)
    }

    #[instrument(skip(self))]
    pub async fn get_metadata(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        leaderboard_id: Uuid,
    ) -> Result<Option<LeaderboardMetadata>, CacheError> {
        let mut conn = self.pool.get().await?;
        let key = Self::meta_key(tenant_id, project_id, leaderboard_id);

        let fields: std::collections::HashMap<String, String> = conn.hgetall(&key).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        let update_mode = match fields.get("updateMode").map(String::as_str) {
            Some("increment") => UpdateMode::Increment,
            Some("best") => UpdateMode::Best,
            _ => UpdateMode::Replace,
        };
        let sort_order = match fields.get("sortOrder").map(String::as_str) {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };
        let ttl_days = fields.get("ttlDays").and_then(|v| v.parse::<i64>().ok());
        let created_at = fields
            .get("createdAt")
            .and_then(|v| chrono::DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .unwrap_or_else(chrono::Utc::now);

        Ok(Some(LeaderboardMetadata {
            name: fields.get("name").cloned().unwrap_or_default(),
            project_id,
            tenant_id,
            created_at,
            ttl_days,
            update_mode,
            sort_order,
        }))
    }

    /// Invocado por el Worker al proyectar `leaderboard.created`. El
    /// hash no lleva TTL: solo el score set expira.
    #[instrument(skip(self))]
    pub async fn set_metadata(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        leaderboard_id: Uuid,
        name: &str,
        sort_order: SortOrder,
        update_mode: UpdateMode,
        ttl_days: Option<i64>,
    ) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let key = Self::meta_key(tenant_id, project_id, leaderboard_id);

        let sort_order_label = match sort_order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        let update_mode_label = match update_mode {
            UpdateMode::Replace => "replace",
            UpdateMode::Increment => "increment",
            UpdateMode::Best => "best",
        };

        let _: () = conn
            .hset_multiple(
                &key,
                &[
                    ("name", name.to_string()),
                    ("projectId", project_id.to_string()),
                    ("tenantId", tenant_id.to_string()),
                    ("createdAt", chrono::Utc::now().to_rfc3339()),
                    ("ttlDays", ttl_days.unwrap_or(0).to_string()),
                    ("updateMode", update_mode_label.to_string()),
                    ("sortOrder", sort_order_label.to_string()),
                ],
            )
            .await?;
        Ok(())
    }

    /// Instrucción de `leaderboard.deleted`: purga el sorted-set y el
    /// hash de metadatos (eventualmente consistente con el Worker).
    #[instrument(skip(self))]
    pub async fn purge(&self, tenant_id: Uuid, project_id: Uuid, leaderboard_id: Uuid) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let score_key = Self::score_key(tenant_id, project_id, leaderboard_id);
        let meta_key = Self::meta_key(tenant_id, project_id, leaderboard_id);

        let _: () = conn.del(&[score_key, meta_key]).await?;
        Ok(())
    }

    /// Algoritmo de §4.3.1. `force_increment` corresponde al flag
    /// `increment=true` en la petición, que fuerza el modo
    /// independientemente de los metadatos.
    #[instrument(skip(self))]
    pub async fn update_score(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        leaderboard_id: Uuid,
        user_id: &str,
        score: f64,
        force_increment: bool,
    ) -> Result<UpdateOutcome, CacheError> {
        let metadata = self.get_metadata(tenant_id, project_id, leaderboard_id).await?;
        let (default_mode, default_sort, default_ttl) = LeaderboardMetadata::defaults();

        let (update_mode, sort_order, ttl_days) = match &metadata {
            Some(meta) => (meta.update_mode, meta.sort_order, meta.ttl_days),
            None => (default_mode, default_sort, default_ttl),
        };

        let applied_mode = if force_increment { UpdateMode::Increment } else { update_mode };

        let mut conn = self.pool.get().await?;
        let key = Self::score_key(tenant_id, project_id, leaderboard_id);

        let final_score: f64 = match applied_mode {
            UpdateMode::Increment => conn.zincr(&key, user_id, score).await?,
            UpdateMode::Replace => {
                let _: () = conn.zadd(&key, user_id, score).await?;
                score
            }
            UpdateMode::Best => {
                let current: Option<f64> = conn.zscore(&key, user_id).await?;
                let should_write = match current {
                    None => true,
                    Some(current_score) => match sort_order {
                        SortOrder::Desc => score > current_score,
                        SortOrder::Asc => score < current_score,
                    },
                };
                if should_write {
                    let _: () = conn.zadd(&key, user_id, score).await?;
                    score
                } else {
                    current.unwrap_or(score)
                }
            }
        };

        if let Some(days) = ttl_days {
            if days > 0 {
                let _: () = conn.expire(&key, days * 86_400).await?;
            }
        }

        let rank = self.rank_for(&mut conn, &key, user_id, sort_order).await?.unwrap_or(0);

        Ok(UpdateOutcome { final_score, rank, applied_mode })
    }

    /// Algoritmo de §4.3.2: agrupa por leaderboard, resuelve sus
    /// metadatos una única vez, pre-lee los puntajes vigentes que el
    /// modo `best` necesita para decidir si escribe, y luego somete
    /// todas las escrituras del grupo a una única transacción
    /// pipelinada (un `EXPIRE` por leaderboard, no por entrada). El
    /// orden de retorno coincide con el orden de `updates`.
    #[instrument(skip(self, updates))]
    pub async fn update_score_batch(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        updates: &[BatchScoreUpdate],
    ) -> Result<Vec<UpdateOutcome>, CacheError> {
        let mut outcomes: Vec<Option<UpdateOutcome>> = vec![None; updates.len()];
        let (default_mode, default_sort, default_ttl) = LeaderboardMetadata::defaults();

        let mut order: Vec<Uuid> = Vec::new();
        let mut groups: std::collections::HashMap<Uuid, Vec<usize>> = std::collections::HashMap::new();
        for (index, update) in updates.iter().enumerate() {
            groups.entry(update.leaderboard_id).or_insert_with(|| { order.push(update.leaderboard_id); Vec::new() }).push(index);
        }

        let mut conn = self.pool.get().await?;

        for leaderboard_id in order {
            let indices = groups.get(&leaderboard_id).expect("leaderboard present in `order`");
            let metadata = self.get_metadata(tenant_id, project_id, leaderboard_id).await?;
            let (base_mode, sort_order, ttl_days) = match &metadata {
                Some(meta) => (meta.update_mode, meta.sort_order, meta.ttl_days),
                None => (default_mode, default_sort, default_ttl),
            };
            let key = Self::score_key(tenant_id, project_id, leaderboard_id);

            // Fase 1: modo efectivo por entrada y pre-lectura de los
            // puntajes actuales que el modo `best` necesita.
            let mut effective_modes = Vec::with_capacity(indices.len());
            let mut current_scores: Vec<Option<f64>> = Vec::with_capacity(indices.len());
            for &index in indices {
                let update = &updates[index];
                let mode = if update.force_increment { UpdateMode::Increment } else { base_mode };
                effective_modes.push(mode);
                if mode == UpdateMode::Best {
                    let current: Option<f64> = conn.zscore(&key, &update.user_id).await?;
                    current_scores.push(current);
                } else {
                    current_scores.push(None);
                }
            }

            // Fase 2: una única transacción pipelinada por leaderboard,
            // con el re-armado de TTL aplicado una sola vez.
            let mut pipe = redis::pipe();
            pipe.atomic();
            let mut should_write = Vec::with_capacity(indices.len());
            for (slot, &index) in indices.iter().enumerate() {
                let update = &updates[index];
                match effective_modes[slot] {
                    UpdateMode::Increment => {
                        pipe.zincr(&key, &update.user_id, update.score).ignore();
                        should_write.push(true);
                    }
                    UpdateMode::Replace => {
                        pipe.zadd(&key, &update.user_id, update.score).ignore();
                        should_write.push(true);
                    }
                    UpdateMode::Best => {
                        let writes = match current_scores[slot] {
                            None => true,
                            Some(current_score) => match sort_order {
                                SortOrder::Desc => update.score > current_score,
                                SortOrder::Asc => update.score < current_score,
                            },
                        };
                        if writes {
                            pipe.zadd(&key, &update.user_id, update.score).ignore();
                        }
                        should_write.push(writes);
                    }
                }
            }
            if let Some(days) = ttl_days {
                if days > 0 {
                    pipe.expire(&key, days * 86_400).ignore();
                }
            }
            pipe.query_async::<()>(&mut conn).await?;

            // Fase 3: lectura de cierre por entrada (puntaje final + rango).
            for (slot, &index) in indices.iter().enumerate() {
                let update = &updates[index];
                let final_score = if should_write[slot] {
                    let persisted: Option<f64> = conn.zscore(&key, &update.user_id).await?;
                    persisted.unwrap_or(update.score)
                } else {
                    current_scores[slot].unwrap_or(update.score)
                };
                let rank = self.rank_for(&mut conn, &key, &update.user_id, sort_order).await?.unwrap_or(0);
                outcomes[index] =
                    Some(UpdateOutcome { final_score, rank, applied_mode: effective_modes[slot] });
            }
        }

        Ok(outcomes.into_iter().map(|o| o.expect("every index is written exactly once")).collect())
    }

    async fn rank_for(
        &self,
        conn: &mut Connection,
        key: &str,
        user_id: &str,
        sort_order: SortOrder,
    ) -> Result<Option<u64>, CacheError> {
        let zero_based: Option<u64> = match sort_order {
            SortOrder::Desc => conn.zrevrank(key, user_id).await?,
            SortOrder::Asc => conn.zrank(key, user_id).await?,
        };
        Ok(zero_based.map(|r| r + 1))
    }

    /// `Top(leaderboardId, limit, offset)` — rangos continuos desde
    /// `offset+1`, ordenados por `sortOrder`.
    #[instrument(skip(self))]
    pub async fn top(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        leaderboard_id: Uuid,
        sort_order: SortOrder,
        limit: u64,
        offset: u64,
    ) -> Result<TopResult, CacheError> {
        let mut conn = self.pool.get().await?;
        let key = Self::score_key(tenant_id, project_id, leaderboard_id);

        let total: u64 = conn.zcard(&key).await?;
        let stop = offset + limit.saturating_sub(1);

        let raw: Vec<(String, f64)> = match sort_order {
            SortOrder::Desc => conn.zrevrange_withscores(&key, offset as isize, stop as isize).await?,
            SortOrder::Asc => conn.zrange_withscores(&key, offset as isize, stop as isize).await?,
        };

        let entries = raw
            .into_iter()
            .enumerate()
            .map(|(i, (member, score))| (offset + i as u64 + 1, member, score))
            .collect();

        Ok(TopResult { entries, total })
    }

    /// `RankOf(leaderboardId, userId, {withNeighbors, neighborCount})`.
    /// Ausencia del miembro retorna `rank: None`, nunca un error.
    #[instrument(skip(self))]
    pub async fn rank_of(
        &self,
        tenant_id: Uuid,
        project_id: Uuid,
        leaderboard_id: Uuid,
        sort_order: SortOrder,
        user_id: &str,
        with_neighbors: bool,
        neighbor_count: u64,
    ) -> Result<RankResult, CacheError> {
        let mut conn = self.pool.get().await?;
        let key = Self::score_key(tenant_id, project_id, leaderboard_id);

        let score: Option<f64> = conn.zscore(&key, user_id).await?;
        if score.is_none() {
            return Ok(RankResult { rank: None, score: None, above: Vec::new(), below: Vec::new() });
        }

        let rank = self.rank_for(&mut conn, &key, user_id, sort_order).await?;
        let zero_based_rank = rank.map(|r| r - 1).unwrap_or(0);

        let (above, below) = if with_neighbors && neighbor_count > 0 {
            let above_start = zero_based_rank.saturating_sub(neighbor_count);
            let above_stop = zero_based_rank.saturating_sub(1);
            let below_start = zero_based_rank + 1;
            let below_stop = zero_based_rank + neighbor_count;

            let above_raw: Vec<(String, f64)> = if zero_based_rank > 0 {
                match sort_order {
                    SortOrder::Desc => {
                        conn.zrevrange_withscores(&key, above_start as isize, above_stop as isize).await?
                    }
                    SortOrder::Asc => {
                        conn.zrange_withscores(&key, above_start as isize, above_stop as isize).await?
                    }
                }
            } else {
                Vec::new()
            };

            let below_raw: Vec<(String, f64)> = match sort_order {
                SortOrder::Desc => {
                    conn.zrevrange_withscores(&key, below_start as isize, below_stop as isize).await?
                }
                SortOrder::Asc => conn.zrange_withscores(&key, below_start as isize, below_stop as isize).await?,
            };

            let above = above_raw
                .into_iter()
                .enumerate()
                .map(|(i, (member, score))| (above_start + i as u64 + 1, member, score))
                .collect();
            let below = below_raw
                .into_iter()
                .enumerate()
                .map(|(i, (member, score))| (below_start + i as u64 + 1, member, score))
                .collect();

            (above, below)
        } else {
            (Vec::new(), Vec::new())
        };

        Ok(RankResult { rank, score, above, below })
    }
}
