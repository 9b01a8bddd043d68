// [libs/domain/models/src/usage_record.rs]
/*!
 * APARATO: USAGE RECORD ENTITY
 * CLASIFICACIÓN: DOMAIN LAYER (ESTRATO L2)
 *
 * Único por `(tenantId, projectId, date)`. Se actualiza por upsert
 * diario y se congela tras el cierre de mes; `ledger-domain-billing`
 * suma el mes-a-la-fecha para `UsageCheck`.
 */

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub tenant_id: Uuid,
    pub project_id: Uuid,
    pub date: NaiveDate,
    pub score_updates: i64,
    pub leaderboard_reads: i64,
    pub total_requests: i64,
}

/// Deltas a aplicar atómicamente sobre la fila del día vigente.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageDelta {
    pub score_updates: i64,
    pub leaderboard_reads: i64,
    pub total_requests: i64,
}
