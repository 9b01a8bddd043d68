// [libs/domain/billing/src/lib.rs]
/*!
 * =================================================================
 * APARATO: BILLING CORE ENGINE (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: TABLA DE PLANES Y EVALUACIÓN DE CUOTAS
 *
 * Única fuente de verdad para los parámetros del token bucket
 * (§4.2.1) y las cuotas mensuales (§4.6). El Gateway consulta este
 * aparato; nunca debe hardcodear capacidad, refill o límites.
 * =================================================================
 */

use ledger_domain_models::PlanType;
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// Parámetros del token bucket para un plan (§4.2.1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitParams {
    pub capacity: u32,
    pub refill_per_sec: u32,
}

/// Límites de cuota mensual para un plan (§4.6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaLimits {
    pub requests: u64,
    pub leaderboards: u32,
    pub active_api_keys: u32,
}

pub fn rate_limit_params(plan: PlanType) -> RateLimitParams {
    match plan {
        PlanType::Free => RateLimitParams { capacity: 10, refill_per_sec: 1 },
        PlanType::Pro => RateLimitParams { capacity: 100, refill_per_sec: 50 },
        PlanType::Enterprise => RateLimitParams { capacity: 500, refill_per_sec: 200 },
    }
}

pub fn quota_limits(plan: PlanType) -> QuotaLimits {
    match plan {
        PlanType::Free => QuotaLimits { requests: 10_000, leaderboards: 5, active_api_keys: 2 },
        PlanType::Pro => QuotaLimits { requests: 1_000_000, leaderboards: 50, active_api_keys: 10 },
        PlanType::Enterprise => {
            QuotaLimits { requests: 10_000_000, leaderboards: 9_999, active_api_keys: 9_999 }
        }
    }
}

/// Una tripleta `{current, limit, withinLimit}` tal como la expone
/// `UsageCheck` (§4.6).
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaDimension {
    pub current: u64,
    pub limit: u64,
    pub within_limit: bool,
}

impl QuotaDimension {
    fn evaluate(current: u64, limit: u64) -> Self {
        Self { current, limit, within_limit: current < limit }
    }
}

/// Resultado completo de `UsageCheck(subscriptionId)`.
#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageCheckResult {
    pub requests: QuotaDimension,
    pub leaderboards: QuotaDimension,
    pub api_keys: QuotaDimension,
    pub within_limit: bool,
}

/// Insumos puros para `UsageCheck`: el mes-a-la-fecha ya agregado por
/// el llamador (suma de `UsageRecord.total_requests` del mes), y los
/// conteos vivos de recursos.
#[derive(Debug, Clone, Copy)]
pub struct UsageCheckInput {
    pub requests_month_to_date: u64,
    pub leaderboard_count: u32,
    pub active_api_key_count: u32,
}

/// Evalúa las tres dimensiones de cuota mensual para un plan dado.
/// Función pura: no toca la red ni el almacenamiento.
pub fn evaluate_usage_check(plan: PlanType, input: UsageCheckInput) -> UsageCheckResult {
    let limits = quota_limits(plan);

    let requests = QuotaDimension::evaluate(input.requests_month_to_date, limits.requests);
    let leaderboards =
        QuotaDimension::evaluate(input.leaderboard_count as u64, limits.leaderboards as u64);
    let api_keys =
        QuotaDimension::evaluate(input.active_api_key_count as u64, limits.active_api_keys as u64);

    let within_limit = requests.within_limit && leaderboards.within_limit && api_keys.within_limit;

    UsageCheckResult { requests, leaderboards, api_keys, within_limit }
}
