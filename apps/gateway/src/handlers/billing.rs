// [apps/gateway/src/handlers/billing.rs]
/*!
 * APARATO: BILLING & QUOTA HANDLERS
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L1-APP)
 * RESPONSABILIDAD: CICLO DE VIDA DE SUSCRIPCIONES Y `UsageCheck` (§4.6, PLANO INTERNO)
 */

use crate::errors::{GatewayError, GatewayResult};
use crate::middleware::TenantContext;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use ledger_domain_billing::{evaluate_usage_check, quota_limits, UsageCheckInput, UsageCheckResult};
use ledger_domain_models::{CreateSubscriptionPayload, Subscription};
use serde::Deserialize;
use uuid::Uuid;

/// Puerta de admisión de escritura para `/scores`, `/scores/batch-update`
/// y `POST /leaderboards` (§4.6): el rate limiter aplica *rate*, esto
/// aplica *cuota mensual*. Agotada la cuota de requests del tenant, la
/// escritura se rechaza con 429 antes de tocar el leaderboard.
pub(crate) async fn enforce_monthly_request_quota(state: &AppState, ctx: &TenantContext) -> GatewayResult<()> {
    let today = Utc::now().date_naive();
    let requests_month_to_date = state.usage_records.requests_month_to_date(ctx.tenant_id, today).await?;
    let limit = quota_limits(ctx.plan_type).requests;

    if requests_month_to_date >= limit {
        return Err(GatewayError::QuotaExceeded(format!(
            "monthly request quota exhausted ({requests_month_to_date}/{limit})"
        )));
    }

    Ok(())
}

pub async fn create_subscription(
    State(state): State<AppState>,
    Json(payload): Json<CreateSubscriptionPayload>,
) -> GatewayResult<Json<Subscription>> {
    state
        .tenants
        .find_by_id(payload.tenant_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound("tenant not found".into()))?;

    let subscription = state.subscriptions.create(payload.tenant_id, payload.plan_type).await?;
    Ok(Json(subscription))
}

pub async fn get_subscription_by_tenant(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> GatewayResult<Json<Subscription>> {
    let subscription = state
        .subscriptions
        .find_active_by_tenant(tenant_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound("no active subscription for this tenant".into()))?;
    Ok(Json(subscription))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CancelSubscriptionPayload {
    #[serde(default)]
    pub at_period_end: bool,
}

pub async fn cancel_subscription(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelSubscriptionPayload>,
) -> GatewayResult<Json<Subscription>> {
    let subscription = state.subscriptions.cancel(id, payload.at_period_end).await?;
    Ok(Json(subscription))
}

/// Agrega conteos vivos de recursos a través de todos los proyectos
/// del tenant, ya que la cuota de planes se expresa por tenant y no
/// existe un agregado `count_by_tenant` dedicado en el repositorio.
pub async fn usage_check(
    State(state): State<AppState>,
    Path(subscription_id): Path<Uuid>,
) -> GatewayResult<Json<UsageCheckResult>> {
    let subscription = state
        .subscriptions
        .find_by_id(subscription_id)
        .await?
        .ok_or_else(|| GatewayError::NotFound("subscription not found".into()))?;

    let projects = state.projects.list_by_tenant(subscription.tenant_id).await?;

    let mut leaderboard_count: u32 = 0;
    let mut active_api_key_count: u32 = 0;
    for project in &projects {
        leaderboard_count += state.leaderboards.count_by_project(project.id).await? as u32;
        active_api_key_count += state.api_keys.count_active_by_project(project.id).await? as u32;
    }

    let today = Utc::now().date_naive();
    let requests_month_to_date = state.usage_records.requests_month_to_date(subscription.tenant_id, today).await?;

    let result = evaluate_usage_check(
        subscription.plan_type,
        UsageCheckInput { requests_month_to_date, leaderboard_count, active_api_key_count },
    );

    Ok(Json(result))
}
