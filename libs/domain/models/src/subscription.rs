// [libs/domain/models/src/subscription.rs]
/*!
 * APARATO: SUBSCRIPTION ENTITY
 * CLASIFICACIÓN: DOMAIN LAYER (ESTRATO L2)
 *
 * A lo sumo una suscripción `Active` por tenant. `PlanType` determina
 * los parámetros del rate limiter y las cuotas mensuales (ver
 * `ledger_domain_billing::PLAN_TABLE`).
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typeshare::typeshare;
use uuid::Uuid;

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Free,
    Pro,
    Enterprise,
}

#[typeshare]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
    PastDue,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub plan_type: PlanType,
    pub status: SubscriptionStatus,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
}

#[typeshare]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionPayload {
    pub tenant_id: Uuid,
    pub plan_type: PlanType,
}
