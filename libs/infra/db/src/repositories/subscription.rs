// [libs/infra/db/src/repositories/subscription.rs]
/*!
 * APARATO: SUBSCRIPTION REPOSITORY
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: A LO SUMO UNA SUSCRIPCIÓN ACTIVA POR TENANT
 */

use crate::errors::DbError;
use crate::RelationalClient;
use chrono::{DateTime, Duration, Utc};
use ledger_domain_models::{PlanType, Subscription, SubscriptionStatus};
use libsql::params;
use tracing::instrument;
use uuid::Uuid;

pub struct SubscriptionRepository {
    database_client: RelationalClient,
}

impl SubscriptionRepository {
    pub fn new(client: RelationalClient) -> Self {
        Self { database_client: client }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, tenant_id: Uuid, plan_type: PlanType) -> Result<Subscription, DbError> {
        let connection = self.database_client.get_connection()?;

        if self.find_active_by_tenant(tenant_id).await?.is_some() {
            return Err(DbError::DuplicateActiveSubscription);
        }

        let id = Uuid::new_v4();
        let period_start = Utc::now();
        let period_end = period_start + Duration::days(30);

        connection
            .execute(
                "INSERT INTO subscriptions (id, tenant_id, plan_type, status, period_start, period_end, cancel_at_period_end)
                 VALUES (?1, ?2, ?3, 'active', ?4, ?5, 0)",
                params![
                    id.to_string(),
                    tenant_id.to_string(),
                    plan_type_label(plan_type),
                    period_start.to_rfc3339(),
                    period_end.to_rfc3339(),
                ],
            )
            .await?;

        Ok(Subscription {
            id,
            tenant_id,
            plan_type,
            status: SubscriptionStatus::Active,
            period_start,
            period_end,
            cancel_at_period_end: false,
        })
    }

    #[instrument(skip(self))]
    pub async fn find_active_by_tenant(&self, tenant_id: Uuid) -> Result<Option<Subscription>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, tenant_id, plan_type, status, period_start, period_end, cancel_at_period_end
                 FROM subscriptions WHERE tenant_id = ?1 AND status = 'active'",
                params![tenant_id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_subscription_row(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscription>, DbError> {
        let connection = self.database_client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT id, tenant_id, plan_type, status, period_start, period_end, cancel_at_period_end
                 FROM subscriptions WHERE id = ?1",
                params![id.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(map_subscription_row(&row)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, id: Uuid, at_period_end: bool) -> Result<Subscription, DbError> {
        let connection = self.database_client.get_connection()?;

        if at_period_end {
            connection
                .execute(
                    "UPDATE subscriptions SET cancel_at_period_end = 1 WHERE id = ?1",
                    params![id.to_string()],
                )
                .await?;
        } else {
            connection
                .execute(
                    "UPDATE subscriptions SET status = 'cancelled', cancel_at_period_end = 1 WHERE id = ?1",
                    params![id.to_string()],
                )
                .await?;
        }

        self.find_by_id(id).await?.ok_or(DbError::SubscriptionNotFound)
    }
}

fn plan_type_label(plan_type: PlanType) -> &'static str {
    match plan_type {
        PlanType::Free => "free",
        PlanType::Pro => "pro",
        PlanType::Enterprise => "enterprise",
    }
}

fn parse_plan_type(raw: &str) -> Result<PlanType, DbError> {
    match raw {
        "free" => Ok(PlanType::Free),
        "pro" => Ok(PlanType::Pro),
        "enterprise" => Ok(PlanType::Enterprise),
        other => Err(DbError::MappingError(format!("unknown plan_type '{}'", other))),
    }
}

fn parse_status(raw: &str) -> Result<SubscriptionStatus, DbError> {
    match raw {
        "active" => Ok(SubscriptionStatus::Active),
        "cancelled" => Ok(SubscriptionStatus::Cancelled),
        "past_due" => Ok(SubscriptionStatus::PastDue),
        other => Err(DbError::MappingError(format!("unknown subscription status '{}'", other))),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::MappingError(e.to_string()))
}

fn map_subscription_row(row: &libsql::Row) -> Result<Subscription, DbError> {
    let id: String = row.get(0)?;
    let tenant_id: String = row.get(1)?;
    let plan_type: String = row.get(2)?;
    let status: String = row.get(3)?;
    let period_start: String = row.get(4)?;
    let period_end: String = row.get(5)?;
    let cancel_at_period_end: i64 = row.get(6)?;

    Ok(Subscription {
        id: Uuid::parse_str(&id).map_err(|e| DbError::MappingError(e.to_string()))?,
        tenant_id: Uuid::parse_str(&tenant_id).map_err(|e| DbError::MappingError(e.to_string()))?,
        plan_type: parse_plan_type(&plan_type)?,
        status: parse_status(&status)?,
        period_start: parse_timestamp(&period_start)?,
        period_end: parse_timestamp(&period_end)?,
        cancel_at_period_end: cancel_at_period_end != 0,
    })
}
