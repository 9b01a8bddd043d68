// [apps/gateway/src/errors.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY ERROR TAXONOMY (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: APPLICATION ERROR LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: TRADUCCIÓN DE FALLOS INTERNOS AL SOBRE HTTP (§7)
 * =================================================================
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ledger_infra_cache::CacheError;
use ledger_infra_db::DbError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("BAD_REQUEST: {0}")]
    BadRequest(String),

    #[error("UNAUTHENTICATED: {0}")]
    Unauthenticated(String),

    #[error("FORBIDDEN: {0}")]
    Forbidden(String),

    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    #[error("CONFLICT: {0}")]
    Conflict(String),

    #[error("QUOTA_EXCEEDED: {0}")]
    QuotaExceeded(String),

    #[error("RATE_LIMITED: retry after {retry_after_millis}ms")]
    RateLimited { retry_after_millis: u64, limit: u32, reset_epoch_seconds: i64 },

    #[error("UPSTREAM_UNAVAILABLE: {0}")]
    UpstreamUnavailable(String),

    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl GatewayError {
    fn code(&self) -> &'static str {
        match self {
            GatewayError::BadRequest(_) => "bad_request",
            GatewayError::Unauthenticated(_) => "unauthenticated",
            GatewayError::Forbidden(_) => "forbidden",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::Conflict(_) => "conflict",
            GatewayError::QuotaExceeded(_) => "quota_exceeded",
            GatewayError::RateLimited { .. } => "rate_limited",
            GatewayError::UpstreamUnavailable(_) => "upstream_unavailable",
            GatewayError::Internal(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4();
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(%request_id, "❌ [GATEWAY]: {}", self);
        } else {
            tracing::warn!(%request_id, "⚠️  [GATEWAY]: {}", self);
        }

        let mut response = (
            status,
            Json(json!({
                "error": {
                    "code": self.code(),
                    "message": self.to_string(),
                },
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "requestId": request_id,
            })),
        )
            .into_response();

        if let GatewayError::RateLimited { retry_after_millis, limit, reset_epoch_seconds } = self {
            let retry_after_secs = (retry_after_millis / 1000).max(1);
            response
                .headers_mut()
                .insert("Retry-After", retry_after_secs.to_string().parse().unwrap());
            response
                .headers_mut()
                .insert("X-RateLimit-Limit", limit.to_string().parse().unwrap());
            response
                .headers_mut()
                .insert("X-RateLimit-Reset", reset_epoch_seconds.to_string().parse().unwrap());
        }

        response
    }
}

impl From<DbError> for GatewayError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::TenantNotFound => GatewayError::NotFound("tenant not found".into()),
            DbError::ProjectNotFound => GatewayError::NotFound("project not found".into()),
            DbError::ApiKeyNotFound => GatewayError::NotFound("api key not found".into()),
            DbError::SubscriptionNotFound => GatewayError::NotFound("subscription not found".into()),
            DbError::LeaderboardNotFound => GatewayError::NotFound("leaderboard not found".into()),
            DbError::SeasonNotFound => GatewayError::NotFound("season not found".into()),
            DbError::ApiKeyAlreadyRevoked => GatewayError::Conflict("api key already revoked".into()),
            DbError::DuplicateTenantEmail => GatewayError::Conflict("email already registered".into()),
            DbError::DuplicateActiveSubscription => {
                GatewayError::Conflict("tenant already has an active subscription".into())
            }
            DbError::DuplicateLeaderboardName => {
                GatewayError::Conflict("leaderboard name already exists for this project".into())
            }
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

impl From<CacheError> for GatewayError {
    fn from(error: CacheError) -> Self {
        match error {
            CacheError::ConnectionError(msg) | CacheError::PoolError(msg) => {
                GatewayError::UpstreamUnavailable(msg)
            }
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
