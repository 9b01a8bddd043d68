// [libs/infra/db/src/errors.rs]
/*!
 * =================================================================
 * APARATO: DATABASE ERROR CATALOG (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 *
 * Cada variante se traduce en el Gateway a un `GatewayError` de §7
 * vía `From<DbError>`. Las variantes `*NotFound` mapean a 404; los
 * conflictos de unicidad (suscripción activa duplicada) a 409.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// Error de enlace físico o de red con el motor relacional.
    #[error("[L3_DB_NET_FAULT]: DATABASE_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo en la configuración del entorno (Variables vacías o malformadas).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el Dominio Rust.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    /// Error al comprometer cambios en una secuencia multi-statement.
    #[error("[L3_DB_FAULT]: TRANSACTION_COLLAPSE")]
    TransactionError,

    // --- ESTRATO DE IDENTIDAD (§4.1) ---
    #[error("[L3_TENANT_FAULT]: TENANT_NOT_FOUND")]
    TenantNotFound,

    #[error("[L3_TENANT_FAULT]: DUPLICATE_TENANT_EMAIL")]
    DuplicateTenantEmail,

    #[error("[L3_PROJECT_FAULT]: PROJECT_NOT_FOUND")]
    ProjectNotFound,

    #[error("[L3_API_KEY_FAULT]: API_KEY_NOT_FOUND")]
    ApiKeyNotFound,

    #[error("[L3_API_KEY_FAULT]: API_KEY_ALREADY_REVOKED")]
    ApiKeyAlreadyRevoked,

    // --- ESTRATO DE FACTURACIÓN (§3, §4.6) ---
    #[error("[L3_SUBSCRIPTION_FAULT]: SUBSCRIPTION_NOT_FOUND")]
    SubscriptionNotFound,

    /// Ya existe una suscripción `Active` para este tenant.
    #[error("[L3_SUBSCRIPTION_FAULT]: DUPLICATE_ACTIVE_SUBSCRIPTION")]
    DuplicateActiveSubscription,

    // --- ESTRATO DE CONTROL DE LEADERBOARDS (§4.4) ---
    #[error("[L3_LEADERBOARD_FAULT]: LEADERBOARD_NOT_FOUND")]
    LeaderboardNotFound,

    #[error("[L3_LEADERBOARD_FAULT]: DUPLICATE_LEADERBOARD_NAME")]
    DuplicateLeaderboardName,

    #[error("[L3_SEASON_FAULT]: SEASON_NOT_FOUND")]
    SeasonNotFound,
}
