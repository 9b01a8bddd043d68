// [libs/infra/db/src/lib.rs]
/*!
 * APARATO: RELATIONAL PERSISTENCE BARREL
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 *
 * Superficie pública del adaptador de persistencia relacional:
 * conexión, esquema, catálogo de errores y repositorios por
 * agregado (§3).
 */

pub mod client;
pub mod errors;
pub mod repositories;
pub mod schema;

pub use client::RelationalClient;
pub use errors::DbError;
pub use repositories::{
    ApiKeyRepository, LeaderboardRepository, ProjectRepository, ScoreEventRepository,
    SeasonRepository, SubscriptionRepository, TenantRepository, UsageRepository,
};
