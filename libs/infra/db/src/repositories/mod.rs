// [libs/infra/db/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY ACCESS MATRIX (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE SUBSISTEMAS DE PERSISTENCIA
 *
 * Un repositorio por agregado de §3. Centraliza la visibilidad para
 * que el Gateway y el Worker inyecten exactamente lo que necesitan.
 * =================================================================
 */

pub mod api_key;
pub mod leaderboard;
pub mod project;
pub mod score_event;
pub mod season;
pub mod subscription;
pub mod tenant;
pub mod usage;

pub use api_key::ApiKeyRepository;
pub use leaderboard::LeaderboardRepository;
pub use project::ProjectRepository;
pub use score_event::ScoreEventRepository;
pub use season::SeasonRepository;
pub use subscription::SubscriptionRepository;
pub use tenant::TenantRepository;
pub use usage::UsageRepository;
