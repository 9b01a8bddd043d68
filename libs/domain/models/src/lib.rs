// [libs/domain/models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DOMAIN MODELS BARREL (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: DOMAIN LAYER (ESTRATO L2)
 * RESPONSABILIDAD: SINGLE SOURCE OF TRUTH DE TIPOS DE DOMINIO
 *
 * Centraliza las entidades y DTOs compartidos entre el Gateway, el
 * Worker y las capas de infraestructura. Ningún otro crate debe
 * redefinir estos tipos.
 * =================================================================
 */

pub mod tenant;
pub mod project;
pub mod api_key;
pub mod subscription;
pub mod leaderboard;
pub mod season;
pub mod score_event;
pub mod usage_record;
pub mod events;

pub use tenant::{CreateTenantPayload, Tenant};
pub use project::{CreateProjectPayload, Project};
pub use api_key::{ApiKey, ApiKeyValidation, CreateApiKeyPayload, CreateApiKeyResponse};
pub use subscription::{CreateSubscriptionPayload, PlanType, Subscription, SubscriptionStatus};
pub use leaderboard::{CreateLeaderboardPayload, Leaderboard, SortOrder, UpdateLeaderboardPayload, UpdateMode};
pub use season::{CreateSeasonPayload, Season};
pub use score_event::ScoreEvent;
pub use usage_record::{UsageDelta, UsageRecord};
pub use events::{LeaderboardCreatedEvent, LeaderboardDeletedEvent, ScoreUpdatedEvent, StreamEvent};
