// [libs/infra/cache/src/lib.rs]
/*!
 * APARATO: CACHE INFRASTRUCTURE BARREL
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 *
 * Un único pool de Redis sirve cuatro responsabilidades distintas
 * (§4.2, §4.3, §4.5, §6.3): sorted-sets de puntaje, rate limiting por
 * token-bucket, memoización de autenticación, contadores de uso y el
 * stream durable de eventos de dominio.
 */

pub mod auth_cache;
pub mod client;
pub mod errors;
pub mod rate_limiter;
pub mod score_store;
pub mod stream;
pub mod usage_counters;

pub use auth_cache::AuthCache;
pub use client::CachePool;
pub use errors::CacheError;
pub use rate_limiter::{RateLimitDecision, RateLimiter};
pub use score_store::{BatchScoreUpdate, LeaderboardMetadata, RankResult, ScoreStore, TopResult, UpdateOutcome};
pub use stream::{backoff_delay, DeliveredEvent, EventConsumer, EventPublisher};
pub use usage_counters::UsageCounters;
