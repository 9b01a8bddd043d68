// [apps/gateway/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY APPLICATION STATE (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: CONTENEDOR DE INYECCIÓN DE DEPENDENCIAS COMPARTIDO
 *
 * Un único punto de composición para los ocho repositorios
 * relacionales y los cinco adaptadores de caché que respaldan la
 * superficie HTTP (§6.1).
 * =================================================================
 */

use crate::config::GatewayConfig;
use ledger_infra_cache::{AuthCache, CachePool, EventPublisher, RateLimiter, ScoreStore, UsageCounters};
use ledger_infra_db::{
    ApiKeyRepository, LeaderboardRepository, ProjectRepository, RelationalClient, ScoreEventRepository,
    SeasonRepository, SubscriptionRepository, TenantRepository, UsageRepository,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub tenants: Arc<TenantRepository>,
    pub projects: Arc<ProjectRepository>,
    pub api_keys: Arc<ApiKeyRepository>,
    pub subscriptions: Arc<SubscriptionRepository>,
    pub leaderboards: Arc<LeaderboardRepository>,
    pub seasons: Arc<SeasonRepository>,
    pub score_events: Arc<ScoreEventRepository>,
    pub usage_records: Arc<UsageRepository>,

    pub score_store: Arc<ScoreStore>,
    pub rate_limiter: Arc<RateLimiter>,
    pub auth_cache: Arc<AuthCache>,
    pub usage_counters: Arc<UsageCounters>,
    pub event_publisher: Arc<EventPublisher>,

    /// Secreto compartido para `X-Internal-Secret`, comparado en
    /// tiempo constante vía `subtle` en `middleware::internal_guard`.
    pub internal_secret: Arc<String>,

    /// Parámetros de arranque resueltos (§10.3): flags y TTLs que el
    /// resto del gateway lee en lugar de constantes incrustadas.
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    pub fn new(database_client: RelationalClient, cache_pool: CachePool, config: GatewayConfig) -> Self {
        Self {
            tenants: Arc::new(TenantRepository::new(database_client.clone())),
            projects: Arc::new(ProjectRepository::new(database_client.clone())),
            api_keys: Arc::new(ApiKeyRepository::new(database_client.clone())),
            subscriptions: Arc::new(SubscriptionRepository::new(database_client.clone())),
            leaderboards: Arc::new(LeaderboardRepository::new(database_client.clone())),
            seasons: Arc::new(SeasonRepository::new(database_client.clone())),
            score_events: Arc::new(ScoreEventRepository::new(database_client.clone())),
            usage_records: Arc::new(UsageRepository::new(database_client)),

            score_store: Arc::new(ScoreStore::new(cache_pool.clone())),
            rate_limiter: Arc::new(RateLimiter::new(cache_pool.clone())),
            auth_cache: Arc::new(AuthCache::new(cache_pool.clone())),
            usage_counters: Arc::new(UsageCounters::with_retention(cache_pool.clone(), config.usage_retention_days)),
            event_publisher: Arc::new(EventPublisher::new(cache_pool)),

            internal_secret: Arc::new(config.internal_api_secret.clone()),
            config: Arc::new(config),
        }
    }
}
