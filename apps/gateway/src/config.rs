// [apps/gateway/src/config.rs]
/*!
 * APARATO: CONFIGURACIÓN DE ARRANQUE (§10.3)
 * RESPONSABILIDAD: CARGA TIPADA DE VARIABLES DE ENTORNO
 */

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_AUTH_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_RL_KEY_TTL_SECS: u64 = 60;
const DEFAULT_USAGE_RETENTION_DAYS: i64 = 90;

/// Parámetros de arranque del gateway, resueltos una única vez desde el
/// entorno (§10.3). Los valores requeridos provocan un `CRITICAL_FAULT`
/// si faltan; el resto cae a los valores por defecto documentados aquí.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub database_url: String,
    pub database_auth_token: Option<String>,
    pub redis_url: String,
    pub internal_api_secret: String,
    pub rate_limit_enabled: bool,
    pub log_level: String,
    pub auth_cache_ttl_secs: u64,
    pub rl_key_ttl_secs: u64,
    pub usage_retention_days: i64,
}

impl GatewayConfig {
    /// Lee el entorno del proceso. Se espera que `dotenvy::dotenv()` ya
    /// se haya invocado antes de llamar a esto.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .expect("CRITICAL_FAULT: DATABASE_URL not defined in runtime environment");
        let database_auth_token = std::env::var("TURSO_AUTH_TOKEN").ok();
        let redis_url = std::env::var("REDIS_URL")
            .expect("CRITICAL_FAULT: REDIS_URL not defined in runtime environment");
        let internal_api_secret = std::env::var("INTERNAL_API_SECRET")
            .expect("CRITICAL_FAULT: INTERNAL_API_SECRET not defined in runtime environment");
        let port = std::env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .ok()
            .map(|raw| raw.trim().eq_ignore_ascii_case("true") || raw.trim() == "1")
            .unwrap_or(true);
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let auth_cache_ttl_secs = std::env::var("AUTH_CACHE_TTL_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_AUTH_CACHE_TTL_SECS);
        let rl_key_ttl_secs = std::env::var("RL_KEY_TTL_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_RL_KEY_TTL_SECS);
        let usage_retention_days = std::env::var("USAGE_RETENTION_DAYS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_USAGE_RETENTION_DAYS);

        Self {
            port,
            database_url,
            database_auth_token,
            redis_url,
            internal_api_secret,
            rate_limit_enabled,
            log_level,
            auth_cache_ttl_secs,
            rl_key_ttl_secs,
            usage_retention_days,
        }
    }
}

impl Default for GatewayConfig {
    /// Valores usados por la batería de pruebas de integración, donde no
    /// hay un `.env` real que leer.
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: "file::memory:?mode=memory".to_string(),
            database_auth_token: None,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            internal_api_secret: "test-internal-secret".to_string(),
            rate_limit_enabled: true,
            log_level: "info".to_string(),
            auth_cache_ttl_secs: DEFAULT_AUTH_CACHE_TTL_SECS,
            rl_key_ttl_secs: DEFAULT_RL_KEY_TTL_SECS,
            usage_retention_days: DEFAULT_USAGE_RETENTION_DAYS,
        }
    }
}
