// [apps/gateway/src/kernel.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY KERNEL (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: IGNICIÓN DE INFRAESTRUCTURA Y ARRANQUE DEL SERVIDOR HTTP
 *
 * Sin daemons de fondo: la publicación de eventos (§4.5) es
 * best-effort dentro del propio request, no un barrido periódico.
 * =================================================================
 */

use crate::config::GatewayConfig;
use crate::routes::build_router;
use crate::state::AppState;
use ledger_infra_cache::CachePool;
use ledger_infra_db::RelationalClient;
use std::net::{IpAddr, SocketAddr};
use tracing::{error, info, instrument};

pub struct GatewayKernel {
    port: u16,
    state: AppState,
}

impl GatewayKernel {
    #[instrument(skip(config))]
    pub async fn ignite(config: GatewayConfig) -> Self {
        let port = config.port;
        let database_client = RelationalClient::connect(&config.database_url, config.database_auth_token.clone())
            .await
            .expect("FATAL: relational link collapse, ignition aborted");

        let cache_pool = CachePool::connect(&config.redis_url).expect("FATAL: cache pool provisioning failed");

        Self { port, state: AppState::new(database_client, cache_pool, config) }
    }

    pub async fn launch(self) {
        let router = build_router(self.state);
        let bind_address = SocketAddr::new("0.0.0.0".parse::<IpAddr>().unwrap(), self.port);

        info!("🚀 [GATEWAY]: listening at {}", bind_address);

        let listener = tokio::net::TcpListener::bind(bind_address)
            .await
            .expect("CRITICAL_FAULT: failed to bind network port");

        if let Err(server_error) = axum::serve(listener, router).await {
            error!("💀 [GATEWAY]: runtime failure: {}", server_error);
            std::process::exit(1);
        }
    }
}
