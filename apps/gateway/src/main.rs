// [apps/gateway/src/main.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY MAIN ENTRY POINT (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L1-APP)
 * RESPONSABILIDAD: CARGA DE ENTORNO E IGNICIÓN DEL KERNEL
 * =================================================================
 */

use dotenvy::dotenv;
use ledger_gateway::prelude::*;
use ledger_shared_heimdall::init_tracing;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("ledger_gateway");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(async {
        info!("🛰️  [GATEWAY]: ignition sequence starting...");

        let config = GatewayConfig::from_env();
        let port = config.port;

        let kernel = GatewayKernel::ignite(config).await;

        info!("🚀 [GATEWAY_ONLINE]: system operational on port {}", port);
        kernel.launch().await;

        Ok(())
    })
}
