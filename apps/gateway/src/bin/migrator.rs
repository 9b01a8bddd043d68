// [apps/gateway/src/bin/migrator.rs]
/*!
 * =================================================================
 * APARATO: DB MIGRATOR CLI (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: OPS INFRASTRUCTURE (ESTRATO L6)
 * RESPONSABILIDAD: APLICACIÓN IDEMPOTENTE DEL ESQUEMA RELACIONAL
 * =================================================================
 */

use dotenvy::dotenv;
use ledger_infra_db::schema::apply_full_sovereign_schema;
use ledger_infra_db::RelationalClient;
use ledger_shared_heimdall::init_tracing;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("ledger_migrator");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(async {
        info!("🚀 [MIGRATOR]: initiating structural audit of the relational store...");

        let database_url = std::env::var("DATABASE_URL").expect("CRITICAL_FAULT: DATABASE_URL undefined");
        let database_token = std::env::var("TURSO_AUTH_TOKEN").ok();

        let database_client = match RelationalClient::connect(&database_url, database_token).await {
            Ok(client) => client,
            Err(connection_error) => {
                error!("❌ [UPLINK_FAULT]: failed to establish relational link: {}", connection_error);
                return Err(anyhow::anyhow!(connection_error));
            }
        };

        let connection = database_client
            .get_connection()
            .map_err(|error| anyhow::anyhow!("POOL_EXHAUSTED: {}", error))?;

        match apply_full_sovereign_schema(&connection).await {
            Ok(_) => {
                info!("✨ [MIGRATOR_SUCCESS]: schema is up to date.");
                Ok(())
            }
            Err(schema_fault) => {
                error!("💀 [SCHEMA_COLLAPSE]: {}", schema_fault);
                std::process::exit(1);
            }
        }
    })
}
