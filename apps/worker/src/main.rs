// [apps/worker/src/main.rs]
/*!
 * =================================================================
 * APARATO: WORKER SHELL (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO E IGNICIÓN DEL PROYECTOR
 * =================================================================
 */

use clap::Parser;
use dotenvy::dotenv;
use ledger_infra_cache::{CachePool, EventConsumer, ScoreStore};
use ledger_infra_db::{RelationalClient, ScoreEventRepository};
use ledger_shared_heimdall::init_tracing;
use ledger_worker_lib::ProjectionEngine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Directivas de arranque del trabajador, inyectadas vía CLI o entorno.
#[derive(Parser, Debug)]
#[command(author, version, about = "Ledger gateway durable stream projector")]
struct WorkerDirectives {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "TURSO_AUTH_TOKEN")]
    database_access_token: Option<String>,

    #[arg(long, env = "REDIS_URL")]
    redis_url: String,

    /// Identificador único de este consumidor dentro del grupo duradero.
    #[arg(long, env = "WORKER_CONSUMER_NAME", default_value = "worker-1")]
    consumer_name: String,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing("ledger_worker");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(async {
        info!("📡 [WORKER]: ignition sequence starting...");

        let directives = WorkerDirectives::parse();

        let database_client =
            RelationalClient::connect(&directives.database_url, directives.database_access_token).await?;
        let cache_pool = CachePool::connect(&directives.redis_url)?;

        let score_events = Arc::new(ScoreEventRepository::new(database_client));
        let score_store = Arc::new(ScoreStore::new(cache_pool.clone()));
        let consumer = Arc::new(EventConsumer::new(cache_pool, directives.consumer_name.clone()));

        let shutdown_signal = Arc::new(AtomicBool::new(false));
        let shutdown_signal_for_ctrl_c = Arc::clone(&shutdown_signal);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("⚠️ [SIGNAL]: termination requested, draining in-flight entries...");
                shutdown_signal_for_ctrl_c.store(true, Ordering::SeqCst);
            }
        });

        let engine = ProjectionEngine::new(consumer, score_store, score_events, shutdown_signal);

        info!("🚀 [WORKER_ONLINE]: consumer '{}' operational.", directives.consumer_name);
        engine.run().await?;

        info!("🏁 [WORKER]: shutdown sequence concluded.");
        Ok(())
    })
}
