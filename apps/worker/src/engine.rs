// [apps/worker/src/engine.rs]
/*!
 * =================================================================
 * APARATO: PROJECTION ENGINE (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: WORKER EXECUTION LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: CONSUMO DURADERO DEL STREAM Y PROYECCIÓN (§4.5, §6.4)
 *
 * Recorre los tres subjects (`score.updated`, `leaderboard.created`,
 * `leaderboard.deleted`) en un ciclo continuo. Cada entrada exitosa
 * se confirma con `XACK`; un fallo de proyección se registra y la
 * entrada queda pendiente para redelivery (at-least-once, §4.5).
 * =================================================================
 */

use ledger_domain_models::StreamEvent;
use ledger_infra_cache::{backoff_delay, DeliveredEvent, EventConsumer, ScoreStore};
use ledger_infra_db::ScoreEventRepository;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

const SUBJECTS: [&str; 3] = ["score.updated", "leaderboard.created", "leaderboard.deleted"];

pub struct ProjectionEngine {
    consumer: Arc<EventConsumer>,
    score_store: Arc<ScoreStore>,
    score_events: Arc<ScoreEventRepository>,
    shutdown_signal: Arc<AtomicBool>,
}

impl ProjectionEngine {
    pub fn new(
        consumer: Arc<EventConsumer>,
        score_store: Arc<ScoreStore>,
        score_events: Arc<ScoreEventRepository>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self { consumer, score_store, score_events, shutdown_signal }
    }

    /// Bucle principal: asegura los grupos consumidores y luego recorre
    /// los tres subjects indefinidamente hasta la señal de apagado.
    #[instrument(skip(self))]
    pub async fn run(&self) -> anyhow::Result<()> {
        self.consumer.ensure_groups(&SUBJECTS).await?;
        info!("📡 [PROJECTOR]: consumer groups provisioned for {} subjects.", SUBJECTS.len());

        while !self.shutdown_signal.load(Ordering::SeqCst) {
            for subject in SUBJECTS {
                if self.shutdown_signal.load(Ordering::SeqCst) {
                    break;
                }
                self.drain_subject(subject).await;
            }
        }

        info!("🏁 [PROJECTOR]: shutdown signal observed, loop terminated.");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn drain_subject(&self, subject: &str) {
        let delivered = match self.consumer.poll(subject).await {
            Ok(entries) => entries,
            Err(poll_fault) => {
                error!("❌ [PROJECTOR]: poll failed on '{}': {}", subject, poll_fault);
                tokio::time::sleep(backoff_delay()).await;
                return;
            }
        };

        if delivered.is_empty() {
            return;
        }

        debug!("[PROJECTOR]: {} entries delivered on '{}'.", delivered.len(), subject);
        for entry in delivered {
            self.dispatch(subject, entry).await;
        }
    }

    async fn dispatch(&self, subject: &str, entry: DeliveredEvent) {
        let DeliveredEvent { entry_id, event } = entry;

        let outcome = match event {
            StreamEvent::ScoreUpdated(payload) => self
                .score_events
                .insert(
                    payload.tenant_id,
                    payload.project_id,
                    payload.leaderboard_id,
                    &payload.user_id,
                    payload.score,
                    payload.increment,
                )
                .await
                .map(|_| ())
                .map_err(anyhow::Error::from),
            StreamEvent::LeaderboardCreated(payload) => self
                .score_store
                .set_metadata(
                    payload.tenant_id,
                    payload.project_id,
                    payload.leaderboard_id,
                    &payload.name,
                    payload.sort_order,
                    payload.update_mode,
                    payload.ttl_days,
                )
                .await
                .map_err(anyhow::Error::from),
            StreamEvent::LeaderboardDeleted(payload) => self
                .score_store
                .purge(payload.tenant_id, payload.project_id, payload.leaderboard_id)
                .await
                .map_err(anyhow::Error::from),
        };

        match outcome {
            Ok(()) => {
                if let Err(ack_fault) = self.consumer.ack(subject, &entry_id).await {
                    warn!("⚠️ [PROJECTOR]: ack failed for {} on '{}': {}", entry_id, subject, ack_fault);
                }
            }
            Err(projection_fault) => {
                error!(
                    "❌ [PROJECTOR]: projection failed for {} on '{}', leaving unacked for redelivery: {}",
                    entry_id, subject, projection_fault
                );
            }
        }
    }
}
