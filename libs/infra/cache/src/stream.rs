// [libs/infra/cache/src/stream.rs]
/*!
 * =================================================================
 * APARATO: DURABLE EVENT STREAM (REDIS STREAMS BROKER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PUBLICACIÓN Y CONSUMO DURADERO DE EVENTOS (§4.5, §6.4)
 *
 * Un stream por subject (`events:score.updated`, etc). El Gateway
 * publica con `XADD`; el Worker consume con un grupo duradero
 * (`XREADGROUP`) y confirma explícitamente con `XACK`. Un fallo del
 * handler NO se confirma: el broker la redelivera (at-least-once).
 * La publicación nunca debe fallar la petición que la origina: los
 * errores se registran y se devoran aquí.
 * =================================================================
 */

use crate::errors::CacheError;
use crate::CachePool;
use ledger_domain_models::StreamEvent;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

const CONSUMER_GROUP: &str = "ledger-worker";
const BLOCK_MILLIS: usize = 5_000;

fn stream_name(subject: &str) -> String {
    format!("events:{}", subject)
}

pub struct EventPublisher {
    pool: CachePool,
}

impl EventPublisher {
    pub fn new(pool: CachePool) -> Self {
        Self { pool }
    }

    /// Publica un evento en el stream correspondiente a su subject.
    /// Los fallos de publicación se registran pero nunca se propagan
    /// como error de la petición que los origina.
    #[instrument(skip(self, event))]
    pub async fn publish(&self, event: &StreamEvent) {
        if let Err(publish_fault) = self.try_publish(event).await {
            error!("❌ [STREAM]: Failed to publish '{}' event: {}", event.subject(), publish_fault);
        }
    }

    async fn try_publish(&self, event: &StreamEvent) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let key = stream_name(event.subject());
        let payload = serde_json::to_string(event)?;

        let _: String = conn.xadd(&key, "*", &[("data", payload)]).await?;
        Ok(())
    }
}

/// Entrada cruda devuelta al Worker: contiene el `id` necesario para
/// el `XACK` posterior y el evento ya deserializado.
#[derive(Debug, Clone)]
pub struct DeliveredEvent {
    pub entry_id: String,
    pub event: StreamEvent,
}

pub struct EventConsumer {
    pool: CachePool,
    consumer_name: String,
}

impl EventConsumer {
    pub fn new(pool: CachePool, consumer_name: impl Into<String>) -> Self {
        Self { pool, consumer_name: consumer_name.into() }
    }

    /// Asegura la existencia del grupo consumidor para cada subject,
    /// creando el stream si aún no existe (`MKSTREAM`).
    #[instrument(skip(self))]
    pub async fn ensure_groups(&self, subjects: &[&str]) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        for subject in subjects {
            let key = stream_name(subject);
            let result: redis::RedisResult<()> =
                redis::cmd("XGROUP").arg("CREATE").arg(&key).arg(CONSUMER_GROUP).arg("0").arg("MKSTREAM").query_async(&mut conn).await;

            if let Err(creation_fault) = result {
                if !creation_fault.to_string().contains("BUSYGROUP") {
                    return Err(CacheError::from(creation_fault));
                }
                debug!("[STREAM]: Consumer group already provisioned for '{}'.", subject);
            }
        }
        Ok(())
    }

    /// Lee nuevas entradas (bloqueante hasta `BLOCK_MILLIS`) de un
    /// subject dado. Retorna un lote vacío en timeout, nunca un error.
    #[instrument(skip(self))]
    pub async fn poll(&self, subject: &str) -> Result<Vec<DeliveredEvent>, CacheError> {
        let mut conn = self.pool.get().await?;
        let key = stream_name(subject);

        let options = StreamReadOptions::default()
            .group(CONSUMER_GROUP, &self.consumer_name)
            .block(BLOCK_MILLIS)
            .count(32);

        let reply: StreamReadReply = conn.xread_options(&[&key], &[">"], &options).await?;

        let mut delivered = Vec::new();
        for stream_key in reply.keys {
            for stream_id in stream_key.ids {
                let raw: Option<String> = stream_id.get("data");
                let Some(raw) = raw else {
                    warn!("[STREAM]: Entry {} missing 'data' field, skipping.", stream_id.id);
                    continue;
                };
                match serde_json::from_str::<StreamEvent>(&raw) {
                    Ok(event) => delivered.push(DeliveredEvent { entry_id: stream_id.id, event }),
                    Err(decode_fault) => {
                        error!("❌ [STREAM]: Poison entry {} on '{}': {}", stream_id.id, subject, decode_fault);
                    }
                }
            }
        }
        Ok(delivered)
    }

    /// Confirma el procesamiento exitoso de una entrada. Si el
    /// handler falló, el llamador simplemente no invoca esto: la
    /// entrada permanece pendiente y será redeliverada.
    #[instrument(skip(self))]
    pub async fn ack(&self, subject: &str, entry_id: &str) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        let key = stream_name(subject);
        let _: i64 = conn.xack(&key, CONSUMER_GROUP, &[entry_id]).await?;
        Ok(())
    }
}

/// Intervalo recomendado entre ciclos de `poll` fallidos, para evitar
/// un reintento ajustado contra un broker momentáneamente inalcanzable.
pub fn backoff_delay() -> Duration {
    Duration::from_secs(2)
}
