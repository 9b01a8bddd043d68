// [apps/worker/src/lib.rs]
/*!
 * =================================================================
 * APARATO: WORKER LIBRARY ROOT (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: ESTRATO L1-WORKER
 * RESPONSABILIDAD: EXPOSICIÓN NOMINAL DEL MOTOR DE PROYECCIÓN
 * =================================================================
 */

pub mod engine;

pub mod prelude {
    pub use crate::engine::ProjectionEngine;
}

pub use engine::ProjectionEngine;
