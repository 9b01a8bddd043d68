// [apps/gateway/src/handlers/mod.rs]
/*!
 * APARATO: HTTP HANDLER BARREL
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L1-APP)
 */

pub mod billing;
pub mod health;
pub mod identity;
pub mod leaderboards;
pub mod scores;
pub mod seasons;
pub mod usage;
