/**
 * =================================================================
 * APARATO: SOVEREIGN DATABASE SCHEMA (V1.0 - LEDGER GATEWAY)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. TENANCY STRATA: Tenants, proyectos, keys y suscripciones forman
 *    el árbol de propiedad del sistema multi-tenant.
 * 2. LEADERBOARD CONTROL-PLANE: Leaderboards y temporadas son puro
 *    metadato; el sorted-set vive en la caché, no aquí.
 * 3. ANALYTICS LOG: `score_events` es append-only; `usage_records`
 *    se upsert-ea diariamente y se congela tras el cierre de mes.
 * 4. IDEMPOTENCIA: Gestión de errores para migraciones en caliente.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument, warn};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 * Define las entidades base del sistema de leaderboards (§3).
 */
const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_TENANTS", r#"
        CREATE TABLE IF NOT EXISTS tenants (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_PROJECTS", r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL REFERENCES tenants(id),
            name TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_API_KEYS", r#"
        CREATE TABLE IF NOT EXISTS api_keys (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id),
            name TEXT NOT NULL,
            key_hash TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            last_used_at DATETIME,
            revoked_at DATETIME
        );
    "#),
    ("TABLE_SUBSCRIPTIONS", r#"
        CREATE TABLE IF NOT EXISTS subscriptions (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL REFERENCES tenants(id),
            plan_type TEXT NOT NULL DEFAULT 'free',
            status TEXT NOT NULL DEFAULT 'active',
            period_start DATETIME NOT NULL,
            period_end DATETIME NOT NULL,
            cancel_at_period_end INTEGER NOT NULL DEFAULT 0
        );
    "#),
    ("TABLE_LEADERBOARDS", r#"
        CREATE TABLE IF NOT EXISTS leaderboards (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id),
            tenant_id TEXT NOT NULL REFERENCES tenants(id),
            name TEXT NOT NULL,
            description TEXT,
            sort_order TEXT NOT NULL DEFAULT 'desc',
            update_mode TEXT NOT NULL DEFAULT 'replace',
            reset_schedule TEXT,
            ttl_days INTEGER,
            is_active INTEGER NOT NULL DEFAULT 1,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_SEASONS", r#"
        CREATE TABLE IF NOT EXISTS seasons (
            id TEXT PRIMARY KEY,
            leaderboard_id TEXT NOT NULL REFERENCES leaderboards(id),
            name TEXT NOT NULL,
            start_date DATETIME NOT NULL,
            end_date DATETIME NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            metadata TEXT NOT NULL DEFAULT '{}'
        );
    "#),
    ("TABLE_SCORE_EVENTS", r#"
        CREATE TABLE IF NOT EXISTS score_events (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            project_id TEXT NOT NULL,
            leaderboard_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            score REAL NOT NULL,
            increment INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_USAGE_RECORDS", r#"
        CREATE TABLE IF NOT EXISTS usage_records (
            tenant_id TEXT NOT NULL,
            project_id TEXT NOT NULL,
            date TEXT NOT NULL,
            score_updates INTEGER NOT NULL DEFAULT 0,
            leaderboard_reads INTEGER NOT NULL DEFAULT 0,
            total_requests INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY(tenant_id, project_id, date)
        );
    "#),
];

/**
 * ESTRATO 2: EVOLUCIÓN (Mutaciones de Columna)
 * Asegura que las tablas existentes se adapten a nuevas capacidades
 * sin romper despliegues ya solidificados.
 */
const EVOLUTIONARY_STRATA: &[(&str, &str)] = &[
    ("LEADERBOARD_DESCRIPTION", "ALTER TABLE leaderboards ADD COLUMN description TEXT"),
    ("LEADERBOARD_RESET_SCHEDULE", "ALTER TABLE leaderboards ADD COLUMN reset_schedule TEXT"),
    ("SUBSCRIPTION_CANCEL_FLAG", "ALTER TABLE subscriptions ADD COLUMN cancel_at_period_end INTEGER NOT NULL DEFAULT 0"),
    ("API_KEY_LAST_USED", "ALTER TABLE api_keys ADD COLUMN last_used_at DATETIME"),
];

/**
 * ESTRATO 3: ENDURECIMIENTO (Índices de Aceleración)
 * Optimiza las consultas del hot path (resolución de tenant por key,
 * listado de leaderboards por proyecto, agregación de uso mensual).
 */
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_PROJECTS_TENANT", "CREATE INDEX IF NOT EXISTS idx_projects_tenant ON projects(tenant_id);"),
    ("IDX_API_KEYS_PROJECT", "CREATE INDEX IF NOT EXISTS idx_api_keys_project ON api_keys(project_id);"),
    ("IDX_API_KEYS_REVOKED", "CREATE INDEX IF NOT EXISTS idx_api_keys_revoked ON api_keys(project_id, revoked_at);"),
    ("IDX_SUBSCRIPTIONS_TENANT", "CREATE INDEX IF NOT EXISTS idx_subscriptions_tenant ON subscriptions(tenant_id, status);"),
    ("IDX_LEADERBOARDS_PROJECT", "CREATE INDEX IF NOT EXISTS idx_leaderboards_project ON leaderboards(project_id);"),
    ("IDX_SEASONS_LEADERBOARD", "CREATE INDEX IF NOT EXISTS idx_seasons_leaderboard ON seasons(leaderboard_id);"),
    ("IDX_SCORE_EVENTS_LEADERBOARD", "CREATE INDEX IF NOT EXISTS idx_score_events_leaderboard ON score_events(leaderboard_id, created_at);"),
    ("IDX_USAGE_TENANT_DATE", "CREATE INDEX IF NOT EXISTS idx_usage_tenant_date ON usage_records(tenant_id, date);"),
];

/**
 * Ejecuta la secuencia maestra de sincronización del esquema estructural.
 *
 * # Errors:
 * Retorna error si alguna tabla base falla en solidificarse, indicando
 * un colapso en el enlace con el motor libSQL.
 */
#[instrument(skip(database_connection))]
pub async fn apply_full_sovereign_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization...");

    solidify_base_strata(database_connection).await?;
    execute_evolutionary_repair(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Tactical Ledger level and certified.");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(*sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {}", identifier))?;
    }
    Ok(())
}

async fn execute_evolutionary_repair(db: &Connection) -> Result<()> {
    for (identifier, sql) in EVOLUTIONARY_STRATA {
        match db.execute(*sql, ()).await {
            Ok(_) => info!("  🟢 [REPAIR_OK]: Applied evolutionary stratum {}", identifier),
            Err(e) => {
                let message = e.to_string();
                if message.contains("duplicate column name") {
                    debug!("  ⚪ [REPAIR_SKIP]: {} already level.", identifier);
                } else {
                    warn!("  ⚠️ [REPAIR_BYPASS]: {} check incomplete: {}", identifier, message);
                }
            }
        }
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(*sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {}", identifier))?;
    }
    Ok(())
}
