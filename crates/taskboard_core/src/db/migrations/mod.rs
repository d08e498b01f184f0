//! Schema steps for the `kv_store` table.
//!
//! Each step is a SQL script tagged with the storage schema version it
//! produces. Steps run in one transaction, so a storage file is either fully
//! at the new version or untouched. The JSON task blob stored under `tasks`
//! is opaque here; only the table that holds it changes shape.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    sql: &'static str,
}

/// Ordered by `version`, strictly increasing.
const KV_STORE_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_kv_store.sql"),
}];

/// Storage schema version this build writes.
pub fn latest_version() -> u32 {
    KV_STORE_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the `kv_store` schema of `conn` up to [`latest_version`].
///
/// # Errors
/// - `StorageSchemaTooNew` when the file was written by a newer build.
/// - `Sqlite` when a step fails; nothing from the batch is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = stored_schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::StorageSchemaTooNew { found, supported });
    }

    let pending: Vec<SchemaStep> = KV_STORE_STEPS
        .iter()
        .copied()
        .filter(|step| step.version > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} steps={}",
        found,
        supported,
        pending.len()
    );
    Ok(())
}

fn stored_schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?;
    Ok(version)
}
