use rusqlite::{Connection, OptionalExtension};

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "001",
        name: "initial",
        sql: include_str!("migrations/001_initial.sql"),
    },
    Migration {
        version: "002",
        name: "snapshot_meta",
        sql: include_str!("migrations/002_snapshot_meta.sql"),
    },
];

/// Version of the newest migration this build knows about.
pub fn latest_version() -> &'static str {
    MIGRATIONS
        .last()
        .map(|m| m.version)
        .unwrap_or("000")
}

pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )?;

    let applied = get_applied_migrations(conn)?;

    for migration in MIGRATIONS {
        if !applied.iter().any(|v| v == migration.version) {
            apply_migration(conn, migration)?;
        }
    }

    Ok(())
}

/// Applied migration versions, or `None` when the file has no tracking
/// table (an empty or foreign database).
pub fn applied_versions(conn: &Connection) -> rusqlite::Result<Option<Vec<String>>> {
    let tracked: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='schema_migrations'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    if tracked.is_none() {
        return Ok(None);
    }
    get_applied_migrations(conn).map(Some)
}

fn get_applied_migrations(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(versions)
}

fn mark_migration_applied(conn: &Connection, version: &str, name: &str) -> rusqlite::Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (version, name, &now),
    )?;
    Ok(())
}

/// Apply one migration and record it in a single transaction. A failing
/// statement rolls back both, so the version is never marked without its
/// tables.
fn apply_migration(conn: &Connection, migration: &Migration) -> rusqlite::Result<()> {
    tracing::info!(
        version = migration.version,
        name = migration.name,
        "Applying migration"
    );

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(migration.sql)?;
    mark_migration_applied(&tx, migration.version, migration.name)?;
    tx.commit()?;

    tracing::debug!(version = migration.version, "Migration applied");
    Ok(())
}
