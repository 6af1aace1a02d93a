//! Embedded database migrations for `SQLite`.
//!
//! Migrations are embedded at compile time and run programmatically, so a
//! host application only needs a connection pool.
//!
//! # Example
//!
//! ```rust,ignore
//! use anteroom::sqlite::migrations;
//! use sqlx::SqlitePool;
//!
//! async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20250110000001_create_workspaces_table",
        include_str!("../../migrations_sqlite/20250110000001_create_workspaces_table.sql"),
    ),
    (
        "20250110000002_create_profiles_table",
        include_str!("../../migrations_sqlite/20250110000002_create_profiles_table.sql"),
    ),
    (
        "20250110000003_create_workspace_memberships_table",
        include_str!(
            "../../migrations_sqlite/20250110000003_create_workspace_memberships_table.sql"
        ),
    ),
    (
        "20250110000004_create_workspace_invites_table",
        include_str!(
            "../../migrations_sqlite/20250110000004_create_workspace_invites_table.sql"
        ),
    ),
];

/// Runs all database migrations.
///
/// Migrations are executed in order and tracked in the `_anteroom_migrations`
/// table, so running this on every startup is safe.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Create migrations tracking table
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _anteroom_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    run_migrations(pool, MIGRATIONS).await
}

/// Runs a set of migrations against the database.
///
/// # Limitations
///
/// SQL statements are split by semicolons (`;`). Migrations containing
/// semicolons within string literals will not work correctly; the bundled
/// migrations avoid this.
async fn run_migrations(pool: &SqlitePool, migrations: &[(&str, &str)]) -> Result<(), sqlx::Error> {
    for (name, sql) in migrations {
        // Check if already applied
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _anteroom_migrations WHERE name = ?)")
                .bind(*name)
                .fetch_one(pool)
                .await?;

        if !applied {
            // SQLite doesn't support multiple statements in one execute,
            // so we split by semicolons and run each statement.
            for statement in sql.split(';') {
                let trimmed = statement.trim();
                if !trimmed.is_empty() {
                    pool.execute(trimmed).await?;
                }
            }

            // Record migration
            sqlx::query("INSERT INTO _anteroom_migrations (name) VALUES (?)")
                .bind(*name)
                .execute(pool)
                .await?;
        }
    }
    Ok(())
}
