//! Cache index database.
//!
//! An SQLite database built with migrations from `./migrations`.
//! One table, `images`, keyed logically by the content fingerprint.

use diesel::{ConnectionError, ConnectionResult, SqliteConnection};
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, SimpleAsyncConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use tokio::time::Duration;
use tracing::trace;

use crate::errors::DatabaseError;

pub mod api;
pub mod models;
pub mod schema;

/// Inner SQLite connection type.
pub type Connection = SyncConnectionWrapper<SqliteConnection>;

/// Result of database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

const MIGRATIONS: EmbeddedMigrations =
    diesel_migrations::embed_migrations!("src/database/migrations");

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Establish connection with SQLite database and configure it with:
/// - `PRAGMA journal_mode = WAL`
/// - `PRAGMA synchronous = NORMAL`
/// - `PRAGMA busy_timeout = 10_000`
async fn establish_connection_inner(database_url: &str) -> ConnectionResult<Connection> {
    trace!("establishing connection with {}", database_url);
    let mut connection = Connection::establish(database_url).await?;
    let query = format!(
        "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; PRAGMA busy_timeout = {};",
        BUSY_TIMEOUT.as_millis()
    );
    trace!("executing: {}", &query);
    connection
        .batch_execute(&query)
        .await
        .map_err(ConnectionError::CouldntSetupConfiguration)?;
    Ok(connection)
}

/// Establish connection to SQLite database with `database_url`.
///
/// Attempts to establish connection with existing database.
/// If database does not exist, it will be created.
pub async fn establish_connection(database_url: &str) -> DatabaseResult<Connection> {
    Ok(establish_connection_inner(database_url).await?)
}

/// Run pending migrations on SQLite database specified with `database_url`.
///
/// Safe to call on every start: an already-initialized database is left
/// untouched and its rows are preserved.
pub async fn run_migrations(database_url: &str) -> DatabaseResult<()> {
    let connection = establish_connection_inner(database_url).await?;
    let mut async_wrapper: AsyncConnectionWrapper<Connection> =
        AsyncConnectionWrapper::from(connection);

    trace!("running pending migrations");
    tokio::task::spawn_blocking(move || {
        let applied = async_wrapper
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;
        if applied.is_empty() {
            trace!("no migrations applied");
        } else {
            trace!("migrations applied:");
            for migration in &applied {
                trace!(" - {}", migration);
            }
        }
        Ok(())
    })
    .await
    .map_err(|e| DatabaseError::MigrationError(e.to_string()))?
}
