//! Connection pool for the SQLite tree store.
//!
//! Every connection runs in WAL mode with a busy timeout, so the HTTP server
//! and the reminder job can share one database file. Migrations are embedded
//! and applied when the pool is built.

use std::path::Path;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a writer waits for another process's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised while building or using the pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },
    #[error("failed to open database: {message}")]
    Build { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL; PRAGMA busy_timeout = {};",
            BUSY_TIMEOUT.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Pooled checkout.
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Shared pool of SQLite connections to one database file.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<ConnectionManager<SqliteConnection>>,
}

impl DbPool {
    /// Open (creating when absent) the database at `path` and migrate it.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when the path is not UTF-8, the file
    /// cannot be opened, or a migration fails.
    pub fn open(path: &Path, max_size: u32) -> Result<Self, PoolError> {
        let url = path
            .to_str()
            .ok_or_else(|| PoolError::build(format!("{} is not valid UTF-8", path.display())))?;
        let inner = Pool::builder()
            .max_size(max_size)
            .connection_customizer(Box::new(SqlitePragmas))
            .build(ConnectionManager::<SqliteConnection>::new(url))
            .map_err(|err| PoolError::build(err.to_string()))?;
        let pool = Self { inner };

        let mut pooled = pool.get().map_err(|err| PoolError::build(err.to_string()))?;
        let conn: &mut SqliteConnection = &mut pooled;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| PoolError::build(format!("migration failed: {err}")))?;
        if !applied.is_empty() {
            info!(path = %path.display(), migrations = applied.len(), "database migrated");
        }
        Ok(pool)
    }

    /// Check out a connection. Blocks, so call it from a blocking task.
    pub fn get(&self) -> Result<DbConnection, PoolError> {
        self.inner
            .get()
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
