//! # Database Infrastructure
//!
//! Initializes the [SurrealDB](https://surrealdb.com) connection shared by the feature slices
//! and exposes a typed [`Table`] per [`Record`] type on top of it.
//!
//! * Any engine the `any` driver understands works; the service runs on `mem://`.
//! * [`Database::define`] creates a record's table and its `UNIQUE` indexes.
//! * Records are keyed `<table>:<n>` with `n` counting up from 1, which is also the default
//!   ordering of every query.
//!
//! ## Example
//!
//! ```rust
//! use surrealdb::types::SurrealValue;
//! use taxi_database::{Database, DatabaseError, Lookup, Record, RecordId};
//!
//! #[derive(Debug, Clone, SurrealValue)]
//! struct Plate {
//!     id: RecordId,
//!     number: String,
//! }
//!
//! impl Record for Plate {
//!     const TABLE: &'static str = "plate";
//!     const UNIQUE: &'static [&'static str] = &["number"];
//!
//!     fn id(&self) -> RecordId {
//!         self.id
//!     }
//!
//!     fn set_id(&mut self, id: RecordId) {
//!         self.id = id;
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder().url("mem://").session("taxi", "fleet").init().await?;
//!     let plates = db.define::<Plate>().await?;
//!     plates.insert(Plate { id: 0, number: "AA1234BB".into() }).await?;
//!
//!     let found = plates.find_where(&Lookup::icontains("number", "aa12")).await?;
//!     assert_eq!(found[0].id, 1);
//!     Ok(())
//! }
//! ```

mod error;
mod record;
mod table;

pub use error::{DatabaseError, DatabaseErrorExt};
pub use record::{Record, RecordId};
pub use table::{Lookup, Table};

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Inner state of the [`Database`] wrapper.
#[derive(Debug)]
pub struct DatabaseInner {
    instance: Surreal<Any>,
    // Held across id allocation and the insert that uses the id.
    writes: Mutex<()>,
    ns: String,
    db: String,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "SurrealDB session handle dropped");
    }
}

/// `SurrealDB` client wrapper that provides thread-safety and contextual error handling.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Creates a new [`DatabaseBuilder`].
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.inner.ns
    }

    /// Database name inside the namespace.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.db
    }

    /// Handle to the table of `T`. Reading a table that was never defined yields no rows.
    pub fn table<T: Record>(&self) -> Table<T> {
        Table::new(self.clone())
    }

    /// Defines the table of `T` and one `UNIQUE` index per [`Record::UNIQUE`] column.
    /// Existing definitions are left as they are.
    ///
    /// # Errors
    /// [`DatabaseError::Surreal`] if a definition is rejected.
    pub async fn define<T: Record>(&self) -> Result<Table<T>, DatabaseError> {
        let table = T::TABLE;
        let indexes: String = T::UNIQUE
            .iter()
            .map(|column| {
                format!(
                    "DEFINE INDEX IF NOT EXISTS {table}_{column} ON {table} FIELDS {column} UNIQUE;"
                )
            })
            .collect();

        self.query(format!("DEFINE TABLE IF NOT EXISTS {table} SCHEMALESS;{indexes}"))
            .await
            .context(format!("Defining {table}"))?
            .check()
            .map_err(surrealdb::Error::from)
            .context(format!("Defining {table}"))?;

        debug!(table, unique = ?T::UNIQUE, "Table defined");
        Ok(self.table())
    }

    pub(crate) async fn writer(&self) -> MutexGuard<'_, ()> {
        self.inner.writes.lock().await
    }
}

impl Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

/// A fluent builder for configuring and establishing a `SurrealDB` connection.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
}

impl DatabaseBuilder {
    /// Creates a new [`DatabaseBuilder`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the connection URL, e.g. `mem://`.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the namespace and database name.
    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Consumes the builder and connects.
    ///
    /// # Process
    /// 1. **Validation**: URL, namespace and database name must be present and non-blank.
    /// 2. **Engine Initialization**: connects through the `any` engine.
    /// 3. **Resilience**: up to 3 health checks, backing off from 200ms.
    /// 4. **Session Activation**: selects the namespace and database.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] if a parameter is missing.
    /// * [`DatabaseError::Connection`] if the engine fails to start or remains unhealthy.
    /// * [`DatabaseError::Surreal`] if the session activation fails.
    #[instrument(skip(self), fields(url = ?self.url, ns = ?self.ns, db = ?self.db))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = required(self.url, "URL")?;
        let ns = required(self.ns, "Namespace")?;
        let db = required(self.db, "Database")?;

        let instance = connect(&url).await.map_err(|e| DatabaseError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        let mut delay = Duration::from_millis(200);
        for attempt in 1..=3 {
            if instance.health().await.is_ok() {
                break;
            }
            if attempt == 3 {
                return Err(DatabaseError::Connection {
                    message: "Unhealthy after retries".into(),
                    context: Some(url.into()),
                });
            }
            warn!(attempt, ?delay, "Database not ready, retrying...");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        instance.use_ns(&ns).use_db(&db).await.context("Activating session")?;
        info!(namespace = %ns, database = %db, %url, "SurrealDB connection established");

        Ok(Database {
            inner: Arc::new(DatabaseInner { instance, writes: Mutex::new(()), ns, db }),
        })
    }
}

fn required(value: Option<String>, what: &'static str) -> Result<String, DatabaseError> {
    value.filter(|value| !value.trim().is_empty()).ok_or_else(|| DatabaseError::Validation {
        message: format!("{what} is required").into(),
        context: None,
    })
}
