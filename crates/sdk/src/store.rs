//! The cache store.
//!
//! A `Store` may exist before its database is attached; reads against an
//! unopened store report "not ready" instead of an empty result.

use std::sync::{Arc, OnceLock};

use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tokio::sync::broadcast;

use crate::{EngineError, ResultEngine, locks::EntityKind};

const CHANGE_CAPACITY: usize = 256;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($db:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin($db).await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Clone, Debug)]
pub struct Store {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    database: OnceLock<DatabaseConnection>,
    changes: broadcast::Sender<EntityKind>,
}

impl Store {
    /// A store without a database. Every read returns "not ready" until
    /// [`Store::attach`] is called.
    pub fn unopened() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                database: OnceLock::new(),
                changes,
            }),
        }
    }

    /// Connect to `url` and bring the schema up to date.
    pub async fn open(url: &str) -> ResultEngine<Self> {
        let mut options = ConnectOptions::new(url);
        if url.contains(":memory:") {
            // Each pooled connection would get its own empty database.
            options.max_connections(1).min_connections(1);
        }
        options.sqlx_logging(false);
        let database = Database::connect(options).await?;
        Migrator::up(&database, None).await?;
        tracing::info!("cache store opened");

        let store = Self::unopened();
        store.attach(database)?;
        Ok(store)
    }

    /// Attach an already migrated database.
    pub fn attach(&self, database: DatabaseConnection) -> ResultEngine<()> {
        self.inner
            .database
            .set(database)
            .map_err(|_| EngineError::Setup("cache store already opened".to_string()))
    }

    pub fn is_ready(&self) -> bool {
        self.inner.database.get().is_some()
    }

    pub fn database(&self) -> Option<&DatabaseConnection> {
        self.inner.database.get()
    }

    pub(crate) fn require(&self) -> ResultEngine<&DatabaseConnection> {
        self.database().ok_or(EngineError::StoreNotReady)
    }

    /// Listen for committed changes, one message per touched entity type.
    pub fn subscribe(&self) -> broadcast::Receiver<EntityKind> {
        self.inner.changes.subscribe()
    }

    pub(crate) fn notify(&self, kinds: &[EntityKind]) {
        for kind in kinds {
            // No receivers is the common case.
            let _ = self.inner.changes.send(*kind);
        }
    }
}
