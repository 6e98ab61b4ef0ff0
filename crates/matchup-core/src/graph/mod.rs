//! Adapter over the external graph store.
//!
//! The store is reachable by URI (`ws://host:port`, `rocksdb://path`,
//! `mem://`) with optional root credentials. One adapter is opened per
//! command invocation and released on every exit path when dropped.

mod error;

pub use error::StoreError;

use serde::de::DeserializeOwned;
use surrealdb::engine::any::{connect, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

use crate::config::StoreConfig;

/// Named parameters bound to a statement.
pub type Params = Vec<(&'static str, serde_json::Value)>;

/// Connection to the graph store.
pub struct GraphStore {
    db: Surreal<Any>,
}

impl GraphStore {
    /// Connect to the store described by the configuration and select the
    /// working namespace/database. Credentials are only presented when both
    /// username and password are configured.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let db = connect(config.uri.as_str()).await?;
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            db.signin(Root { username, password }).await?;
        }
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;
        Ok(Self { db })
    }

    async fn run(&self, statement: String, params: Params) -> Result<surrealdb::Response, StoreError> {
        tracing::debug!(statement = statement.as_str(), "running store statement");
        let mut query = self.db.query(statement);
        for (key, value) in params {
            query = query.bind((key, value));
        }
        let response = query.await?.check()?;
        Ok(response)
    }

    /// Run one write statement as its own transaction.
    pub async fn execute(&self, statement: &str, params: Params) -> Result<(), StoreError> {
        self.run(statement.to_string(), params).await.map(|_| ())
    }

    /// Run a batch of statements as one atomic transaction. On failure the
    /// whole unit rolls back; no partial application is observable.
    pub async fn execute_transactional(
        &self,
        statements: &[&str],
        params: Params,
    ) -> Result<(), StoreError> {
        let mut batch = String::from("BEGIN TRANSACTION;\n");
        for statement in statements {
            batch.push_str(statement);
            batch.push_str(";\n");
        }
        batch.push_str("COMMIT TRANSACTION;");
        self.run(batch, params).await.map(|_| ())
    }

    /// Run a read-only statement and materialize every matching row.
    pub async fn query_rows<T: DeserializeOwned>(
        &self,
        statement: &str,
        params: Params,
    ) -> Result<Vec<T>, StoreError> {
        let mut response = self.run(statement.to_string(), params).await?;
        Ok(response.take(0)?)
    }
}
