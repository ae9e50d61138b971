//! Client facades grouping the contexts over one shared connection.
//!
//! # Design
//! A [`DbClient`] is bound to one database: its connection address is
//! `{server}/{db}` and document, view, index and search paths are relative to
//! it. A [`ServerClient`] talks to the server root and names databases per
//! call. Both hold the connection behind an `Arc` so contexts can be handed
//! out cheaply and the client can be shared across tasks.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::connection::{Connection, HttpConnection};
use crate::contexts::{
    Changes, Database, Databases, Documents, Entities, Queries, Searches, Views,
};
use crate::error::{ensure_not_blank, CouchError, Result};

pub struct DbClient {
    connection: Arc<dyn Connection>,
    documents: Documents,
    entities: Entities,
    views: Views,
    changes: Changes,
    database: Database,
    queries: Queries,
    searches: Searches,
}

impl DbClient {
    /// Connects over HTTP to `config.db_name` on `config.address`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let db_name = config
            .db_name
            .as_deref()
            .ok_or_else(|| CouchError::invalid("db_name", "must be configured"))?;
        ensure_not_blank("db_name", db_name)?;
        let connection = Arc::new(HttpConnection::for_db(config)?);
        Ok(Self::from_connection(connection, &config.address, db_name))
    }

    /// Wraps an existing connection whose address is the database URL.
    pub fn from_connection(
        connection: Arc<dyn Connection>,
        server_address: &str,
        db_name: &str,
    ) -> Self {
        Self {
            documents: Documents::new(connection.clone()),
            entities: Entities::new(connection.clone()),
            views: Views::new(connection.clone()),
            changes: Changes::new(connection.clone()),
            database: Database::new(connection.clone(), server_address, db_name),
            queries: Queries::new(connection.clone()),
            searches: Searches::new(connection.clone()),
            connection,
        }
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn documents(&self) -> &Documents {
        &self.documents
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    pub fn searches(&self) -> &Searches {
        &self.searches
    }
}

pub struct ServerClient {
    connection: Arc<dyn Connection>,
    databases: Databases,
}

impl ServerClient {
    /// Connects over HTTP to `config.address`; `db_name` is ignored.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let connection = Arc::new(HttpConnection::for_server(config)?);
        Ok(Self::from_connection(connection))
    }

    pub fn from_connection(connection: Arc<dyn Connection>) -> Self {
        Self {
            databases: Databases::new(connection.clone()),
            connection,
        }
    }

    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    pub fn databases(&self) -> &Databases {
        &self.databases
    }
}
