use elasticsearch::Elasticsearch;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{ensure, ResultExt, Snafu};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::bootstrap;
use crate::collection::Collection;
use crate::mapping::{CollectionDefinition, IndexPlan};
use crate::models::{BulkAction, BulkStats, DocumentRef, SearchResult};
use crate::remote::{self, Remote};
use crate::settings::ConnectionSettings;
use crate::storage::{self, ElasticsearchStorage};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Connection Identity Missing"))]
    IdentityMissing,

    #[snafu(display("Connection Identity Duplicate: {}", identity))]
    IdentityDuplicate { identity: String },

    #[snafu(display("Unknown Connection: {}", identity))]
    UnknownConnection { identity: String },

    #[snafu(display("Unknown Collection: {}", collection))]
    UnknownCollection { collection: String },

    #[snafu(display("Connection Error: {}", source))]
    RemoteConnection { source: remote::Error },

    #[snafu(display("Bootstrap Error: {}", source))]
    Bootstrap { source: bootstrap::Error },

    #[snafu(display("Operation Error: {}", source))]
    Operation { source: storage::Error },
}

/// What a connection is registered with: its unique identity plus the
/// settings used to open the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub identity: Option<String>,
    #[serde(flatten)]
    pub settings: ConnectionSettings,
}

impl ConnectionConfig {
    pub fn new(identity: impl Into<String>, settings: ConnectionSettings) -> Self {
        Self {
            identity: Some(identity.into()),
            settings,
        }
    }
}

/// One registered connection: its settings, the live client handle and the
/// registry of collections that declared a target index.
#[derive(Debug, Clone)]
pub struct Connection {
    settings: ConnectionSettings,
    storage: ElasticsearchStorage,
    collections: BTreeMap<String, Collection>,
}

impl Connection {
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &String> {
        self.collections.keys()
    }
}

/// The adapter facade. The host owns one of these and passes it by
/// reference to every call; there is no process-wide state.
///
/// Registration and teardown take `&mut self` and are expected to happen in
/// the host's start-up/shutdown sequence, not under steady-state load;
/// operations only borrow the registry.
#[derive(Debug, Default)]
pub struct Adapter {
    connections: BTreeMap<String, Connection>,
}

impl Adapter {
    pub fn new() -> Adapter {
        Adapter::default()
    }

    /// Register a connection: open a client from the settings, make sure
    /// every declared index exists (creating missing ones with the merged
    /// mappings), and build the collection registry.
    ///
    /// Identity validation happens before any network activity. A bootstrap
    /// failure aborts the whole registration; no partial record is kept.
    pub async fn register_connection(
        &mut self,
        config: ConnectionConfig,
        collections: BTreeMap<String, CollectionDefinition>,
    ) -> Result<(), Error> {
        let identity = match config.identity.as_deref() {
            Some(identity) if !identity.is_empty() => String::from(identity),
            _ => return Err(Error::IdentityMissing),
        };
        ensure!(
            !self.connections.contains_key(&identity),
            IdentityDuplicate {
                identity: identity.as_str(),
            }
        );

        let storage = config
            .settings
            .clone()
            .conn()
            .await
            .context(RemoteConnection)?;

        let plan = IndexPlan::from_collections(&collections);
        bootstrap::ensure_indices(&storage, &plan)
            .await
            .context(Bootstrap)?;

        let registry = collections
            .into_iter()
            .filter_map(|(name, definition)| {
                let index = definition.index?;
                Some((name, Collection::new(index, storage.clone())))
            })
            .collect();

        info!("registered connection '{}'", identity);
        self.connections.insert(
            identity,
            Connection {
                settings: config.settings,
                storage,
                collections: registry,
            },
        );
        Ok(())
    }

    /// Remove one connection's record, or every record when no identity is
    /// given. Unknown identities are a no-op; client handles are dropped,
    /// not explicitly closed.
    pub fn teardown(&mut self, identity: Option<&str>) {
        match identity {
            Some(identity) => {
                if self.connections.remove(identity).is_some() {
                    debug!("tore down connection '{}'", identity);
                }
            }
            None => {
                self.connections.clear();
                debug!("tore down all connections");
            }
        }
    }

    pub fn connection(&self, identity: &str) -> Option<&Connection> {
        self.connections.get(identity)
    }

    /// Raw client handle for operations not covered by the adapter surface.
    pub fn client(&self, identity: &str) -> Result<&Elasticsearch, Error> {
        let connection = self.lookup_connection(identity)?;
        Ok(connection.storage.client())
    }

    pub async fn search(
        &self,
        identity: &str,
        collection: &str,
        query: Value,
        extra_indices: Option<&[String]>,
    ) -> Result<SearchResult, Error> {
        self.lookup(identity, collection)?
            .search(query, extra_indices)
            .await
            .context(Operation)
    }

    pub async fn create(
        &self,
        identity: &str,
        collection: &str,
        document: Value,
        parent: Option<&str>,
    ) -> Result<DocumentRef, Error> {
        self.lookup(identity, collection)?
            .insert(document, parent)
            .await
            .context(Operation)
    }

    pub async fn update(
        &self,
        identity: &str,
        collection: &str,
        id: &str,
        changes: Value,
        parent: Option<&str>,
    ) -> Result<DocumentRef, Error> {
        self.lookup(identity, collection)?
            .update(id, changes, parent)
            .await
            .context(Operation)
    }

    pub async fn destroy(&self, identity: &str, collection: &str, id: &str) -> Result<(), Error> {
        self.lookup(identity, collection)?
            .destroy(id)
            .await
            .context(Operation)
    }

    pub async fn count(
        &self,
        identity: &str,
        collection: &str,
        query: Option<Value>,
    ) -> Result<u64, Error> {
        self.lookup(identity, collection)?
            .count(query)
            .await
            .context(Operation)
    }

    pub async fn bulk(
        &self,
        identity: &str,
        collection: &str,
        actions: Vec<BulkAction>,
    ) -> Result<BulkStats, Error> {
        self.lookup(identity, collection)?
            .bulk(actions)
            .await
            .context(Operation)
    }

    /// No-op: the backing store has no schema beyond what bootstrap created.
    pub async fn describe(&self, _identity: &str, _collection: &str) -> Result<(), Error> {
        debug!("describe is a no-op");
        Ok(())
    }

    /// No-op, see [`Adapter::describe`].
    pub async fn define(&self, _identity: &str, _collection: &str) -> Result<(), Error> {
        debug!("define is a no-op");
        Ok(())
    }

    /// No-op, see [`Adapter::describe`].
    pub async fn drop(&self, _identity: &str, _collection: &str) -> Result<(), Error> {
        debug!("drop is a no-op");
        Ok(())
    }

    fn lookup_connection(&self, identity: &str) -> Result<&Connection, Error> {
        self.connections
            .get(identity)
            .ok_or_else(|| Error::UnknownConnection {
                identity: String::from(identity),
            })
    }

    fn lookup(&self, identity: &str, collection: &str) -> Result<&Collection, Error> {
        self.lookup_connection(identity)?
            .collection(collection)
            .ok_or_else(|| Error::UnknownCollection {
                collection: String::from(collection),
            })
    }
}
