//! aegir is a small storage adapter that lets an ORM-style host treat an
//! Elasticsearch cluster as a backend. The host registers named connections
//! together with its collection definitions; aegir opens a client, makes sure
//! every target index exists (creating missing ones with the merged mapping
//! contributed by the collections), and then dispatches per-collection
//! operations (search, create, update, destroy, count, bulk) straight to the
//! official `elasticsearch` client.
//!
//! Everything hard is delegated: there is no protocol code, no query
//! planning, no caching and no retry logic here. Errors from the cluster are
//! surfaced to the caller unchanged.

pub mod adapter;
pub mod bootstrap;
pub mod collection;
pub mod mapping;
pub mod models;
pub mod remote;
pub mod settings;
pub mod storage;

pub use adapter::{Adapter, Connection, ConnectionConfig, Error};
pub use collection::Collection;
pub use mapping::{CollectionDefinition, IndexPlan};
pub use models::{BulkAction, BulkStats, DocumentRef, SearchHit, SearchResult};
pub use remote::Remote;
pub use settings::ConnectionSettings;
pub use storage::ElasticsearchStorage;
