use serde_json::Value;

use crate::models::{BulkAction, BulkStats, DocumentRef, SearchResult};
use crate::storage::{Error, ElasticsearchStorage};

/// A registered collection, bound to its target index and to the connection's
/// shared client handle.
///
/// Every operation is a direct delegation with the collection's index
/// applied; no validation, batching or retries happen here.
#[derive(Clone, Debug)]
pub struct Collection {
    index: String,
    storage: ElasticsearchStorage,
}

impl Collection {
    pub(crate) fn new(index: String, storage: ElasticsearchStorage) -> Collection {
        Collection { index, storage }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Run a search query against the collection's index. `extra_indices`
    /// fans the same query out over additional indices.
    pub async fn search(
        &self,
        query: Value,
        extra_indices: Option<&[String]>,
    ) -> Result<SearchResult, Error> {
        let mut indices: Vec<&str> = vec![self.index.as_str()];
        if let Some(extra) = extra_indices {
            indices.extend(extra.iter().map(String::as_str));
        }
        self.storage.search(&indices, query).await
    }

    /// Index a document. `parent` carries the routing key for parent/child
    /// mappings.
    pub async fn insert(
        &self,
        document: Value,
        parent: Option<&str>,
    ) -> Result<DocumentRef, Error> {
        self.storage
            .insert_document(&self.index, document, parent)
            .await
    }

    pub async fn update(
        &self,
        id: &str,
        changes: Value,
        parent: Option<&str>,
    ) -> Result<DocumentRef, Error> {
        self.storage
            .update_document(&self.index, id, changes, parent)
            .await
    }

    pub async fn destroy(&self, id: &str) -> Result<(), Error> {
        self.storage.delete_document(&self.index, id).await
    }

    pub async fn count(&self, query: Option<Value>) -> Result<u64, Error> {
        self.storage.count(&self.index, query).await
    }

    pub async fn bulk(&self, actions: Vec<BulkAction>) -> Result<BulkStats, Error> {
        self.storage.bulk(&self.index, actions).await
    }
}
