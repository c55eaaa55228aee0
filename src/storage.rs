use elasticsearch::http::response::{Exception, Response};
use elasticsearch::http::StatusCode;
use elasticsearch::indices::{IndicesCreateParts, IndicesExistsParts};
use elasticsearch::{
    BulkOperation, BulkParts, CountParts, DeleteParts, Elasticsearch, IndexParts, SearchParts,
    UpdateParts,
};
use serde_json::{json, Map, Value};
use snafu::{ResultExt, Snafu};
use tracing::warn;

use crate::models::{
    BulkAction, BulkStats, DocumentRef, EsAcknowledged, EsBulkResponse, EsCountResponse,
    EsSearchResponse, SearchResult,
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Elasticsearch Error
    #[snafu(display("Elasticsearch Error: {} [{}]", source, details))]
    ElasticsearchClient {
        details: String,
        source: elasticsearch::Error,
    },

    /// Elasticsearch Not Acknowledged
    #[snafu(display("Elasticsearch Response: Not Acknowledged: {}", details))]
    NotAcknowledged { details: String },

    /// Elasticsearch Deserialization Error
    #[snafu(display("JSON Elasticsearch Deserialization Error: {}", source))]
    ElasticsearchDeserialization { source: elasticsearch::Error },

    /// Elasticsearch Exception
    #[snafu(display("Elasticsearch Exception: {}", details))]
    ElasticsearchException { details: String },

    #[snafu(display("Elasticsearch Failure without Exception: {}", details))]
    ElasticsearchFailureWithoutException { details: String },

    #[snafu(display("Document Not Found in '{}': {}", index, id))]
    DocumentNotFound { index: String, id: String },

    /// Elasticsearch Bulk Item Failure
    #[snafu(display("Elasticsearch Bulk Failure: {}", details))]
    BulkFailure { details: String },
}

impl From<Exception> for Error {
    fn from(exception: Exception) -> Error {
        let details = exception
            .error()
            .reason()
            .map(String::from)
            .unwrap_or_else(|| String::from("Unspecified reason"));
        Error::ElasticsearchException { details }
    }
}

// Turns a non-success response into the matching error, keeping the
// cluster's own explanation when it provides one.
async fn exception_error(response: Response) -> Error {
    match response.exception().await {
        Ok(Some(exception)) => Error::from(exception),
        Ok(None) => Error::ElasticsearchFailureWithoutException {
            details: String::from("Fail status without exception"),
        },
        Err(source) => Error::ElasticsearchDeserialization { source },
    }
}

/// A structure wrapping around the elasticsearch's client.
///
/// One handle is shared by every collection registered under a connection;
/// the client library owns pooling and request safety.
#[derive(Clone, Debug)]
pub struct ElasticsearchStorage {
    pub(crate) client: Elasticsearch,
}

impl ElasticsearchStorage {
    pub fn new(client: Elasticsearch) -> ElasticsearchStorage {
        ElasticsearchStorage { client }
    }

    /// Raw handle, for operations not covered by the adapter surface.
    pub fn client(&self) -> &Elasticsearch {
        &self.client
    }

    pub(crate) async fn index_exists(&self, index: &str) -> Result<bool, Error> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .context(ElasticsearchClient {
                details: format!("cannot check existence of index '{}'", index),
            })?;

        match response.status_code() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(exception_error(response).await),
        }
    }

    pub(crate) async fn create_index(
        &self,
        index: &str,
        properties: &Map<String, Value>,
    ) -> Result<(), Error> {
        let body = json!({ "mappings": { "properties": properties } });

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body)
            .send()
            .await
            .context(ElasticsearchClient {
                details: format!("cannot create index '{}'", index),
            })?;

        if response.status_code().is_success() {
            // Response similar to:
            // Object({"acknowledged": Bool(true), "index": String("name"), "shards_acknowledged": Bool(true)})
            let ack = response
                .json::<EsAcknowledged>()
                .await
                .context(ElasticsearchDeserialization)?;
            if ack.acknowledged {
                Ok(())
            } else {
                Err(Error::NotAcknowledged {
                    details: format!("index creation {}", index),
                })
            }
        } else {
            Err(exception_error(response).await)
        }
    }

    pub(crate) async fn insert_document(
        &self,
        index: &str,
        document: Value,
        routing: Option<&str>,
    ) -> Result<DocumentRef, Error> {
        let request = self.client.index(IndexParts::Index(index)).body(document);
        let request = match routing {
            Some(routing) => request.routing(routing),
            None => request,
        };

        let response = request.send().await.context(ElasticsearchClient {
            details: format!("cannot index document into '{}'", index),
        })?;

        if response.status_code().is_success() {
            response
                .json::<DocumentRef>()
                .await
                .context(ElasticsearchDeserialization)
        } else {
            Err(exception_error(response).await)
        }
    }

    pub(crate) async fn update_document(
        &self,
        index: &str,
        id: &str,
        changes: Value,
        routing: Option<&str>,
    ) -> Result<DocumentRef, Error> {
        let request = self
            .client
            .update(UpdateParts::IndexId(index, id))
            .body(json!({ "doc": changes }));
        let request = match routing {
            Some(routing) => request.routing(routing),
            None => request,
        };

        let response = request.send().await.context(ElasticsearchClient {
            details: format!("cannot update document '{}' in '{}'", id, index),
        })?;

        if response.status_code().is_success() {
            response
                .json::<DocumentRef>()
                .await
                .context(ElasticsearchDeserialization)
        } else if response.status_code() == StatusCode::NOT_FOUND {
            Err(Error::DocumentNotFound {
                index: String::from(index),
                id: String::from(id),
            })
        } else {
            Err(exception_error(response).await)
        }
    }

    pub(crate) async fn delete_document(&self, index: &str, id: &str) -> Result<(), Error> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await
            .context(ElasticsearchClient {
                details: format!("cannot delete document '{}' from '{}'", id, index),
            })?;

        if response.status_code().is_success() {
            Ok(())
        } else if response.status_code() == StatusCode::NOT_FOUND {
            Err(Error::DocumentNotFound {
                index: String::from(index),
                id: String::from(id),
            })
        } else {
            Err(exception_error(response).await)
        }
    }

    pub(crate) async fn search(
        &self,
        indices: &[&str],
        query: Value,
    ) -> Result<SearchResult, Error> {
        let response = self
            .client
            .search(SearchParts::Index(indices))
            .body(query)
            .send()
            .await
            .context(ElasticsearchClient {
                details: format!("cannot search indices '{}'", indices.join(" ")),
            })?;

        if response.status_code().is_success() {
            let es_response = response
                .json::<EsSearchResponse>()
                .await
                .context(ElasticsearchDeserialization)?;
            Ok(SearchResult::from(es_response))
        } else {
            Err(exception_error(response).await)
        }
    }

    pub(crate) async fn count(&self, index: &str, query: Option<Value>) -> Result<u64, Error> {
        let indices = [index];
        let request = self.client.count(CountParts::Index(&indices));
        let response = match query {
            Some(query) => request.body(query).send().await,
            None => request.send().await,
        }
        .context(ElasticsearchClient {
            details: format!("cannot count documents in '{}'", index),
        })?;

        if response.status_code().is_success() {
            let count = response
                .json::<EsCountResponse>()
                .await
                .context(ElasticsearchDeserialization)?;
            Ok(count.count)
        } else {
            Err(exception_error(response).await)
        }
    }

    // We send the whole batch in one bulk request and then walk the per-item
    // results. The first failing item aborts with its error payload.
    pub(crate) async fn bulk(
        &self,
        index: &str,
        actions: Vec<BulkAction>,
    ) -> Result<BulkStats, Error> {
        let mut ops: Vec<BulkOperation<Value>> = Vec::with_capacity(actions.len());
        for action in actions {
            match action {
                BulkAction::Index { id, document } => {
                    let op = BulkOperation::index(document);
                    let op = match id {
                        Some(id) => op.id(id),
                        None => op,
                    };
                    ops.push(op.into());
                }
                BulkAction::Delete { id } => {
                    ops.push(BulkOperation::delete(id).into());
                }
            }
        }

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(ops)
            .send()
            .await
            .context(ElasticsearchClient {
                details: format!("cannot bulk write to '{}'", index),
            })?;

        if response.status_code().is_success() {
            let bulk = response
                .json::<EsBulkResponse>()
                .await
                .context(ElasticsearchDeserialization)?;

            let mut stats = BulkStats::default();
            for item in &bulk.items {
                let status = item.status();
                if let Some(error) = &status.error {
                    return Err(Error::BulkFailure {
                        details: error.to_string(),
                    });
                }
                match status.result.as_deref() {
                    Some("created") => stats.created += 1,
                    Some("updated") => stats.updated += 1,
                    Some("deleted") => stats.deleted += 1,
                    other => warn!("unexpected bulk item result: {:?}", other),
                }
            }
            if bulk.errors {
                // errors flagged but no item carried a payload
                return Err(Error::BulkFailure {
                    details: String::from("bulk response flagged errors"),
                });
            }
            Ok(stats)
        } else {
            Err(exception_error(response).await)
        }
    }
}
