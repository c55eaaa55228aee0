//! Request and response models. The ES response shells only deserialize the
//! fields that we use, which can be prone to change in the future.

use serde::Deserialize;
use serde_json::Value;

/// Reference to a document as returned by the index and update APIs.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_version", default)]
    pub version: i64,
    /// "created", "updated" or "noop".
    pub result: String,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub source: Value,
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub total: u64,
    pub hits: Vec<SearchHit>,
}

/// A single write in a bulk request.
#[derive(Debug, Clone)]
pub enum BulkAction {
    Index { id: Option<String>, document: Value },
    Delete { id: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkStats {
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
}

#[derive(Deserialize)]
pub(crate) struct EsAcknowledged {
    pub(crate) acknowledged: bool,
}

#[derive(Deserialize)]
pub(crate) struct EsCountResponse {
    pub(crate) count: u64,
}

#[derive(Deserialize)]
pub(crate) struct EsSearchResponse {
    pub(crate) hits: EsHits,
}

#[derive(Deserialize)]
pub(crate) struct EsHits {
    #[serde(default)]
    pub(crate) total: EsTotal,
    pub(crate) hits: Vec<EsHit>,
}

#[derive(Deserialize, Default)]
pub(crate) struct EsTotal {
    #[serde(default)]
    pub(crate) value: u64,
}

#[derive(Deserialize)]
pub(crate) struct EsHit {
    #[serde(rename = "_id")]
    pub(crate) id: String,
    #[serde(rename = "_source", default)]
    pub(crate) source: Value,
}

impl From<EsSearchResponse> for SearchResult {
    fn from(response: EsSearchResponse) -> Self {
        SearchResult {
            total: response.hits.total.value,
            hits: response
                .hits
                .hits
                .into_iter()
                .map(|hit| SearchHit {
                    id: hit.id,
                    source: hit.source,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct EsBulkResponse {
    #[serde(default)]
    pub(crate) errors: bool,
    pub(crate) items: Vec<EsBulkItem>,
}

// Bulk response items are externally tagged by the operation kind.
#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum EsBulkItem {
    Index(EsBulkItemStatus),
    Create(EsBulkItemStatus),
    Update(EsBulkItemStatus),
    Delete(EsBulkItemStatus),
}

impl EsBulkItem {
    pub(crate) fn status(&self) -> &EsBulkItemStatus {
        match self {
            EsBulkItem::Index(status)
            | EsBulkItem::Create(status)
            | EsBulkItem::Update(status)
            | EsBulkItem::Delete(status) => status,
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct EsBulkItemStatus {
    #[serde(default)]
    pub(crate) result: Option<String>,
    #[serde(default)]
    pub(crate) error: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_deserialize_document_ref() {
        let body = json!({
            "_id": "AvypLXkBazLmtM_qtw9a",
            "_index": "people",
            "_version": 1,
            "result": "created"
        });
        let doc: DocumentRef = serde_json::from_value(body).expect("document ref");
        assert_eq!(doc.id, "AvypLXkBazLmtM_qtw9a");
        assert_eq!(doc.index, "people");
        assert_eq!(doc.result, "created");
    }

    #[test]
    fn should_deserialize_search_response() {
        let body = json!({
            "took": 3,
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "hits": [
                    { "_id": "1", "_index": "people", "_source": { "name": "Ann" } },
                    { "_id": "2", "_index": "people", "_source": { "name": "Bob" } }
                ]
            }
        });
        let response: EsSearchResponse = serde_json::from_value(body).expect("search response");
        let result = SearchResult::from(response);
        assert_eq!(result.total, 2);
        assert_eq!(result.hits.len(), 2);
        assert_eq!(result.hits[0].source["name"], json!("Ann"));
    }

    #[test]
    fn should_deserialize_bulk_items() {
        let body = json!({
            "took": 30,
            "errors": false,
            "items": [
                { "index": { "_id": "1", "result": "created", "status": 201 } },
                { "delete": { "_id": "2", "result": "deleted", "status": 200 } }
            ]
        });
        let response: EsBulkResponse = serde_json::from_value(body).expect("bulk response");
        assert!(!response.errors);
        assert_eq!(response.items.len(), 2);
        assert_eq!(
            response.items[0].status().result.as_deref(),
            Some("created")
        );
        assert!(matches!(response.items[1], EsBulkItem::Delete(_)));
    }
}
