//! End-to-end scenarios against a live cluster. These are ignored by
//! default; run them with `cargo test -- --ignored` once Elasticsearch is
//! reachable on localhost:9200 (e.g. `docker run -p 9200:9200 -e
//! discovery.type=single-node elasticsearch:7.13.0`).

use std::collections::BTreeMap;

use serde_json::json;

use aegir::{
    Adapter, BulkAction, CollectionDefinition, ConnectionConfig, ConnectionSettings,
};

fn test_settings() -> ConnectionSettings {
    ConnectionSettings {
        hosts: vec![String::from("localhost:9200")],
        ..Default::default()
    }
}

fn users_collections(index: &str) -> BTreeMap<String, CollectionDefinition> {
    let mut collections = BTreeMap::new();
    collections.insert(
        String::from("users"),
        CollectionDefinition::new(
            index,
            json!({ "name": { "type": "text" } })
                .as_object()
                .cloned()
                .unwrap(),
        ),
    );
    collections
}

#[tokio::test]
#[ignore = "requires a running Elasticsearch on localhost:9200"]
async fn should_create_index_with_supplied_mapping_on_registration() {
    let mut adapter = Adapter::new();
    adapter
        .register_connection(
            ConnectionConfig::new("es1", test_settings()),
            users_collections("people-registration"),
        )
        .await
        .expect("registration");

    // the index now exists, so a count succeeds
    let count = adapter
        .count("es1", "users", None)
        .await
        .expect("count on bootstrapped index");
    assert_eq!(count, 0);

    // registering the same collections under a new identity must not try to
    // re-create the existing index
    adapter
        .register_connection(
            ConnectionConfig::new("es1-bis", test_settings()),
            users_collections("people-registration"),
        )
        .await
        .expect("second registration over existing index");
}

#[tokio::test]
#[ignore = "requires a running Elasticsearch on localhost:9200"]
async fn should_create_document_with_assigned_identifier() {
    let mut adapter = Adapter::new();
    adapter
        .register_connection(
            ConnectionConfig::new("es1", test_settings()),
            users_collections("people-create"),
        )
        .await
        .expect("registration");

    let doc = adapter
        .create("es1", "users", json!({ "name": "Ann" }), None)
        .await
        .expect("created document");
    assert!(!doc.id.is_empty());
    assert_eq!(doc.result, "created");

    let updated = adapter
        .update("es1", "users", &doc.id, json!({ "name": "Anna" }), None)
        .await
        .expect("updated document");
    assert_eq!(updated.id, doc.id);

    adapter
        .destroy("es1", "users", &doc.id)
        .await
        .expect("destroyed document");
}

#[tokio::test]
#[ignore = "requires a running Elasticsearch on localhost:9200"]
async fn should_bulk_write_and_search() {
    let mut adapter = Adapter::new();
    adapter
        .register_connection(
            ConnectionConfig::new("es1", test_settings()),
            users_collections("people-bulk"),
        )
        .await
        .expect("registration");

    let actions = (1..=6)
        .map(|i| BulkAction::Index {
            id: Some(i.to_string()),
            document: json!({ "name": format!("user-{}", i) }),
        })
        .collect();
    let stats = adapter
        .bulk("es1", "users", actions)
        .await
        .expect("bulk insertion");
    assert_eq!(stats.created, 6);

    // make the writes visible to search
    adapter
        .client("es1")
        .expect("raw client")
        .indices()
        .refresh(elasticsearch::indices::IndicesRefreshParts::Index(&[
            "people-bulk",
        ]))
        .send()
        .await
        .expect("index refresh");

    let result = adapter
        .search(
            "es1",
            "users",
            json!({ "query": { "match_all": {} } }),
            None,
        )
        .await
        .expect("search");
    assert_eq!(result.total, 6);
}
