use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Storage-level description a model carries when it is registered.
///
/// Collections without a target index are valid but invisible to the
/// adapter: they are left out of the bootstrap plan and of the per-connection
/// registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionDefinition {
    /// Target index name.
    pub index: Option<String>,
    /// Field mappings this collection contributes to its index, in the
    /// typeless 7.x format (the content of `properties`).
    pub mappings: Map<String, Value>,
}

impl CollectionDefinition {
    pub fn new(index: impl Into<String>, mappings: Map<String, Value>) -> Self {
        Self {
            index: Some(index.into()),
            mappings,
        }
    }
}

/// The set of indices a registration requires, with the mapping each one
/// must be created with. Derived transiently from the collection definitions
/// at registration time; Elasticsearch owns the durable mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexPlan {
    mappings: BTreeMap<String, Map<String, Value>>,
}

impl IndexPlan {
    /// Group collections by target index, merging each collection's mapping
    /// properties into the index's combined map. Collisions on a field name
    /// are resolved by direct assignment, last write wins in collection-name
    /// order.
    pub fn from_collections(collections: &BTreeMap<String, CollectionDefinition>) -> Self {
        let mut mappings: BTreeMap<String, Map<String, Value>> = BTreeMap::new();

        for definition in collections.values() {
            let index = match &definition.index {
                Some(index) => index,
                None => continue,
            };
            let properties = mappings.entry(index.clone()).or_default();
            for (field, spec) in &definition.mappings {
                properties.insert(field.clone(), spec.clone());
            }
        }

        IndexPlan { mappings }
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Distinct indices in deterministic (lexicographic) order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Map<String, Value>)> {
        self.mappings.iter()
    }
}
