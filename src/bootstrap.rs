use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::mapping::IndexPlan;
use crate::storage::{self, ElasticsearchStorage};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Index Bootstrap Error on '{}': {}", index, source))]
    IndexBootstrap {
        index: String,
        source: storage::Error,
    },
}

/// Walk the plan one index at a time, in order, creating whatever is
/// missing. Sequencing is deliberate: it bounds load on the cluster and
/// keeps startup deterministic. The first failure aborts the rest, since a
/// schema bootstrap error is not recoverable by retrying at this layer.
pub(crate) async fn ensure_indices(
    storage: &ElasticsearchStorage,
    plan: &IndexPlan,
) -> Result<(), Error> {
    for (index, properties) in plan.iter() {
        let exists = storage
            .index_exists(index)
            .await
            .context(IndexBootstrap {
                index: index.as_str(),
            })?;

        if exists {
            debug!("index '{}' already exists, skipping creation", index);
            continue;
        }

        info!("creating index '{}'", index);
        storage
            .create_index(index, properties)
            .await
            .context(IndexBootstrap {
                index: index.as_str(),
            })?;
    }
    Ok(())
}
