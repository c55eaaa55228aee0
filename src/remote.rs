use async_trait::async_trait;
use elasticsearch::http::transport::{
    BuildError as TransportBuilderError, MultiNodeConnectionPool, SingleNodeConnectionPool,
    TransportBuilder,
};
use elasticsearch::Elasticsearch;
use snafu::{ensure, ResultExt, Snafu};
use tracing::debug;
use url::Url;

use crate::settings::ConnectionSettings;
use crate::storage::ElasticsearchStorage;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid Elasticsearch URL: {}, {}", details, source))]
    InvalidUrl {
        details: String,
        source: url::ParseError,
    },

    #[snafu(display("Invalid Elasticsearch Host List: no host given"))]
    EmptyHostList,

    /// Elasticsearch Build Error
    #[snafu(display("Elasticsearch Connection Error: {}", source))]
    ElasticsearchConnection { source: TransportBuilderError },
}

/// Anything that can be turned into a live storage handle.
#[async_trait]
pub trait Remote {
    type Conn;

    async fn conn(self) -> Result<Self::Conn, Error>;
}

#[async_trait]
impl Remote for ConnectionSettings {
    type Conn = ElasticsearchStorage;

    /// Use the settings to create a client.
    ///
    /// The transport is built eagerly but connects lazily: no request is
    /// issued to the cluster here, so a bad address only shows up on the
    /// first operation.
    async fn conn(self) -> Result<Self::Conn, Error> {
        ensure!(!self.hosts.is_empty(), EmptyHostList);

        let mut urls = self
            .hosts
            .iter()
            .map(|host| parse_host(host))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "opening elasticsearch transport to {} host(s) (api {})",
            urls.len(),
            self.api_version
        );

        let builder = if urls.len() == 1 {
            TransportBuilder::new(SingleNodeConnectionPool::new(urls.remove(0)))
        } else {
            TransportBuilder::new(MultiNodeConnectionPool::round_robin(urls, None))
        };

        let transport = builder
            .disable_proxy()
            .build()
            .context(ElasticsearchConnection)?;

        Ok(ElasticsearchStorage::new(Elasticsearch::new(transport)))
    }
}

// Hosts may come in as bare `host:port` pairs, the way the original
// configuration surface expects them.
fn parse_host(host: &str) -> Result<Url, Error> {
    let url = if host.contains("://") {
        String::from(host)
    } else {
        format!("http://{}", host)
    };
    Url::parse(&url).context(InvalidUrl {
        details: format!("could not parse host '{}'", host),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_build_client_from_default_settings() {
        let settings = ConnectionSettings::default();
        let _storage = settings.conn().await.expect("elasticsearch storage");
    }

    #[tokio::test]
    async fn should_build_client_for_multiple_hosts() {
        let settings = ConnectionSettings {
            hosts: vec![String::from("es1:9200"), String::from("es2:9200")],
            ..Default::default()
        };
        let _storage = settings.conn().await.expect("elasticsearch storage");
    }

    #[tokio::test]
    async fn should_return_invalid_url() {
        let settings = ConnectionSettings {
            hosts: vec![String::from("not a url")],
            ..Default::default()
        };
        let err = settings.conn().await.unwrap_err();
        assert!(err.to_string().starts_with("Invalid Elasticsearch URL"));
    }

    #[tokio::test]
    async fn should_reject_empty_host_list() {
        let settings = ConnectionSettings {
            hosts: vec![],
            ..Default::default()
        };
        let err = settings.conn().await.unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Invalid Elasticsearch Host List"));
    }
}
