use config::Config;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid Connection Settings: {} [{}]", source, details))]
    InvalidConfiguration {
        details: String,
        source: config::ConfigError,
    },
}

/// Options recognized when opening a connection to the cluster.
///
/// Every field has a default, so an empty configuration source yields a
/// working localhost setup. The sniffing and keep-alive flags are part of the
/// adapter's public configuration surface and are recorded on the connection,
/// but the underlying transport only uses `hosts` (the official client does
/// not expose sniffing or keep-alive toggles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// `host:port` (or full URL) entries, one per cluster node.
    pub hosts: Vec<String>,
    pub sniff_on_start: bool,
    pub sniff_on_connection_fault: bool,
    pub keep_alive: bool,
    /// Informational; the client line is fixed by the crate version.
    pub api_version: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            hosts: vec![String::from("127.0.0.1:9200")],
            sniff_on_start: true,
            sniff_on_connection_fault: true,
            keep_alive: false,
            api_version: String::from("7.x"),
        }
    }
}

impl ConnectionSettings {
    /// Deserialize settings out of a layered configuration (files,
    /// environment, inline sources). Unset fields take their defaults.
    pub fn from_config(config: Config) -> Result<Self, Error> {
        config.try_deserialize().context(InvalidConfiguration {
            details: String::from("could not deserialize connection settings"),
        })
    }
}
