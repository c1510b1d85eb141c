//! Sources that resolve an SRID the registry does not know yet.

use async_trait::async_trait;

use crate::crs::Srid;
use crate::error::{GeoLiteralError, Result};

/// Default registry serving `/<code>.proj4` documents.
pub const DEFAULT_REGISTRY_URL: &str = "https://epsg.io";

/// Resolves the PROJ.4 definition of a single SRID, usually over the network.
#[async_trait]
pub trait DefinitionSource: Send + Sync {
    /// Fetch the definition text for `srid`.
    ///
    /// Any error is treated by the registry as "unknown for now"; it is logged and the next
    /// lookup tries again.
    async fn fetch(&self, srid: Srid) -> Result<String>;
}

/// A source that never resolves anything, for hosts without network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

#[async_trait]
impl DefinitionSource for OfflineSource {
    async fn fetch(&self, srid: Srid) -> Result<String> {
        Err(GeoLiteralError::ProjectionLookup {
            srid,
            reason: "no remote definition source configured".to_string(),
        })
    }
}

#[cfg(feature = "http")]
pub use http::HttpDefinitionSource;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{DefinitionSource, DEFAULT_REGISTRY_URL};
    use crate::crs::Srid;
    use crate::error::{GeoLiteralError, Result};

    /// Fetches `GET {base_url}/{code}.proj4` and returns the response body.
    #[derive(Debug, Clone)]
    pub struct HttpDefinitionSource {
        client: reqwest::Client,
        base_url: String,
    }

    impl HttpDefinitionSource {
        pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            Ok(Self::with_client(client, base_url))
        }

        pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
            let base_url = base_url.into().trim_end_matches('/').to_string();
            Self { client, base_url }
        }

        pub(crate) fn url_for(&self, srid: Srid) -> String {
            format!("{}/{}.proj4", self.base_url, srid.code())
        }
    }

    impl Default for HttpDefinitionSource {
        fn default() -> Self {
            Self::with_client(reqwest::Client::new(), DEFAULT_REGISTRY_URL)
        }
    }

    #[async_trait]
    impl DefinitionSource for HttpDefinitionSource {
        async fn fetch(&self, srid: Srid) -> Result<String> {
            let response = self.client.get(self.url_for(srid)).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(GeoLiteralError::ProjectionLookup {
                    srid,
                    reason: format!("registry responded with {status}"),
                });
            }
            Ok(response.text().await?)
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn url_layout() {
            let source = HttpDefinitionSource::with_client(
                reqwest::Client::new(),
                "https://proj.example.org/",
            );
            assert_eq!(
                source.url_for(Srid(31370)),
                "https://proj.example.org/31370.proj4"
            );
            assert_eq!(
                HttpDefinitionSource::default().url_for(Srid(2154)),
                "https://epsg.io/2154.proj4"
            );
        }
    }
}
