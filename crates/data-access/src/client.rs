//! reqwest-backed [`VisorApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use visor_common::FetchError;
use visor_protocol::{
    ApiContext, FeatureCollection, InstancesResponse, RawGrid, VariablesResponse, VisorApi,
    DATA_HEADER,
};

use crate::config::DataAccessConfig;

/// HTTP client for the visor backend.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: Client,
    base_url: String,
}

impl HttpApiClient {
    /// Build a client from configuration.
    pub fn new(config: &DataAccessConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().tcp_nodelay(true);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(client, &config.base_url))
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<Response, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Backend response");
        if !status.is_success() {
            return Err(FetchError::status(status.as_u16(), context));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<T, FetchError> {
        let response = self.get(path, query, context).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl VisorApi for HttpApiClient {
    #[instrument(skip(self))]
    async fn context(&self) -> Result<ApiContext, FetchError> {
        self.get_json("/api/context", &[], "context").await
    }

    #[instrument(skip(self))]
    async fn instances(&self, domain: &str) -> Result<Option<Vec<String>>, FetchError> {
        let response: InstancesResponse = self
            .get_json("/api/instances/", &[("domain", domain)], "instances")
            .await?;
        Ok(response.instances)
    }

    #[instrument(skip(self))]
    async fn variables(
        &self,
        domain: &str,
        instance: &str,
    ) -> Result<Option<Vec<String>>, FetchError> {
        let response: VariablesResponse = self
            .get_json(
                "/api/variables/",
                &[("domain", domain), ("instance", instance)],
                "variables",
            )
            .await?;
        Ok(response.variables)
    }

    #[instrument(skip(self))]
    async fn data(
        &self,
        domain: &str,
        instance: &str,
        variable: &str,
    ) -> Result<RawGrid, FetchError> {
        let response = self
            .get(
                "/api/data/",
                &[
                    ("domain", domain),
                    ("instance", instance),
                    ("variable", variable),
                ],
                variable,
            )
            .await?;

        let header = response
            .headers()
            .get(DATA_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| FetchError::InvalidBody(format!("missing {} header", DATA_HEADER)))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(RawGrid { body, header })
    }

    #[instrument(skip(self))]
    async fn sources(
        &self,
        domain: &str,
        instance: &str,
        species: &str,
    ) -> Result<FeatureCollection, FetchError> {
        self.get_json(
            "/api/sources/",
            &[
                ("domain", domain),
                ("instance", instance),
                ("species", species),
            ],
            "sources",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpApiClient::with_client(Client::new(), "http://visor:8000/");
        assert_eq!(client.base_url(), "http://visor:8000");
    }
}
