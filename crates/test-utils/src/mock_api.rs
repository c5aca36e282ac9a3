//! In-memory [`VisorApi`] for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use visor_common::FetchError;
use visor_protocol::{ApiContext, FeatureCollection, RawGrid, VisorApi};

/// Backend endpoints, for failure injection and request counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Context,
    Instances,
    Variables,
    Data,
    Sources,
}

/// Canned responses keyed by request parameters. Missing entries answer 404.
#[derive(Default)]
pub struct MockApi {
    context: Mutex<Option<ApiContext>>,
    instances: Mutex<HashMap<String, Vec<String>>>,
    variables: Mutex<HashMap<(String, String), Vec<String>>>,
    grids: Mutex<HashMap<(String, String, String), RawGrid>>,
    sources: Mutex<HashMap<(String, String, String), FeatureCollection>>,
    failures: Mutex<HashMap<Endpoint, u16>>,
    latency: Mutex<Option<Duration>>,
    requests: Mutex<HashMap<Endpoint, usize>>,
    data_requests: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(self, context: ApiContext) -> Self {
        *self.context.lock().unwrap() = Some(context);
        self
    }

    pub fn with_instances(self, domain: &str, instances: &[&str]) -> Self {
        self.instances.lock().unwrap().insert(
            domain.to_string(),
            instances.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_variables(self, domain: &str, instance: &str, variables: &[&str]) -> Self {
        self.variables.lock().unwrap().insert(
            (domain.to_string(), instance.to_string()),
            variables.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_grid(self, domain: &str, instance: &str, variable: &str, grid: RawGrid) -> Self {
        self.grids.lock().unwrap().insert(
            (domain.to_string(), instance.to_string(), variable.to_string()),
            grid,
        );
        self
    }

    pub fn with_sources(
        self,
        domain: &str,
        instance: &str,
        species: &str,
        sources: FeatureCollection,
    ) -> Self {
        self.sources.lock().unwrap().insert(
            (domain.to_string(), instance.to_string(), species.to_string()),
            sources,
        );
        self
    }

    /// Delay every response, so concurrent callers overlap.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock().unwrap() = Some(latency);
        self
    }

    /// Answer every request to `endpoint` with `status`.
    pub fn fail(&self, endpoint: Endpoint, status: u16) {
        self.failures.lock().unwrap().insert(endpoint, status);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.failures.lock().unwrap().remove(&endpoint);
    }

    /// Requests seen by one endpoint.
    pub fn requests(&self, endpoint: Endpoint) -> usize {
        self.requests
            .lock()
            .unwrap()
            .get(&endpoint)
            .copied()
            .unwrap_or(0)
    }

    /// `/api/data` requests seen for one variable name.
    pub fn data_requests(&self, variable: &str) -> usize {
        self.data_requests
            .lock()
            .unwrap()
            .get(variable)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<(), FetchError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.requests.lock().unwrap().entry(endpoint).or_insert(0) += 1;

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let failure = self.failures.lock().unwrap().get(&endpoint).copied();
        match failure {
            Some(status) => Err(FetchError::status(status, format!("{:?}", endpoint))),
            None => Ok(()),
        }
    }
}

fn not_found(what: &str) -> FetchError {
    FetchError::status(404, what)
}

#[async_trait]
impl VisorApi for MockApi {
    async fn context(&self) -> Result<ApiContext, FetchError> {
        self.enter(Endpoint::Context).await?;
        let context = self.context.lock().unwrap().clone();
        context.ok_or_else(|| not_found("context"))
    }

    async fn instances(&self, domain: &str) -> Result<Option<Vec<String>>, FetchError> {
        self.enter(Endpoint::Instances).await?;
        let found = self.instances.lock().unwrap().get(domain).cloned();
        found.map(Some).ok_or_else(|| not_found("instances"))
    }

    async fn variables(
        &self,
        domain: &str,
        instance: &str,
    ) -> Result<Option<Vec<String>>, FetchError> {
        self.enter(Endpoint::Variables).await?;
        let found = self
            .variables
            .lock()
            .unwrap()
            .get(&(domain.to_string(), instance.to_string()))
            .cloned();
        found.map(Some).ok_or_else(|| not_found("variables"))
    }

    async fn data(
        &self,
        domain: &str,
        instance: &str,
        variable: &str,
    ) -> Result<RawGrid, FetchError> {
        *self
            .data_requests
            .lock()
            .unwrap()
            .entry(variable.to_string())
            .or_insert(0) += 1;
        self.enter(Endpoint::Data).await?;
        let found = self
            .grids
            .lock()
            .unwrap()
            .get(&(domain.to_string(), instance.to_string(), variable.to_string()))
            .cloned();
        found.ok_or_else(|| not_found("data"))
    }

    async fn sources(
        &self,
        domain: &str,
        instance: &str,
        species: &str,
    ) -> Result<FeatureCollection, FetchError> {
        self.enter(Endpoint::Sources).await?;
        let found = self
            .sources
            .lock()
            .unwrap()
            .get(&(domain.to_string(), instance.to_string(), species.to_string()))
            .cloned();
        found.ok_or_else(|| not_found("sources"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::raw_grid_f32;
    use serde_json::json;

    #[tokio::test]
    async fn test_counts_and_failures() {
        let api = MockApi::new()
            .with_instances("d", &["2025-01-01_00"])
            .with_grid("d", "i", "v", raw_grid_f32("v", [1, 1, 1, 1, 1], &[1.0], json!({})));

        assert_eq!(
            api.instances("d").await.unwrap(),
            Some(vec!["2025-01-01_00".to_string()])
        );
        assert!(api.data("d", "i", "v").await.is_ok());
        assert!(matches!(
            api.data("d", "i", "missing").await,
            Err(FetchError::HttpStatus { status: 404, .. })
        ));

        api.fail(Endpoint::Instances, 500);
        assert!(api.instances("d").await.is_err());
        api.recover(Endpoint::Instances);
        assert!(api.instances("d").await.is_ok());

        assert_eq!(api.requests(Endpoint::Instances), 3);
        assert_eq!(api.data_requests("v"), 1);
        assert_eq!(api.total_requests(), 5);
    }

    #[test]
    fn test_missing_context_is_not_found() {
        let api = MockApi::new();
        let err = tokio_test::block_on(api.context()).unwrap_err();
        assert_eq!(err.http_status(), 404);
        assert_eq!(api.requests(Endpoint::Context), 1);
    }
}
