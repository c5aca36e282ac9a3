//! Backend access trait.

use async_trait::async_trait;
use bytes::Bytes;
use visor_common::FetchError;

use crate::context::ApiContext;
use crate::geojson::FeatureCollection;

/// Response header carrying the JSON grid header of `/api/data`.
pub const DATA_HEADER: &str = "X-Header";

/// Undecoded `/api/data` response.
#[derive(Debug, Clone)]
pub struct RawGrid {
    /// Response body, the flattened sample buffer.
    pub body: Bytes,
    /// Contents of the `X-Header` response header.
    pub header: String,
}

/// Access to the visor backend.
///
/// Implementations perform one request per call and never retry; callers
/// decide how failures are recovered.
#[async_trait]
pub trait VisorApi: Send + Sync {
    /// `GET /api/context`
    async fn context(&self) -> Result<ApiContext, FetchError>;

    /// `GET /api/instances/?domain=D`
    ///
    /// `Ok(None)` when the response omits the list.
    async fn instances(&self, domain: &str) -> Result<Option<Vec<String>>, FetchError>;

    /// `GET /api/variables/?domain=D&instance=I`
    async fn variables(
        &self,
        domain: &str,
        instance: &str,
    ) -> Result<Option<Vec<String>>, FetchError>;

    /// `GET /api/data/?domain=D&instance=I&variable=V`
    async fn data(
        &self,
        domain: &str,
        instance: &str,
        variable: &str,
    ) -> Result<RawGrid, FetchError>;

    /// `GET /api/sources/?domain=D&instance=I&species=S`
    async fn sources(
        &self,
        domain: &str,
        instance: &str,
        species: &str,
    ) -> Result<FeatureCollection, FetchError>;
}
