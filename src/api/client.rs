//! Thin async client over the backend's `/v1` routes.
//!
//! Every request carries the session cookie jar, so the configured
//! `access_token` rides along the way a browser would send it. Responses are
//! checked for a 2xx status before decoding; anything else becomes an
//! [`ApiError::Status`] carrying the body's `detail`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use reqwest::cookie::Jar;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::ApiError;
use crate::game::{
    Coordinate, Entity, ResearchForest, ResourcesData, StructureKey, StructuresData,
    SystemResponse,
};

#[derive(Debug, Clone)]
pub struct GameApi {
    http: Client,
    base: Url,
}

impl GameApi {
    pub fn new(base_url: &str, access_token: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid api url {base_url}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("api url {base_url} cannot carry a path");
        }

        let jar = Jar::default();
        if let Some(token) = access_token {
            jar.add_cookie_str(&format!("access_token={token}; Path=/"), &base);
        }
        let http = Client::builder()
            .cookie_provider(Arc::new(jar))
            .timeout(timeout)
            .build()
            .context("building http client")?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str], at: Option<Coordinate>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if let Some(coordinate) = at {
            url.query_pairs_mut()
                .append_pair("x", &coordinate.x.to_string())
                .append_pair("y", &coordinate.y.to_string());
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?;
        debug!(%url, %status, bytes = body.len(), "backend response");
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let body = self.send(self.http.get(url)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn mutate(&self, method: Method, url: Url) -> Result<(), ApiError> {
        self.send(self.http.request(method, url)).await.map(|_| ())
    }

    /// `GET /v1/systems?x=&y=`
    pub async fn fetch_system(&self, at: Coordinate) -> Result<Entity, ApiError> {
        let response: SystemResponse = self
            .get_json(self.endpoint(&["v1", "systems"], Some(at)))
            .await?;
        Ok(response.data)
    }

    /// `GET /v1/entity/{entityId}/structures?x=&y=`
    pub async fn fetch_structures(&self, key: &StructureKey) -> Result<StructuresData, ApiError> {
        let url = self.endpoint(
            &["v1", "entity", key.entity_id.as_str(), "structures"],
            Some(key.coordinate),
        );
        self.get_json(url).await
    }

    /// `POST /v1/entity/{entityId}/structures/{structureType}?x=&y=`
    pub async fn build_structure(&self, at: &StructureKey, structure_type: &str) -> Result<(), ApiError> {
        let url = self.endpoint(
            &["v1", "entity", at.entity_id.as_str(), "structures", structure_type],
            Some(at.coordinate),
        );
        self.mutate(Method::POST, url).await
    }

    /// `PUT /v1/entity/{entityId}/structures/{structureId}?x=&y=`
    pub async fn upgrade_structure(&self, at: &StructureKey, structure_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(
            &["v1", "entity", at.entity_id.as_str(), "structures", structure_id],
            Some(at.coordinate),
        );
        self.mutate(Method::PUT, url).await
    }

    /// `DELETE /v1/structures/{structureId}`
    pub async fn destroy_structure(&self, structure_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["v1", "structures", structure_id], None);
        self.mutate(Method::DELETE, url).await
    }

    /// `GET /v1/resources`
    pub async fn fetch_resources(&self) -> Result<ResourcesData, ApiError> {
        self.get_json(self.endpoint(&["v1", "resources"], None)).await
    }

    /// `GET /v1/research/forest`
    pub async fn fetch_research_forest(&self) -> Result<ResearchForest, ApiError> {
        self.get_json(self.endpoint(&["v1", "research", "forest"], None))
            .await
    }

    /// `POST /v1/time-warp/{seconds}`
    pub async fn time_warp(&self, seconds: u64) -> Result<(), ApiError> {
        let url = self.endpoint(&["v1", "time-warp", seconds.to_string().as_str()], None);
        self.mutate(Method::POST, url).await
    }
}
