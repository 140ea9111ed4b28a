//! HTTP client for the Docker Engine API.

use std::time::Duration;

use async_trait::async_trait;
use dockscope_common::error::EngineError;
use serde::de::DeserializeOwned;

use crate::inventory::InventoryFetcher;
use crate::records::{
    ContainerRecord, ImageDetail, ImageSummary, NetworkRecord, PluginRecord, SystemInfo,
    VolumeList, VolumeRecord,
};

/// Engine API client over TCP.
#[derive(Debug, Clone)]
pub struct DockerClient {
    http: reqwest::Client,
    base_url: String,
}

impl DockerClient {
    /// Creates a client for the engine at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Unreachable {
                url: base_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { http, base_url })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, EngineError> {
        let response = self.send(self.http.get(self.url(endpoint)), endpoint).await?;
        response.json().await.map_err(|e| EngineError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    pub(crate) async fn post(&self, endpoint: &str) -> Result<reqwest::Response, EngineError> {
        self.send(self.http.post(self.url(endpoint)), endpoint).await
    }

    pub(crate) async fn delete(&self, endpoint: &str) -> Result<reqwest::Response, EngineError> {
        self.send(self.http.delete(self.url(endpoint)), endpoint).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<reqwest::Response, EngineError> {
        tracing::debug!(endpoint, "engine request");
        let response = request.send().await.map_err(|e| EngineError::Unreachable {
            url: self.url(endpoint),
            message: e.to_string(),
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(EngineError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body: engine_message(&body),
        })
    }
}

/// Extracts the `message` field of an engine error body, if present.
fn engine_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl InventoryFetcher for DockerClient {
    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerRecord>, EngineError> {
        self.get_json(&format!("/containers/json?all={all}")).await
    }

    async fn list_networks(&self) -> Result<Vec<NetworkRecord>, EngineError> {
        self.get_json("/networks").await
    }

    async fn list_volumes(&self) -> Result<Vec<VolumeRecord>, EngineError> {
        let list: VolumeList = self.get_json("/volumes").await?;
        Ok(list.volumes)
    }

    async fn list_images(&self, all: bool) -> Result<Vec<ImageSummary>, EngineError> {
        self.get_json(&format!("/images/json?all={all}")).await
    }

    async fn inspect_image(&self, id: &str) -> Result<ImageDetail, EngineError> {
        self.get_json(&format!("/images/{id}/json")).await
    }

    async fn list_plugins(&self) -> Result<Vec<PluginRecord>, EngineError> {
        self.get_json("/plugins").await
    }

    async fn system_info(&self) -> Result<SystemInfo, EngineError> {
        self.get_json("/info").await
    }
}
