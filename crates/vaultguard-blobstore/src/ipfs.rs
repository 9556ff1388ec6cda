// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an IPFS node's Kubo RPC API.
//!
//! Records are added as single raw-leaf blocks with CIDv1 and sha2-256, so
//! the id the node assigns equals [`compute_content_id`](crate::compute_content_id)
//! and can be checked locally.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};
use vaultguard_config::model::BlobStoreConfig;
use vaultguard_core::{
    AdapterType, BlobStore, ContentId, HealthStatus, PluginAdapter, VaultError,
};

use crate::content_id;

/// Largest record stored as a single block. Kubo's chunker tops out at 1 MiB;
/// anything larger would be split and get a different CID.
pub const MAX_RECORD_SIZE: usize = 1024 * 1024;

const CHUNKER: &str = "size-1048576";

#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    #[serde(rename = "Version")]
    version: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "Message")]
    message: String,
}

/// Blob store talking to `/api/v0/add` and `/api/v0/cat`.
#[derive(Debug, Clone)]
pub struct IpfsBlobStore {
    client: reqwest::Client,
    api_url: String,
    timeout: Duration,
    pin: bool,
    verify: bool,
}

impl IpfsBlobStore {
    pub fn new(config: &BlobStoreConfig) -> Result<Self, VaultError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VaultError::network("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            timeout,
            pin: config.pin,
            verify: config.verify_content_id,
        })
    }

    fn endpoint(&self, command: &str, query: &[(&str, &str)]) -> Result<Url, VaultError> {
        let mut url = Url::parse(&format!("{}/api/v0/{command}", self.api_url))
            .map_err(|e| VaultError::Config(format!("invalid IPFS API URL: {e}")))?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    async fn error_body(response: reqwest::Response) -> String {
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.message)
            .unwrap_or(text)
    }
}

fn is_missing_block(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("not found") || lower.contains("no link")
}

#[async_trait]
impl PluginAdapter for IpfsBlobStore {
    fn name(&self) -> &str {
        "ipfs"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::BlobStore
    }

    async fn health_check(&self) -> Result<HealthStatus, VaultError> {
        let url = self.endpoint("version", &[])?;
        let response = match self.client.post(url).send().await {
            Ok(response) => response,
            Err(e) => return Ok(HealthStatus::Unhealthy(format!("IPFS API unreachable: {e}"))),
        };
        if !response.status().is_success() {
            return Ok(HealthStatus::Unhealthy(format!(
                "IPFS API returned {}",
                response.status()
            )));
        }
        match response.json::<VersionResponse>().await {
            Ok(v) => {
                debug!(version = %v.version, "IPFS node reachable");
                Ok(HealthStatus::Healthy)
            }
            Err(e) => Ok(HealthStatus::Degraded(format!(
                "unexpected version response: {e}"
            ))),
        }
    }
}

#[async_trait]
impl BlobStore for IpfsBlobStore {
    async fn put(&self, bytes: &[u8]) -> Result<ContentId, VaultError> {
        if bytes.len() > MAX_RECORD_SIZE {
            return Err(VaultError::InvalidInput(format!(
                "record is {} bytes; IPFS records are limited to {MAX_RECORD_SIZE}",
                bytes.len()
            )));
        }
        let pin = if self.pin { "true" } else { "false" };
        let url = self.endpoint(
            "add",
            &[
                ("cid-version", "1"),
                ("raw-leaves", "true"),
                ("chunker", CHUNKER),
                ("hash", "sha2-256"),
                ("pin", pin),
            ],
        )?;
        let part = reqwest::multipart::Part::bytes(bytes.to_vec()).file_name("record.json");
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VaultError::network("IPFS add request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = Self::error_body(response).await;
            return Err(VaultError::Network {
                message: format!("IPFS add returned {status}: {body}"),
                source: None,
            });
        }
        let added: AddResponse = response
            .json()
            .await
            .map_err(|e| VaultError::network("invalid IPFS add response", e))?;
        let id = ContentId::new(added.hash)?;

        if self.verify {
            let expected = content_id::compute_content_id(bytes)?;
            if content_id::parse_cid(&id)? != content_id::parse_cid(&expected)? {
                return Err(VaultError::InvalidInput(format!(
                    "IPFS node returned {id}, expected {expected}"
                )));
            }
        }

        debug!(content_id = %id, size = bytes.len(), pinned = self.pin, "blob added to IPFS");
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, VaultError> {
        let url = self.endpoint("cat", &[("arg", id.as_str())])?;
        let response = match self.client.post(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(content_id = %id, timeout = ?self.timeout, "IPFS cat timed out");
                return Err(VaultError::NotFound(format!(
                    "blob {id} (not retrievable within {:?})",
                    self.timeout
                )));
            }
            Err(e) => return Err(VaultError::network("IPFS cat request failed", e)),
        };

        let status = response.status();
        if !status.is_success() {
            let body = Self::error_body(response).await;
            if status == StatusCode::INTERNAL_SERVER_ERROR && is_missing_block(&body) {
                return Err(VaultError::NotFound(format!("blob {id}: {body}")));
            }
            return Err(VaultError::Network {
                message: format!("IPFS cat returned {status}: {body}"),
                source: None,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VaultError::network("failed to read IPFS cat body", e))?
            .to_vec();
        if self.verify && !content_id::verify(id, &bytes)? {
            debug!(content_id = %id, "content id not locally verifiable");
        }
        Ok(bytes)
    }
}
