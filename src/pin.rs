//! # Pinning service integration
//!
//! This module provides the upload seam between the backup pipeline and the
//! external IPFS pinning service. It defines the [`PinningService`] trait for
//! async, testable usage, and the concrete [`LighthouseClient`] used by the
//! CLI for networked uploads.
//!
//! - The trait performs exactly one network call per invocation; retries,
//!   resumption, and chunking are out of scope and delegated to the service.
//! - The response schema is owned by the external service, so it is surfaced
//!   as raw JSON; [`extract_cid`] pulls out the only field this program
//!   consumes, the nested `data.Hash` content identifier.
//! - The trait is annotated for `mockall` so tests can drive the pipeline with
//!   deterministic responses (see the `test-export-mocks` feature).
//!
//! ## Client usage
//!
//! Construct [`LighthouseClient`] from environment variables
//! (`LIGHTHOUSE_API_KEY`, optional `LIGHTHOUSE_NODE_URL`). The credential is
//! read as-is and passed through unchanged; the client does not validate it
//! before the call.

use std::env;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{info, warn};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::collect::FileEntry;

/// Default upload endpoint of the Lighthouse IPFS node.
pub const DEFAULT_ENDPOINT: &str = "https://node.lighthouse.storage/api/v0/add";

/// Environment variable holding the pre-provisioned bearer credential.
pub const API_KEY_VAR: &str = "LIGHTHOUSE_API_KEY";

/// Environment variable overriding the node endpoint (tests, staging).
pub const NODE_URL_VAR: &str = "LIGHTHOUSE_NODE_URL";

/// Trait for uploading a collected set of files to a pinning service.
///
/// Implementors perform a single best-effort network call and return the
/// service's JSON response verbatim. All transport and serialization errors
/// come back as boxed trait objects so real clients and test mocks share one
/// error contract.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Upload all entries as one multipart payload, consuming them. An empty
    /// entry list is still uploaded; what the service does with it is its own
    /// business.
    async fn upload(
        &self,
        entries: Vec<FileEntry>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>>;
}

/// Networked [`PinningService`] implementation over the Lighthouse upload API.
pub struct LighthouseClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl LighthouseClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        LighthouseClient {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Builds a client from the environment (loaded once at the entrypoint).
    /// A missing or empty credential is passed through unchanged to the
    /// upload call rather than rejected here; the service decides what to do
    /// with it.
    pub fn new_from_env() -> Self {
        let api_key = env::var(API_KEY_VAR).unwrap_or_default();
        if api_key.is_empty() {
            warn!(var = API_KEY_VAR, "credential is empty or unset");
        }
        let endpoint = env::var(NODE_URL_VAR).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        info!(
            api_key_set = !api_key.is_empty(),
            endpoint = %endpoint,
            "initialized Lighthouse client from environment"
        );
        Self::new(endpoint, api_key)
    }
}

#[async_trait]
impl PinningService for LighthouseClient {
    async fn upload(
        &self,
        entries: Vec<FileEntry>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        info!(
            files = entries.len(),
            endpoint = %self.endpoint,
            "uploading multipart payload to pinning service"
        );

        // Every file lands in the same uniformly-named form field, with its
        // walk path recorded as the part filename.
        let mut form = Form::new();
        for entry in entries {
            let part =
                Part::bytes(entry.bytes).file_name(entry.path.to_string_lossy().into_owned());
            form = form.part("file", part);
        }

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let body = response.json::<Value>().await?;
        info!("pinning service responded");
        Ok(body)
    }
}

/// Pulls the content identifier out of the service response.
///
/// The only field this program consumes is the nested `data.Hash` string; a
/// response without it is reported as unexpected.
pub fn extract_cid(response: &Value) -> Result<String> {
    response
        .get("data")
        .and_then(|data| data.get("Hash"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("unexpected upload response, missing data.Hash: {response}"))
}
