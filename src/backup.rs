//! Coordinating module for the collect-then-upload pipeline.
//!
//! One sequential pass: gather every regular file under the root, hand the
//! whole batch to a [`PinningService`] in a single call, and extract the
//! resulting content identifier. No concurrency, no retries, no partial
//! success; the first failing step aborts the run.

use std::path::Path;

use anyhow::Result;
use tracing::{error, info};

use crate::collect::collect_files;
use crate::pin::{extract_cid, PinningService};

/// Outcome of a completed backup run, for logging and downstream audit.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BackupReport {
    /// Content identifier returned by the pinning service.
    pub cid: String,
    /// Number of regular files included in the payload.
    pub files: usize,
}

/// Entrypoint: pin the tree under `root` and return the resulting CID.
///
/// An empty tree still results in an upload call with an empty payload.
pub async fn backup<S>(root: &Path, service: &S) -> Result<BackupReport>
where
    S: PinningService,
{
    let entries = collect_files(root)?;
    let files = entries.len();
    info!(root = ?root, files, "collected files for upload");

    let response = match service.upload(entries).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "upload to pinning service failed");
            return Err(anyhow::Error::msg(format!("upload failed: {e}")));
        }
    };

    let cid = extract_cid(&response).map_err(|e| {
        error!(error = %e, "pinning service returned an unusable response");
        e
    })?;

    info!(cid = %cid, files, "backup pinned to IPFS");
    Ok(BackupReport { cid, files })
}
