//! CLI interface for ipfs-backup: argument parsing, orchestration glue, and
//! the process output contract.
//!
//! The async [`run`] entrypoint is extracted from `main` so integration tests
//! can invoke the CLI programmatically with a constructed [`Cli`].
//!
//! On success the process prints two lines to stdout: a human-readable one
//! carrying the CID, and a `::set-output` line for the CI orchestrator. All
//! diagnostics go through `tracing` (stderr); any error propagates to `main`
//! and terminates the process with status 1.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::backup::backup;
use crate::pin::LighthouseClient;

/// CLI for ipfs-backup: pin a directory tree to IPFS and report the CID.
#[derive(Parser)]
#[clap(
    name = "ipfs-backup",
    version,
    about = "Pin a directory tree to IPFS via the Lighthouse pinning service"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload every regular file under the root directory and print the CID
    Pin {
        /// Root directory to collect files from
        #[clap(long, default_value = ".")]
        dir: PathBuf,
    },
}

/// Formats the machine-readable output line consumed by the CI orchestrator.
pub fn set_output(name: &str, value: &str) -> String {
    format!("::set-output name={name}::{value}")
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Pin { dir } => {
            tracing::info!(command = "pin", dir = ?dir, "starting backup run");
            let service = LighthouseClient::new_from_env();
            let report = backup(&dir, &service).await?;
            println!("Uploaded to IPFS : {}", report.cid);
            println!("{}", set_output("cid", &report.cid));
            tracing::info!(
                command = "pin",
                cid = %report.cid,
                files = report.files,
                "backup complete"
            );
            Ok(())
        }
    }
}
