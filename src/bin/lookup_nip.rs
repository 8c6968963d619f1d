//! Command-line lookup of a single company in CEIDG.
//!
//! Usage: `lookup_nip <NIP>`. Reads the same environment as the server.

use ceidg_lookup_api::config::Config;
use ceidg_lookup_api::core::services::{LookupOutcome, RegistryLookupService};
use std::env;
use std::process::ExitCode;

/// Main entry point for the lookup utility.
///
/// Prints the company as pretty JSON, or a message and a non-zero exit code
/// when it is not found (1) or CEIDG is unavailable (2).
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let Some(raw_nip) = env::args().nth(1) else {
        eprintln!("Usage: lookup_nip <NIP>");
        return Ok(ExitCode::from(64));
    };

    let config = Config::from_env()?;
    let service = RegistryLookupService::new(&config)?;

    match service.find_by_nip(&raw_nip).await {
        LookupOutcome::Found(company) => {
            println!("{}", serde_json::to_string_pretty(company.as_ref())?);
            Ok(ExitCode::SUCCESS)
        }
        LookupOutcome::NotFound(reason) => {
            eprintln!("Company with NIP {} not found ({:?})", raw_nip, reason);
            Ok(ExitCode::from(1))
        }
        LookupOutcome::ServiceUnavailable { retry_after } => {
            eprintln!(
                "CEIDG unavailable, try again in {} seconds",
                retry_after.as_secs()
            );
            Ok(ExitCode::from(2))
        }
    }
}
