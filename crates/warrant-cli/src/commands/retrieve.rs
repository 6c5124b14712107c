//! `warrant retrieve`: Retrieve a delegated credential.
//!
//! Supervisor and doctor retrieval post the ADC itself. Performance
//! retrieval posts a presentation carrying the ADC and reports timings.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde_json::Value;

use super::DEFAULT_ENDPOINT;
use crate::client::{print_json, read_json, NodeClient};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RetrievingRole {
    Supervisor,
    Doctor,
    Performance,
}

#[derive(Args, Debug)]
pub struct RetrieveArgs {
    #[arg(value_enum)]
    pub role: RetrievingRole,

    /// File holding the ADC, or for performance a presentation embedding it (JSON).
    pub input: PathBuf,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &RetrieveArgs) -> anyhow::Result<()> {
    let input = read_json(&args.input)?;
    let client = NodeClient::new(&args.endpoint);

    let path = match args.role {
        RetrievingRole::Supervisor => "/supervisor/library-credential/get",
        RetrievingRole::Doctor => "/doctor/hospital-credential/get",
        RetrievingRole::Performance => "/performance-credential/get",
    };
    let resp: Value = client.post(path, &input).await?;

    match args.role {
        RetrievingRole::Performance => {
            let verification = resp
                .pointer("/verification/timeTaken")
                .and_then(Value::as_f64)
                .unwrap_or_default();
            let retrieval = resp
                .pointer("/retrieval/timeTaken")
                .and_then(Value::as_f64)
                .unwrap_or_default();
            eprintln!(
                "verification {:.2} ms, retrieval {:.2} ms",
                verification, retrieval
            );
            print_json(&resp["delegatedCredential"])
        }
        _ => print_json(&resp),
    }
}
