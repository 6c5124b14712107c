//! `warrant adc`: Exchange a signed presentation for an access delegation credential.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde_json::Value;

use super::DEFAULT_ENDPOINT;
use crate::client::{print_json, read_json, NodeClient};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum IssuingRole {
    /// Employee credential in, company-issued ADC out.
    Company,
    /// Performance credential in, delegator-issued ADC out.
    Performance,
}

#[derive(Args, Debug)]
pub struct AdcArgs {
    /// File holding the verifiable presentation (JSON).
    pub presentation: PathBuf,

    #[arg(short, long, value_enum, default_value = "company")]
    pub role: IssuingRole,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &AdcArgs) -> anyhow::Result<()> {
    let presentation = read_json(&args.presentation)?;
    let client = NodeClient::new(&args.endpoint);

    match args.role {
        IssuingRole::Company => {
            let adc: Value = client.post("/adc", &presentation).await?;
            print_json(&adc)
        }
        IssuingRole::Performance => {
            let resp: Value = client
                .post("/performance-credential/get-adc", &presentation)
                .await?;
            if let Some(ms) = resp.get("timeTaken").and_then(Value::as_f64) {
                eprintln!("issued in {:.2} ms", ms);
            }
            print_json(&resp["accessDelegationCredential"])
        }
    }
}
