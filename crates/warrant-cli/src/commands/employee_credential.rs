//! `warrant employee-credential`: Request a sample employee credential.

use clap::Args;

use super::DEFAULT_ENDPOINT;
use crate::client::{print_json, NodeClient};

#[derive(Args, Debug)]
pub struct EmployeeCredentialArgs {
    /// Holder DID the credential is issued to.
    pub did: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

pub async fn run(args: &EmployeeCredentialArgs) -> anyhow::Result<()> {
    let credential: serde_json::Value = NodeClient::new(&args.endpoint)
        .get(&format!("/credentials/{}", args.did))
        .await?;
    print_json(&credential)
}
