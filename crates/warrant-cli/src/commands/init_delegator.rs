//! `warrant init-delegator`: Activate a delegator identifier on the node.

use clap::Args;
use serde::{Deserialize, Serialize};

use super::DEFAULT_ENDPOINT;
use crate::client::NodeClient;

#[derive(Args, Debug)]
pub struct InitDelegatorArgs {
    /// Key type of the delegator identifier.
    #[arg(short, long, default_value = "Ed25519")]
    pub key_type: String,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitRequest<'a> {
    key_type: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitResponse {
    delegator_identifier: String,
}

pub async fn run(args: &InitDelegatorArgs) -> anyhow::Result<()> {
    let req = InitRequest {
        key_type: &args.key_type,
    };
    let resp: InitResponse = NodeClient::new(&args.endpoint)
        .post("/initialize-delegator", &req)
        .await?;
    println!("Delegator initialized!");
    println!("  DID:       {}", resp.delegator_identifier);
    println!("  Key type:  {}", args.key_type);
    Ok(())
}
