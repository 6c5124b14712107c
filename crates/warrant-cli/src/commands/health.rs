//! `warrant health`: Check that a node is up.

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;
use crate::client::NodeClient;

#[derive(Args, Debug)]
pub struct HealthArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct HealthResponse {
    alive: bool,
}

pub async fn run(args: &HealthArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.endpoint);
    let health: HealthResponse = client.get("/health").await?;
    if health.alive {
        println!("Node at {} is alive", client.endpoint());
    } else {
        anyhow::bail!("node at {} reports it is not alive", client.endpoint());
    }
    Ok(())
}
