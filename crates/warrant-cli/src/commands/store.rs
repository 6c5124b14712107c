//! `warrant store`: Put a credential into a node store slot.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;
use crate::client::{read_json, NodeClient};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Slot {
    /// The supervisor's library credential.
    Supervisor,
    /// The performance test credential.
    Performance,
}

impl Slot {
    fn path(self) -> &'static str {
        match self {
            Slot::Supervisor => "/supervisor/library-credential/set",
            Slot::Performance => "/performance-credential/set",
        }
    }
}

#[derive(Args, Debug)]
pub struct StoreArgs {
    #[arg(value_enum)]
    pub slot: Slot,

    /// File holding the verifiable credential (JSON).
    pub credential: PathBuf,

    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct AckResponse {
    message: String,
}

pub async fn run(args: &StoreArgs) -> anyhow::Result<()> {
    let credential = read_json(&args.credential)?;
    let ack: AckResponse = NodeClient::new(&args.endpoint)
        .post(args.slot.path(), &credential)
        .await?;
    println!("{}", ack.message);
    Ok(())
}
