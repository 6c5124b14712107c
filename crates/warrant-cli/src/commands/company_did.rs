//! `warrant company-did`: Show the node's company DID.

use clap::Args;
use serde::Deserialize;

use super::DEFAULT_ENDPOINT;
use crate::client::NodeClient;

#[derive(Args, Debug)]
pub struct CompanyDidArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct CompanyDidResponse {
    #[serde(rename = "companyDID")]
    company_did: String,
}

pub async fn run(args: &CompanyDidArgs) -> anyhow::Result<()> {
    let resp: CompanyDidResponse = NodeClient::new(&args.endpoint).get("/company/did").await?;
    println!("{}", resp.company_did);
    Ok(())
}
