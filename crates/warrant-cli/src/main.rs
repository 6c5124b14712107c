//! Warrant CLI: client for a running Warrant node.
//!
//! Subcommands: health, company-did, employee-credential, adc,
//! init-delegator, store, retrieve.

mod client;
mod commands;

use clap::{Parser, Subcommand};

/// Warrant: policy-gated credential delegation.
#[derive(Parser, Debug)]
#[command(name = "warrant", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that a node is up.
    Health(commands::health::HealthArgs),
    /// Show the node's company DID.
    CompanyDid(commands::company_did::CompanyDidArgs),
    /// Request a sample employee credential for a holder DID.
    EmployeeCredential(commands::employee_credential::EmployeeCredentialArgs),
    /// Exchange a presentation for an access delegation credential.
    Adc(commands::adc::AdcArgs),
    /// Make a fresh delegator identifier the active ADC signer.
    InitDelegator(commands::init_delegator::InitDelegatorArgs),
    /// Put a credential into one of the node's store slots.
    Store(commands::store::StoreArgs),
    /// Retrieve a delegated credential with an ADC.
    Retrieve(commands::retrieve::RetrieveArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Health(args) => commands::health::run(args).await,
        Commands::CompanyDid(args) => commands::company_did::run(args).await,
        Commands::EmployeeCredential(args) => commands::employee_credential::run(args).await,
        Commands::Adc(args) => commands::adc::run(args).await,
        Commands::InitDelegator(args) => commands::init_delegator::run(args).await,
        Commands::Store(args) => commands::store::run(args).await,
        Commands::Retrieve(args) => commands::retrieve::run(args).await,
    }
}
