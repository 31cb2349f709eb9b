//! Command-line interface

pub mod serve;

use clap::{Parser, Subcommand};

use crate::infrastructure::crypto::EncryptionSecret;

#[derive(Parser)]
#[command(name = "keygate", about = "API credential issuance and validation service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,
    /// Print a freshly generated encryption secret (hex)
    GenerateSecret,
}

/// Generate and print an encryption secret for configuration
pub fn generate_secret() -> anyhow::Result<()> {
    let secret = EncryptionSecret::generate()?;
    println!("{}", secret.to_hex());
    Ok(())
}
