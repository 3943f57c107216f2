use anyhow::Result;
use clap::Parser;
use deployer_rs::{infrastructure::observability, startup};
use dotenvy::dotenv;
use std::path::PathBuf;

/// Deploys the Auction, Basket and Factory contracts and prints their addresses.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file with network, artifacts and deploy settings
    #[arg(long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    observability::init_tracing();

    let args = Args::parse();
    let report = startup::run(args.config).await?;
    print!("{}", report);
    Ok(())
}
