use anyhow::Context;
use clap::Parser;

use bookstore_storefront::StorefrontConfig;
use bookstore_storefront::cli::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = StorefrontConfig::from_env().context("invalid configuration")?;

    bookstore_observability::init(config.log_format);
    tracing::debug!(api_url = %config.api_url, data_dir = ?config.data_dir, "configuration loaded");

    run(cli, config).await
}
