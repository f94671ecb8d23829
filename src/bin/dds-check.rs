use anyhow::Result;
use clap::Parser;
use dds_model::{app::App, args::CheckArgs};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    App::new(&CheckArgs::parse()).await?.run().await
}
