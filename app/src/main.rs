use clap::Parser;
use warp_routes_lib::{init_tracing, run, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing()?;
    run(args).await
}
