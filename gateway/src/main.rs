use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use args::Args;
use axum::Router;
use clap::Parser;
use config::Config;
use server::ServeConfig;

mod args;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(&args);

    let config = args.config()?;

    if let Err(e) = server::serve(serve_config(&args, config)).await {
        log::error!("Gateway failed to start: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn serve_config(args: &Args, config: Config) -> ServeConfig {
    let listen_address = args
        .listen_address
        .or(config.server.listen_address)
        .unwrap_or(SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8080)));

    ServeConfig {
        listen_address,
        config,
        downstream: Router::new(),
    }
}
