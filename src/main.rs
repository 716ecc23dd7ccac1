use clap::Parser;
use duet::signaling::{SignalingArgs, SignalingError, SignalingServer};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), SignalingError> {
    tracing_subscriber::fmt::init();

    let config = SignalingArgs::parse().into_config()?;

    println!("   Duet Signaling Server");
    println!("   Binding to {}", config.bind_addr);
    println!("   Press Ctrl+C to stop\n");

    let server = SignalingServer::bind(&config).await?;

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}
