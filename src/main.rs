use actix_web::web;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ferrochain::api::server::run_server;
use ferrochain::node::Node;

/// A minimal proof-of-work ledger node.
#[derive(Parser)]
#[command(name = "ferrochain", version)]
struct Args {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// Interface to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Leading zero hex digits a proof hash must carry.
    #[arg(short, long, default_value_t = 1)]
    difficulty: usize,

    /// Peer address to register at startup; repeatable.
    #[arg(long = "peer")]
    peers: Vec<String>,

    /// Seconds between background consensus passes; 0 disables them.
    #[arg(long, default_value_t = 10)]
    sync_interval: u64,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let node = web::Data::new(Node::new(args.difficulty));
    info!(
        node_id = %node.id(),
        difficulty = node.pow().difficulty(),
        "node initialized"
    );

    for peer in &args.peers {
        match node.register_peer(peer) {
            Ok(netloc) => info!(%netloc, "registered peer"),
            Err(err) => warn!(%peer, %err, "ignoring unparseable peer address"),
        }
    }

    let address = format!("{}:{}", args.host, args.port);
    run_server(node, &address, args.sync_interval).await
}
