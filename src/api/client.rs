use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::blockchain::Block;
use crate::error::NodeError;
use crate::node::Node;

/// Upper bound on a single peer chain fetch. A peer that cannot answer in
/// time is skipped for this round, never treated as having an empty chain.
const PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// Body of a peer's `GET /chain` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

async fn fetch_peer_chain(client: &Client, peer: &str) -> Result<ChainResponse, reqwest::Error> {
    client
        .get(format!("http://{peer}/chain"))
        .send()
        .await?
        .error_for_status()?
        .json::<ChainResponse>()
        .await
}

/// Longest-valid-chain consensus pass over every known peer.
///
/// Peers are visited in sorted order and only a strictly longer candidate
/// displaces the current best, so ties resolve deterministically to the
/// first longest chain in that order. An unreachable or erroring peer is
/// skipped; an invalid chain is discarded. Returns whether the local chain
/// was replaced.
pub async fn resolve_conflicts(node: &Node) -> Result<bool, NodeError> {
    let client = Client::builder().timeout(PEER_TIMEOUT).build()?;

    let mut best: Option<Vec<Block>> = None;
    let mut best_len = node.chain_len();

    for peer in node.peers() {
        let response = match fetch_peer_chain(&client, &peer).await {
            Ok(response) => response,
            Err(err) => {
                debug!(%peer, %err, "skipping unreachable peer");
                continue;
            }
        };

        if response.chain.len() > best_len && node.pow().valid_chain(&response.chain) {
            best_len = response.chain.len();
            best = Some(response.chain);
        }
    }

    match best {
        Some(candidate) => {
            let adopted = node.adopt_chain(candidate);
            if adopted {
                info!(length = best_len, "replaced local chain with peer chain");
            }
            Ok(adopted)
        }
        None => Ok(false),
    }
}
