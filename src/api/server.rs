use actix_web::{web, App, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::api::client;
use crate::blockchain::Transaction;
use crate::error::NodeError;
use crate::node::Node;

#[derive(Deserialize)]
pub struct NewTransactionRequest {
    sender: Option<String>,
    recipient: Option<String>,
    amount: Option<u64>,
}

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    nodes: Option<Vec<String>>,
}

// GET /mine: solve the puzzle, seal the pool plus the reward into a block
pub async fn mine(node: web::Data<Node>) -> Result<HttpResponse, NodeError> {
    let block = node.mine().await?;
    info!(index = block.index, "sealed a new block");

    Ok(HttpResponse::Ok().json(json!({
        "message": "New Block Forged",
        "index": block.index,
        "transactions": block.transactions,
        "proof": block.proof,
        "previous_hash": block.previous_hash,
    })))
}

// POST /transactions/new: stage a transaction for the next block
pub async fn new_transaction(
    node: web::Data<Node>,
    request: web::Json<NewTransactionRequest>,
) -> Result<HttpResponse, NodeError> {
    let request = request.into_inner();
    let (Some(sender), Some(recipient), Some(amount)) =
        (request.sender, request.recipient, request.amount)
    else {
        return Err(NodeError::MissingFields);
    };

    let index = node.submit_transaction(Transaction::new(sender, recipient, amount));

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Transaction will be added to Block {index}"),
    })))
}

// GET /chain: the full local chain and its length
pub async fn get_chain(node: web::Data<Node>) -> HttpResponse {
    let chain = node.chain();
    let length = chain.len();

    HttpResponse::Ok().json(json!({
        "chain": chain,
        "length": length,
    }))
}

// POST /nodes/register: add peer addresses to the peer set
pub async fn register_nodes(
    node: web::Data<Node>,
    request: web::Json<RegisterNodesRequest>,
) -> Result<HttpResponse, NodeError> {
    let Some(addresses) = request.into_inner().nodes else {
        return Err(NodeError::MissingNodeList);
    };

    node.register_peers(&addresses)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "New nodes have been added",
        "total_nodes": node.peers(),
    })))
}

// GET /nodes/resolve: run the longest-valid-chain consensus pass
pub async fn resolve(node: web::Data<Node>) -> Result<HttpResponse, NodeError> {
    let replaced = client::resolve_conflicts(&node).await?;

    let body = if replaced {
        json!({
            "message": "Our chain was replaced",
            "new_chain": node.chain(),
        })
    } else {
        json!({
            "message": "Our chain is authoritative",
            "chain": node.chain(),
        })
    };

    Ok(HttpResponse::Ok().json(body))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/mine", web::get().to(mine))
        .route("/transactions/new", web::post().to(new_transaction))
        .route("/chain", web::get().to(get_chain))
        .route("/nodes/register", web::post().to(register_nodes))
        .route("/nodes/resolve", web::get().to(resolve));
}

/// Serves the node at `address`; when `sync_interval` is non-zero, a
/// background task re-runs consensus against the peers every that many
/// seconds.
pub async fn run_server(
    node: web::Data<Node>,
    address: &str,
    sync_interval: u64,
) -> std::io::Result<()> {
    if sync_interval > 0 {
        let sync_node = node.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(sync_interval));
            loop {
                interval.tick().await;
                match client::resolve_conflicts(&sync_node).await {
                    Ok(true) => info!("periodic sync adopted a longer peer chain"),
                    Ok(false) => {}
                    Err(err) => warn!(%err, "periodic chain sync failed"),
                }
            }
        });
    }

    info!(%address, "starting ferrochain node");

    let app_node = node.clone();
    let result = HttpServer::new(move || {
        App::new()
            .app_data(app_node.clone())
            .configure(routes)
    })
    .bind(address)?
    .run()
    .await;

    node.shutdown();
    result
}
