use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::blockchain::{Block, Blockchain, ProofOfWork, Transaction};
use crate::error::NodeError;

/// One ledger node: identity, proof-of-work engine, the ledger itself and
/// the set of known peers.
///
/// Everything mutable sits behind a mutex so the HTTP handlers can share a
/// single instance; several independent nodes can also coexist in one
/// process, which is how the consensus tests exercise multi-node behavior.
pub struct Node {
    id: String,
    pow: ProofOfWork,
    ledger: Mutex<Blockchain>,
    peers: Mutex<HashSet<String>>,
    shutdown: Arc<AtomicBool>,
}

impl Node {
    pub fn new(difficulty: usize) -> Self {
        Node {
            id: Uuid::new_v4().simple().to_string(),
            pow: ProofOfWork::new(difficulty),
            ledger: Mutex::new(Blockchain::new()),
            peers: Mutex::new(HashSet::new()),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Opaque identifier minted at startup; the mining-reward recipient.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pow(&self) -> &ProofOfWork {
        &self.pow
    }

    /// Stages a transaction, returning the index of the block that will
    /// hold it.
    pub fn submit_transaction(&self, transaction: Transaction) -> u64 {
        self.ledger.lock().unwrap().new_transaction(transaction)
    }

    /// Snapshot of the committed block sequence.
    pub fn chain(&self) -> Vec<Block> {
        self.ledger.lock().unwrap().blocks().to_vec()
    }

    pub fn chain_len(&self) -> usize {
        self.ledger.lock().unwrap().len()
    }

    pub fn last_block(&self) -> Block {
        self.ledger.lock().unwrap().last_block().clone()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.ledger.lock().unwrap().pending().to_vec()
    }

    /// Adds a peer, normalized to its `host:port` netloc. Full URLs and
    /// bare `host:port` strings are both accepted.
    pub fn register_peer(&self, address: &str) -> Result<String, NodeError> {
        let netloc = parse_netloc(address)?;
        self.peers.lock().unwrap().insert(netloc.clone());
        Ok(netloc)
    }

    /// Adds a batch of peers atomically: either every address parses and
    /// all are registered, or the peer set is left untouched.
    pub fn register_peers(&self, addresses: &[String]) -> Result<Vec<String>, NodeError> {
        let netlocs = addresses
            .iter()
            .map(|address| parse_netloc(address))
            .collect::<Result<Vec<_>, _>>()?;

        let mut peers = self.peers.lock().unwrap();
        for netloc in &netlocs {
            peers.insert(netloc.clone());
        }
        Ok(netlocs)
    }

    /// Known peers in sorted order, so anything iterating over them behaves
    /// deterministically.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.peers.lock().unwrap().iter().cloned().collect();
        peers.sort();
        peers
    }

    /// Replaces the local chain with `candidate` if it is still strictly
    /// longer at the moment the lock is held. The length re-check keeps a
    /// consensus replacement from clobbering a block sealed while the
    /// candidate was in flight.
    pub fn adopt_chain(&self, candidate: Vec<Block>) -> bool {
        let mut ledger = self.ledger.lock().unwrap();
        if candidate.len() > ledger.len() {
            ledger.replace(candidate);
            true
        } else {
            debug!("candidate chain no longer than local chain, keeping ours");
            false
        }
    }

    /// Solves the puzzle against the current tip, then seals a block holding
    /// the drained pool plus the mining reward.
    ///
    /// The search runs on a blocking worker with no lock held, so reads stay
    /// cheap while the node mines. If the tip moves before the proof lands
    /// (a concurrent seal or a consensus replacement), the stale proof is
    /// discarded and the search restarts against the new tip.
    pub async fn mine(&self) -> Result<Block, NodeError> {
        loop {
            let (last_proof, tip_index) = {
                let ledger = self.ledger.lock().unwrap();
                let last = ledger.last_block();
                (last.proof, last.index)
            };

            let pow = self.pow.clone();
            let cancel = Arc::clone(&self.shutdown);
            let proof = tokio::task::spawn_blocking(move || pow.solve(last_proof, &cancel))
                .await
                .map_err(|err| NodeError::PowWorker(err.to_string()))?
                .ok_or(NodeError::MiningCancelled)?;

            let mut ledger = self.ledger.lock().unwrap();
            if ledger.last_block().index != tip_index {
                debug!(tip_index, "tip moved during proof search, retrying");
                continue;
            }

            ledger.new_transaction(Transaction::reward(&self.id));
            return Ok(ledger.new_block(proof, None).clone());
        }
    }

    /// Raises the flag every in-flight proof search watches.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

/// Extracts the `host:port` netloc from a peer address. Accepts full URLs
/// like `http://192.168.0.5:5000` as well as scheme-less `host:port` forms.
fn parse_netloc(address: &str) -> Result<String, NodeError> {
    if let Ok(url) = Url::parse(address) {
        if let Some(host) = url.host_str() {
            return Ok(match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            });
        }
    }
    if !address.is_empty() && !address.contains('/') {
        return Ok(address.to_string());
    }
    Err(NodeError::BadPeerAddress(address.to_string()))
}
