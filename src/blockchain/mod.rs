pub mod block;
pub mod chain;
pub mod consensus;
pub mod mempool;

pub use block::{Block, Transaction, MINING_REWARD, MINING_SENDER};
pub use chain::Blockchain;
pub use consensus::ProofOfWork;
pub use mempool::Mempool;
