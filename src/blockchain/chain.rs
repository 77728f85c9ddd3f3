use super::{Block, Mempool, Transaction};
use crate::utils::hash_block;

/// Previous-hash sentinel of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "1";
/// Proof carried by the genesis block; not derived from any puzzle.
pub const GENESIS_PROOF: u64 = 100;

/// The append-only block sequence plus its live transaction pool.
///
/// Grows only through `new_block` or wholesale replacement during consensus;
/// blocks are never edited in place once appended.
#[derive(Debug)]
pub struct Blockchain {
    blocks: Vec<Block>,
    pool: Mempool,
}

impl Blockchain {
    /// A fresh ledger containing only the genesis block.
    pub fn new() -> Self {
        let mut ledger = Blockchain {
            blocks: Vec::new(),
            pool: Mempool::new(),
        };
        ledger.new_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()));
        ledger
    }

    /// Stages a transaction and reports the index of the block that will
    /// eventually hold it.
    pub fn new_transaction(&mut self, transaction: Transaction) -> u64 {
        self.pool.add(transaction);
        self.last_block().index + 1
    }

    /// Seals a new block from the drained pool and appends it.
    ///
    /// When `previous_hash` is `None` the digest of the current tip is used;
    /// the explicit form exists for the genesis block.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash =
            previous_hash.unwrap_or_else(|| hash_block(self.blocks.last().expect(
                "a previous hash can only be derived once the genesis block exists",
            )));

        let block = Block::new(
            self.blocks.len() as u64 + 1,
            self.pool.drain(),
            proof,
            previous_hash,
        );
        self.blocks.push(block);

        self.blocks.last().expect("the block was just appended")
    }

    pub fn last_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("the ledger always contains the genesis block")
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn pending(&self) -> &[Transaction] {
        self.pool.pending()
    }

    /// Unconditional overwrite of the block sequence. Callers validate the
    /// candidate first; this is the consensus adoption path.
    pub fn replace(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Blockchain::new()
    }
}
