use super::Transaction;

/// Staging area for transactions that have not been sealed into a block yet.
///
/// Field presence is checked at the HTTP boundary, not here; the pool accepts
/// whatever it is handed and gives it all back on the next drain.
#[derive(Debug, Default)]
pub struct Mempool {
    pending: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Mempool::default()
    }

    pub fn add(&mut self, transaction: Transaction) {
        self.pending.push(transaction);
    }

    /// Hands over every pending transaction, leaving the pool empty.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
