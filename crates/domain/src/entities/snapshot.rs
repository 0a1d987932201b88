use crate::entities::pool::PoolRecord;
use serde::{Deserialize, Serialize};

/// Immutable view of every pool on a chain at one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub chain_id: u64,
    pub block_timestamp: u64,
    pub pools: Vec<PoolRecord>,
}

impl PoolSnapshot {
    pub fn new(chain_id: u64, block_timestamp: u64, pools: Vec<PoolRecord>) -> Self {
        Self {
            chain_id,
            block_timestamp,
            pools,
        }
    }

    pub fn pool(&self, id: &str) -> Option<&PoolRecord> {
        self.pools.iter().find(|pool| pool.id == id)
    }
}
