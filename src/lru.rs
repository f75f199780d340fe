//! Per-set recency ranking.
//!
//! Every way of a set carries a distinct rank in `0..WAY_NUM`. The way with
//! rank `WAY_NUM - 1` is the most recently used one, the way with rank `0` is
//! the next eviction victim.

use crate::config::WAY_NUM;
use crate::types::*;

const MRU_RANK: Rank = (WAY_NUM - 1) as Rank;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LruRanks {
    ranks: [Rank; WAY_NUM],
}

impl LruRanks {
    pub fn new() -> Self {
        let mut ranks = [0; WAY_NUM];
        for (way, rank) in ranks.iter_mut().enumerate() {
            *rank = way as Rank;
        }
        LruRanks { ranks }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Marks `way` as just used. Ways ranked above it slide down by one.
    pub fn promote(&mut self, way: WayIndex) {
        let old_rank = self.ranks[way];
        for (other, rank) in self.ranks.iter_mut().enumerate() {
            if other != way && *rank > old_rank {
                *rank -= 1;
            }
        }
        self.ranks[way] = MRU_RANK;
    }

    /// The way holding rank 0, or `None` if the ranking is corrupted.
    pub fn victim(&self) -> Option<WayIndex> {
        self.ranks.iter().position(|&rank| rank == 0)
    }

    #[allow(dead_code)]
    pub fn rank_of(&self, way: WayIndex) -> Rank {
        self.ranks[way]
    }

    pub fn as_array(&self) -> [Rank; WAY_NUM] {
        self.ranks
    }

    #[allow(dead_code)]
    pub fn is_permutation(&self) -> bool {
        let mut seen = [false; WAY_NUM];
        for &rank in self.ranks.iter() {
            let rank = rank as usize;
            if rank >= WAY_NUM || seen[rank] {
                return false;
            }
            seen[rank] = true;
        }
        true
    }

    #[cfg(test)]
    pub fn from_array(ranks: [Rank; WAY_NUM]) -> Self {
        LruRanks { ranks }
    }
}

impl Default for LruRanks {
    fn default() -> Self {
        Self::new()
    }
}
