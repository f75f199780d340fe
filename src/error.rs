use std::fmt;

use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// The address lies outside the flash window; read flash directly.
    NotCacheable(Address),
    OutOfRange { set: SetIndex, way: WayIndex },
    RankInvariantViolated { set: SetIndex },
}

impl CacheError {
    /// `true` for errors that signal a broken cache state rather than an
    /// ordinary bypass.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CacheError::NotCacheable(_))
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::NotCacheable(addr) => {
                write!(f, "address 0x{:>08x} is not cacheable", addr)
            }
            CacheError::OutOfRange { set, way } => {
                write!(f, "cache slot out of range (set: {}, way: {})", set, way)
            }
            CacheError::RankInvariantViolated { set } => {
                write!(f, "no least recently used way in set {}", set)
            }
        }
    }
}

impl std::error::Error for CacheError {}

pub type CacheResult<T> = Result<T, CacheError>;
