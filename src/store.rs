use crate::config::*;
use crate::error::*;
use crate::lru::LruRanks;
use crate::types::*;

#[derive(Debug, Clone)]
pub struct CacheLine {
    valid: bool,
    tag: Tag,
    data: LineData,
}

impl CacheLine {
    fn new() -> Self {
        CacheLine {
            valid: false,
            tag: 0,
            data: [0; LINE_SIZE],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn get_tag(&self) -> Tag {
        self.tag
    }

    pub fn get_data(&self) -> &LineData {
        &self.data
    }

    pub fn matches(&self, tag: Tag) -> bool {
        self.valid && self.tag == tag
    }
}

#[derive(Debug, Clone)]
pub struct CacheSet {
    ways: [CacheLine; WAY_NUM],
    ranks: LruRanks,
}

impl CacheSet {
    fn new() -> Self {
        CacheSet {
            ways: std::array::from_fn(|_| CacheLine::new()),
            ranks: LruRanks::new(),
        }
    }

    /// Way holding a valid copy of `tag`, if any.
    pub fn find(&self, tag: Tag) -> Option<WayIndex> {
        self.ways.iter().position(|line| line.matches(tag))
    }

    pub fn ranks(&self) -> &LruRanks {
        &self.ranks
    }

    pub fn ranks_mut(&mut self) -> &mut LruRanks {
        &mut self.ranks
    }
}

/// Backing arena for one controller: `SET_NUM` sets of `WAY_NUM` lines plus
/// the rank array of each set.
pub struct CacheStore {
    sets: Box<[CacheSet]>,
}

impl CacheStore {
    pub fn new() -> Self {
        let sets = (0..SET_NUM).map(|_| CacheSet::new()).collect();
        CacheStore { sets }
    }

    fn check(set: SetIndex, way: WayIndex) -> CacheResult<()> {
        if set >= SET_NUM || way >= WAY_NUM {
            return Err(CacheError::OutOfRange { set, way });
        }
        Ok(())
    }

    pub fn set(&self, set: SetIndex) -> CacheResult<&CacheSet> {
        self.sets
            .get(set)
            .ok_or(CacheError::OutOfRange { set, way: 0 })
    }

    pub fn set_mut(&mut self, set: SetIndex) -> CacheResult<&mut CacheSet> {
        self.sets
            .get_mut(set)
            .ok_or(CacheError::OutOfRange { set, way: 0 })
    }

    pub fn read_line(&self, set: SetIndex, way: WayIndex) -> CacheResult<&CacheLine> {
        Self::check(set, way)?;
        Ok(&self.sets[set].ways[way])
    }

    pub fn write_line(
        &mut self,
        set: SetIndex,
        way: WayIndex,
        tag: Tag,
        data: &LineData,
    ) -> CacheResult<()> {
        Self::check(set, way)?;
        let line = &mut self.sets[set].ways[way];
        line.valid = true;
        line.tag = tag;
        line.data.copy_from_slice(data);
        Ok(())
    }

    /// Drops every line. Ranks are left alone.
    pub fn invalidate_all(&mut self) {
        for set in self.sets.iter_mut() {
            for line in set.ways.iter_mut() {
                line.valid = false;
                line.tag = 0;
            }
        }
    }

    pub fn reset_ranks(&mut self) {
        for set in self.sets.iter_mut() {
            set.ranks.reset();
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}
