use crate::config::*;
use crate::decoder::*;
use crate::error::*;
use crate::flash::FlashRead;
use crate::stats::*;
use crate::store::CacheStore;
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAccess {
    Hit(WayIndex),
    Miss,
}

/// Read-only set-associative cache over flash.
///
/// The controller does no locking. Callers sharing one instance between an
/// interrupt handler and a main loop have to serialize every call.
pub struct CacheController<F: FlashRead> {
    store: CacheStore,
    flash: F,
    stats: StatsCollector,
    line_buffer: LineData,
}

impl<F: FlashRead> CacheController<F> {
    /// Takes ownership of the backing arena and initializes it.
    pub fn new(store: CacheStore, flash: F) -> Self {
        let mut controller = CacheController {
            store,
            flash,
            stats: StatsCollector::new(),
            line_buffer: [0; LINE_SIZE],
        };
        controller.init();
        controller
    }

    pub fn init(&mut self) {
        self.store.invalidate_all();
        self.store.reset_ranks();
        self.stats.reset();
    }

    /// Drops every cached line, keeping ranks and statistics.
    #[allow(dead_code)]
    pub fn invalidate(&mut self) {
        self.store.invalidate_all();
    }

    pub fn lookup(&mut self, addr: Address) -> CacheResult<CacheAccess> {
        if !is_cacheable(addr) {
            return Err(CacheError::NotCacheable(addr));
        }
        let set = get_set_index(addr);
        let tag = get_tag(addr);
        let found = self.store.set(set)?.find(tag);
        match found {
            Some(way) => {
                self.stats.record_hit();
                self.promote(set, way)?;
                log::trace!("hit 0x{:>08x} (set: {}, way: {})", addr, set, way);
                Ok(CacheAccess::Hit(way))
            }
            None => {
                self.stats.record_miss();
                Ok(CacheAccess::Miss)
            }
        }
    }

    /// Brings the line holding `addr` into the cache and returns its way.
    /// Meant to follow a `Miss` from `lookup`.
    pub fn fill(&mut self, addr: Address) -> CacheResult<WayIndex> {
        if !is_cacheable(addr) {
            return Err(CacheError::NotCacheable(addr));
        }
        let set = get_set_index(addr);
        let tag = get_tag(addr);
        let present = self.store.set(set)?.find(tag);
        if let Some(way) = present {
            self.promote(set, way)?;
            return Ok(way);
        }

        let way = self.victim(set)?;
        let victim_line = self.store.read_line(set, way)?;
        if victim_line.is_valid() {
            self.stats.record_eviction();
            log::debug!(
                "evict 0x{:>08x} for 0x{:>08x} (set: {}, way: {})",
                line_addr(victim_line.get_tag(), set),
                align_addr(addr),
                set,
                way
            );
        }

        self.flash.read_line(align_addr(addr), &mut self.line_buffer);
        self.store.write_line(set, way, tag, &self.line_buffer)?;
        self.promote(set, way)?;
        log::debug!("fill 0x{:>08x} (set: {}, way: {})", align_addr(addr), set, way);
        Ok(way)
    }

    #[allow(dead_code)]
    pub fn access(&mut self, addr: Address) -> CacheResult<WayIndex> {
        match self.lookup(addr)? {
            CacheAccess::Hit(way) => Ok(way),
            CacheAccess::Miss => self.fill(addr),
        }
    }

    pub fn promote(&mut self, set: SetIndex, way: WayIndex) -> CacheResult<()> {
        if way >= WAY_NUM {
            return Err(CacheError::OutOfRange { set, way });
        }
        self.store.set_mut(set)?.ranks_mut().promote(way);
        Ok(())
    }

    pub fn victim(&self, set: SetIndex) -> CacheResult<WayIndex> {
        self.store
            .set(set)?
            .ranks()
            .victim()
            .ok_or(CacheError::RankInvariantViolated { set })
    }

    #[allow(dead_code)]
    pub fn ranks(&self, set: SetIndex) -> CacheResult<[Rank; WAY_NUM]> {
        Ok(self.store.set(set)?.ranks().as_array())
    }

    #[allow(dead_code)]
    pub fn read_byte(&mut self, addr: Address) -> CacheResult<u8> {
        let mut value = [0; 1];
        self.read_bytes(addr, &mut value)?;
        Ok(value[0])
    }

    /// Little-endian word at `addr`. A word straddling two lines counts as an
    /// access to each of them.
    #[allow(dead_code)]
    pub fn read_word(&mut self, addr: Address) -> CacheResult<Word> {
        self.read_word_noting_misses(addr, |_| {})
    }

    /// Like `read_word`, calling `on_miss` with the base address of every
    /// line that had to be filled.
    pub fn read_word_noting_misses<M: FnMut(Address)>(
        &mut self,
        addr: Address,
        on_miss: M,
    ) -> CacheResult<Word> {
        let mut value = [0; 4];
        self.read_bytes_noting_misses(addr, &mut value, on_miss)?;
        Ok(Word::from_le_bytes(value))
    }

    #[allow(dead_code)]
    pub fn read_bytes(&mut self, addr: Address, buffer: &mut [u8]) -> CacheResult<()> {
        self.read_bytes_noting_misses(addr, buffer, |_| {})
    }

    pub fn read_bytes_noting_misses<M: FnMut(Address)>(
        &mut self,
        addr: Address,
        buffer: &mut [u8],
        mut on_miss: M,
    ) -> CacheResult<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        let last = addr
            .checked_add(buffer.len() as Address - 1)
            .ok_or(CacheError::NotCacheable(addr))?;
        if !is_cacheable(addr) {
            return Err(CacheError::NotCacheable(addr));
        }
        if !is_cacheable(last) {
            return Err(CacheError::NotCacheable(last));
        }

        let mut cursor = addr;
        let mut copied = 0;
        while copied < buffer.len() {
            let way = match self.lookup(cursor)? {
                CacheAccess::Hit(way) => way,
                CacheAccess::Miss => {
                    on_miss(align_addr(cursor));
                    self.fill(cursor)?
                }
            };
            let offset = get_offset(cursor);
            let len = (LINE_SIZE - offset).min(buffer.len() - copied);
            let line = self.store.read_line(get_set_index(cursor), way)?;
            buffer[copied..copied + len].copy_from_slice(&line.get_data()[offset..offset + len]);
            copied += len;
            cursor += len as Address;
        }
        Ok(())
    }

    pub fn get_stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    #[allow(dead_code)]
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    #[allow(dead_code)]
    pub fn get_flash(&self) -> &F {
        &self.flash
    }
}
