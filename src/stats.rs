#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub total_accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.total_accesses == 0 {
            return 0.0;
        }
        self.hits as f64 / self.total_accesses as f64
    }
}

#[derive(Debug, Default)]
pub struct StatsCollector {
    stats: CacheStats,
}

impl StatsCollector {
    pub fn new() -> Self {
        StatsCollector {
            stats: CacheStats::default(),
        }
    }

    pub fn snapshot(&self) -> CacheStats {
        self.stats
    }

    pub fn reset(&mut self) {
        self.stats = CacheStats::default();
    }

    pub fn record_hit(&mut self) {
        self.stats.total_accesses += 1;
        self.stats.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.stats.total_accesses += 1;
        self.stats.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.stats.evictions += 1;
    }
}
