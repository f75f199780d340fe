use std::fs::File;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use fxhash::FxHashMap;
use indicatif::{ProgressBar, ProgressStyle};

use crate::cache::*;
use crate::flash::*;
use crate::stats::*;
use crate::store::CacheStore;
use crate::trace_loader::*;
use crate::types::*;
use crate::utils::*;

const CACHE_MISS_STALL: u64 = 60;
const CACHE_HIT_STALL: u64 = 1;
const FLASH_BYPASS_STALL: u64 = 5;

pub struct Core {
    flash: Rc<FlashImage>,
    icache: CacheController<Rc<FlashImage>>,
    dcache: CacheController<Rc<FlashImage>>,
    use_cache: bool,
    access_count: u64,
    bypass_count: u64,
    cache_reset_count: u64,
    line_miss_stats: FxHashMap<Address, usize>,
    checksum: Word,
}

impl Core {
    pub fn new(flash: FlashImage) -> Self {
        let flash = Rc::new(flash);
        let icache = CacheController::new(CacheStore::new(), Rc::clone(&flash));
        let dcache = CacheController::new(CacheStore::new(), Rc::clone(&flash));
        Core {
            flash,
            icache,
            dcache,
            use_cache: true,
            access_count: 0,
            bypass_count: 0,
            cache_reset_count: 0,
            line_miss_stats: FxHashMap::default(),
            checksum: 0,
        }
    }

    fn cache_mut(&mut self, kind: AccessKind) -> &mut CacheController<Rc<FlashImage>> {
        match kind {
            AccessKind::Instruction => &mut self.icache,
            AccessKind::Data => &mut self.dcache,
        }
    }

    fn load_word_bypass(&mut self, addr: Address) -> Word {
        self.bypass_count += 1;
        log::debug!("bypass 0x{:>08x}", addr);
        self.flash.load_word(addr)
    }

    pub fn load_word(&mut self, kind: AccessKind, addr: Address) -> Word {
        self.access_count += 1;
        if !self.use_cache {
            return self.load_word_bypass(addr);
        }

        let cache = match kind {
            AccessKind::Instruction => &mut self.icache,
            AccessKind::Data => &mut self.dcache,
        };
        let line_miss_stats = &mut self.line_miss_stats;
        let result = cache.read_word_noting_misses(addr, |line| {
            *line_miss_stats.entry(line).or_insert(0) += 1;
        });
        match result {
            Ok(value) => value,
            Err(e) if !e.is_fatal() => self.load_word_bypass(addr),
            Err(e) => {
                log::error!("{:?} cache failed at 0x{:>08x}: {}", kind, addr, e);
                self.cache_mut(kind).init();
                self.cache_reset_count += 1;
                self.load_word_bypass(addr)
            }
        }
    }

    pub fn get_stats(&self, kind: AccessKind) -> CacheStats {
        match kind {
            AccessKind::Instruction => self.icache.get_stats(),
            AccessKind::Data => self.dcache.get_stats(),
        }
    }

    pub fn get_checksum(&self) -> Word {
        self.checksum
    }

    fn predicted_cycle_count(&self) -> u64 {
        let mut cycle_num = self.bypass_count * FLASH_BYPASS_STALL;
        for stats in [self.icache.get_stats(), self.dcache.get_stats()] {
            cycle_num += stats.hits * CACHE_HIT_STALL + stats.misses * CACHE_MISS_STALL;
        }
        cycle_num
    }

    fn show_cache_stats(&self, name: &str, stats: &CacheStats) {
        colorized_println(&format!("---------- {} ----------", name), BLUE);
        print_filled_with_space("total accesses:", 18);
        println!("{}", stats.total_accesses);
        print_filled_with_space("hits:", 18);
        println!("{}", stats.hits);
        print_filled_with_space("misses:", 18);
        println!("{}", stats.misses);
        print_filled_with_space("evictions:", 18);
        println!("{}", stats.evictions);
        print_filled_with_space("hit rate:", 18);
        println!("{:.5}%", stats.hit_rate() * 100.0);
    }

    fn show_line_stats(&self) {
        println!("---------- line miss stats ----------");
        let mut line_stats: Vec<(&Address, &usize)> = self.line_miss_stats.iter().collect();
        line_stats.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (addr, count) in line_stats {
            print_filled_with_space(&format!("0x{:>08x}", addr), 14);
            println!("{}", count);
        }
    }

    fn show_progress(&self, pb: &ProgressBar, position: usize) {
        pb.set_position(position as u64);
        pb.set_message(format!(
            "icache hit rate: {:.2}% dcache hit rate: {:.2}%",
            self.icache.get_stats().hit_rate() * 100.0,
            self.dcache.get_stats().hit_rate() * 100.0
        ));
    }

    pub fn run(&mut self, props: CoreProps) -> Result<()> {
        let start_time = Instant::now();
        let trace = load_trace_file(&props.trace_file_path)?;
        log::info!(
            "loaded {} accesses from {}",
            trace.len(),
            props.trace_file_path
        );

        self.use_cache = props.use_cache;

        let pb = if props.progress_bar_size > 0 {
            ProgressBar::new(trace.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} \n {msg}",
            )
            .map_err(|e| anyhow!("invalid progress bar template: {}", e))?
            .progress_chars("#>-"),
        );

        let guard = match props.prof_file_path {
            Some(_) => Some(
                pprof::ProfilerGuardBuilder::default()
                    .frequency(10000)
                    .blocklist(&["libc", "libgcc", "pthread", "vdso"])
                    .build()
                    .map_err(|e| anyhow!("failed to start profiler: {}", e))?,
            ),
            None => None,
        };

        for (i, entry) in trace.iter().enumerate() {
            let value = self.load_word(entry.kind, entry.addr);
            self.checksum ^= value;
            if props.verbose >= 1 {
                println!("{:?} 0x{:>08x} -> 0x{:>08x}", entry.kind, entry.addr, value);
            }
            if props.progress_bar_size > 0 && i as u64 % props.progress_bar_size == 0 {
                self.show_progress(&pb, i);
            }
        }
        pb.finish_with_message("End of trace.");

        if let (Some(guard), Some(prof_file_path)) = (guard, &props.prof_file_path) {
            let report = guard
                .report()
                .build()
                .map_err(|e| anyhow!("failed to build profile report: {}", e))?;
            let file = File::create(prof_file_path)
                .with_context(|| format!("failed to create {}", prof_file_path))?;
            report
                .flamegraph(file)
                .map_err(|e| anyhow!("failed to write flamegraph: {}", e))?;
        }

        println!(
            "access count: {}\nelapsed time: {:?}",
            self.access_count,
            start_time.elapsed()
        );
        println!("flash bypass count: {}", self.bypass_count);
        println!("flash line reads: {}", self.flash.get_line_reads());
        println!("predicted cycle count: {}", self.predicted_cycle_count());
        println!("checksum: 0x{:>08x}", self.get_checksum());
        if self.cache_reset_count > 0 {
            colorized_println(
                &format!("cache resets after fatal errors: {}", self.cache_reset_count),
                RED,
            );
        }
        if self.use_cache {
            self.show_cache_stats("icache", &self.get_stats(AccessKind::Instruction));
            self.show_cache_stats("dcache", &self.get_stats(AccessKind::Data));
        }
        if props.show_line_stats {
            self.show_line_stats();
        }
        Ok(())
    }
}

pub struct CoreProps {
    pub trace_file_path: String,
    pub use_cache: bool,
    pub verbose: u32,
    /// Accesses between progress bar redraws, 0 hides the bar
    pub progress_bar_size: u64,
    pub show_line_stats: bool,
    pub prof_file_path: Option<String>,
}
