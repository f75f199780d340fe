use std::cell::Cell;
use std::fs::File;
use std::io::Read;
use std::rc::Rc;

use anyhow::{Context, Result};

use crate::config::*;
use crate::types::*;

const ERASED_BYTE: u8 = 0xff;
pub const FLASH_SIZE: usize = (FLASH_END - FLASH_START) as usize;

/// Source of line contents for a cache fill.
///
/// `read_line` is only ever called with a line-aligned address inside the
/// flash window and must fill all of `buffer`. It may block.
pub trait FlashRead {
    fn read_line(&mut self, aligned_addr: Address, buffer: &mut LineData);
}

/// Flash contents mapped at `FLASH_START`. Bytes past the end of the image
/// read as erased flash. Shared between caches through `Rc`.
#[derive(Debug, Clone)]
pub struct FlashImage {
    values: Vec<u8>,
    line_reads: Cell<u64>,
}

impl FlashImage {
    pub fn new(values: Vec<u8>) -> Self {
        FlashImage {
            values,
            line_reads: Cell::new(0),
        }
    }

    /// Image whose every byte is the low byte of its own address.
    pub fn synthetic() -> Self {
        let values = (0..FLASH_SIZE)
            .map(|i| (FLASH_START as usize + i) as u8)
            .collect();
        Self::new(values)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let mut file =
            File::open(path).with_context(|| format!("failed to open flash image {}", path))?;
        let mut values = Vec::new();
        file.read_to_end(&mut values)
            .with_context(|| format!("failed to read flash image {}", path))?;
        if values.len() > FLASH_SIZE {
            log::warn!(
                "flash image {} is {} bytes, only the first {} are mapped",
                path,
                values.len(),
                FLASH_SIZE
            );
            values.truncate(FLASH_SIZE);
        }
        Ok(Self::new(values))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get_line_reads(&self) -> u64 {
        self.line_reads.get()
    }

    /// Direct read that bypasses any cache. Addresses outside the image read
    /// as erased flash.
    pub fn load_ubyte(&self, addr: Address) -> u8 {
        addr.checked_sub(FLASH_START)
            .and_then(|i| self.values.get(i as usize))
            .copied()
            .unwrap_or(ERASED_BYTE)
    }

    pub fn load_word(&self, addr: Address) -> Word {
        let mut load_value: Word = 0;
        for i in 0..4 {
            load_value |= (self.load_ubyte(addr.wrapping_add(i)) as Word) << (8 * i);
        }
        load_value
    }

    fn fetch_line(&self, aligned_addr: Address, buffer: &mut LineData) {
        self.line_reads.set(self.line_reads.get() + 1);
        for (i, value) in buffer.iter_mut().enumerate() {
            *value = self.load_ubyte(aligned_addr + i as Address);
        }
    }
}

impl FlashRead for FlashImage {
    fn read_line(&mut self, aligned_addr: Address, buffer: &mut LineData) {
        self.fetch_line(aligned_addr, buffer);
    }
}

impl FlashRead for Rc<FlashImage> {
    fn read_line(&mut self, aligned_addr: Address, buffer: &mut LineData) {
        self.fetch_line(aligned_addr, buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheController;
    use crate::store::CacheStore;

    #[test]
    fn test_read_line_pads_with_erased_bytes() {
        let mut flash = FlashImage::new(vec![1, 2, 3]);
        let mut buffer = [0; LINE_SIZE];
        flash.read_line(FLASH_START, &mut buffer);
        assert_eq!(&buffer[..4], &[1, 2, 3, ERASED_BYTE]);
        assert!(buffer[3..].iter().all(|&b| b == ERASED_BYTE));
        assert_eq!(flash.get_line_reads(), 1);
    }

    fn temp_image_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("flash-cache-{}-{}.bin", name, std::process::id()))
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn test_from_file_truncates_oversized_image() {
        let path = temp_image_path("oversized");
        let mut values = vec![0x5a; FLASH_SIZE + 16];
        values[FLASH_SIZE - 1] = 0xa5;
        std::fs::write(&path, &values).unwrap();
        let flash = FlashImage::from_file(&path);
        std::fs::remove_file(&path).unwrap();

        let flash = flash.unwrap();
        assert_eq!(flash.len(), FLASH_SIZE);
        assert_eq!(flash.load_ubyte(FLASH_END - 1), 0xa5);
        assert_eq!(flash.load_ubyte(FLASH_END), ERASED_BYTE);
    }

    #[test]
    fn test_from_file_short_image() {
        let path = temp_image_path("short");
        std::fs::write(&path, [0x11u8, 0x22, 0x33]).unwrap();
        let flash = FlashImage::from_file(&path);
        std::fs::remove_file(&path).unwrap();

        let flash = flash.unwrap();
        assert_eq!(flash.len(), 3);
        assert_eq!(flash.load_word(FLASH_START), 0xff33_2211);

        let mut controller = CacheController::new(CacheStore::new(), flash);
        assert_eq!(controller.read_word(FLASH_START), Ok(0xff33_2211));
        assert_eq!(controller.read_word(FLASH_START + 4), Ok(0xffff_ffff));
        assert!(FlashImage::from_file("/nonexistent/flash.bin").is_err());
    }

    #[test]
    fn test_shared_image_counts_reads() {
        let flash = Rc::new(FlashImage::synthetic());
        let mut first = Rc::clone(&flash);
        let mut second = Rc::clone(&flash);
        let mut buffer = [0; LINE_SIZE];
        first.read_line(FLASH_START, &mut buffer);
        second.read_line(FLASH_START + LINE_SIZE as Address, &mut buffer);
        assert_eq!(buffer[0], LINE_SIZE as u8);
        assert_eq!(flash.get_line_reads(), 2);
    }

    #[test]
    fn test_synthetic_image() {
        let flash = FlashImage::synthetic();
        assert_eq!(flash.len(), FLASH_SIZE);
        assert_eq!(flash.load_ubyte(FLASH_START + 0x1234), 0x34);
        assert_eq!(flash.load_word(FLASH_START + 0x10), 0x13121110);
        assert_eq!(flash.load_ubyte(FLASH_START - 1), ERASED_BYTE);
    }
}
