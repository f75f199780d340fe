//! Build-time cache geometry.
//!
//! Only the line size, the associativity, the total capacity and the flash
//! window are chosen here. Everything else is derived, and every mask is
//! built from its own bit count.

use crate::types::Address;

pub const ADDRESS_WIDTH: u32 = Address::BITS;

pub const LINE_SIZE: usize = 64;
pub const WAY_NUM: usize = 4;
pub const CACHE_SIZE: usize = 8 * 1024;

pub const LINE_NUM: usize = CACHE_SIZE / LINE_SIZE;
pub const SET_NUM: usize = LINE_NUM / WAY_NUM;

pub const OFFSET_BITS: u32 = LINE_SIZE.trailing_zeros();
pub const SET_INDEX_BITS: u32 = SET_NUM.trailing_zeros();
pub const TAG_BITS: u32 = ADDRESS_WIDTH - OFFSET_BITS - SET_INDEX_BITS;

pub const OFFSET_MASK: Address = (1 << OFFSET_BITS) - 1;
pub const SET_INDEX_MASK: Address = (1 << SET_INDEX_BITS) - 1;

pub const FLASH_START: Address = 0x0800_0000;
pub const FLASH_END: Address = FLASH_START + 512 * 1024;

const _: () = assert!(LINE_SIZE.is_power_of_two());
const _: () = assert!(SET_NUM.is_power_of_two());
const _: () = assert!(SET_NUM * WAY_NUM * LINE_SIZE == CACHE_SIZE);
const _: () = assert!(1 << SET_INDEX_BITS == SET_NUM);
const _: () = assert!(1 << OFFSET_BITS == LINE_SIZE);
const _: () = assert!(OFFSET_BITS + SET_INDEX_BITS + TAG_BITS == ADDRESS_WIDTH);
// ranks are stored as u8
const _: () = assert!(WAY_NUM >= 1 && WAY_NUM <= u8::MAX as usize);
const _: () = assert!(FLASH_START < FLASH_END);
const _: () = assert!(FLASH_START & OFFSET_MASK == 0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        assert_eq!(SET_NUM, 32);
        assert_eq!(OFFSET_BITS, 6);
        assert_eq!(SET_INDEX_BITS, 5);
        assert_eq!(TAG_BITS, 21);
        assert_eq!(OFFSET_MASK, 0x3f);
        assert_eq!(SET_INDEX_MASK, 0x1f);
    }
}
