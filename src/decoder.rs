use crate::config::*;
use crate::types::*;

pub fn get_offset(addr: Address) -> usize {
    (addr & OFFSET_MASK) as usize
}

pub fn get_set_index(addr: Address) -> SetIndex {
    ((addr >> OFFSET_BITS) & SET_INDEX_MASK) as SetIndex
}

pub fn get_tag(addr: Address) -> Tag {
    // a checked shift keeps a zero-width tag (fully associative geometry) well defined
    addr.checked_shr(OFFSET_BITS + SET_INDEX_BITS).unwrap_or(0)
}

pub fn align_addr(addr: Address) -> Address {
    addr & !OFFSET_MASK
}

pub fn is_cacheable(addr: Address) -> bool {
    (FLASH_START..FLASH_END).contains(&addr)
}

/// Splits an address into `(tag, set, offset)`.
#[allow(dead_code)]
pub fn get_status(addr: Address) -> (Tag, SetIndex, usize) {
    (get_tag(addr), get_set_index(addr), get_offset(addr))
}

/// Base address of the line holding `tag` in `set`.
pub fn line_addr(tag: Tag, set: SetIndex) -> Address {
    let tag_part = tag
        .checked_shl(OFFSET_BITS + SET_INDEX_BITS)
        .unwrap_or(0);
    tag_part | ((set as Address & SET_INDEX_MASK) << OFFSET_BITS)
}
