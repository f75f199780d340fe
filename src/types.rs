use crate::config::LINE_SIZE;

pub type Address = u32;
pub type Tag = u32;
pub type SetIndex = usize;
pub type WayIndex = usize;
pub type Rank = u8;
pub type LineData = [u8; LINE_SIZE];
pub type Word = u32;
