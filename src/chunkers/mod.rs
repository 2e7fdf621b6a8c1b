//! Sizing and packing of source units into budget-bounded chunks.

mod base;
mod packer;

pub use base::{counter_for, CharCounter, TiktokenCounter, TokenCounter};
pub use packer::ChunkPacker;
