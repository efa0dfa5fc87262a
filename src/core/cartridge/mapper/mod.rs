// iratahack-rs/src/core/cartridge/mapper/mod.rs

//! Cartridge mapper module
//!
//! The bus dispatcher talks to the cartridge through [`Mapper`]; the only
//! board implemented here is the Iratahack flash multicart.

pub mod sms;

use std::io::{Read, Write};

use crate::core::memory::MemoryResult;

pub use sms::IratahackMapper;

/// Mapper type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperType {
    /// Iratahack 512KB flash multicart (4 game slots, SST-style flash)
    Iratahack,
}

impl std::fmt::Display for MapperType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapperType::Iratahack => write!(f, "Iratahack"),
        }
    }
}

/// Trait for cartridge mappers, as seen by the bus dispatcher.
pub trait Mapper {
    /// Get mapper type
    fn mapper_type(&self) -> MapperType;

    /// CPU read anywhere in `$0000-$FFFF`
    fn read(&self, address: u16) -> u8;

    /// CPU write anywhere in `$0000-$FFFF`
    fn write(&mut self, address: u16, value: u8);

    /// Return to power-on state
    fn reset(&mut self);

    /// Write the battery-backed RAM image to `writer`
    fn save_ram(&self, writer: &mut dyn Write) -> MemoryResult<()>;

    /// Replace the battery-backed RAM with `size` bytes from `reader`.
    /// A size of zero means there is no save data; it is not an error.
    fn load_ram(&mut self, reader: &mut dyn Read, size: usize) -> MemoryResult<()>;

    /// Whether the cartridge RAM survives power-off
    fn persisted_ram(&self) -> bool {
        false
    }

    /// Get cartridge RAM size
    fn ram_size(&self) -> usize {
        0
    }

    /// Raw cartridge RAM, if any
    fn ram_banks(&self) -> Option<&[u8]> {
        None
    }

    /// Memory currently visible through CPU window `index`
    fn page(&self, index: usize) -> Option<&[u8]>;

    /// Bank number currently selected for CPU window `index`
    fn bank(&self, index: usize) -> Option<u8>;

    /// Save mapper state
    fn save_state(&self, writer: &mut dyn Write) -> MemoryResult<()>;

    /// Load mapper state
    fn load_state(&mut self, reader: &mut dyn Read) -> MemoryResult<()>;
}
