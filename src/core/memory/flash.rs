//! Armazenamento flash de 512KB.
//! É ao mesmo tempo a imagem do programa e a área regravável de saves.

use log::trace;

use super::{FLASH_SIZE, SECTOR_SIZE};

/// Flash store backing every cartridge window.
///
/// Offsets are plain byte indices into the 512KB image; callers do their own
/// window arithmetic and the store only enforces bounds.
#[derive(Clone, PartialEq, Eq)]
pub struct FlashStore {
    data: Box<[u8]>,
}

impl FlashStore {
    /// Seeds a store from a ROM image. Anything past the end of the image
    /// reads as erased flash (0xFF); anything past 512KB is dropped.
    pub fn from_rom(rom: &[u8]) -> Self {
        let mut store = Self {
            data: vec![0xFF; FLASH_SIZE].into_boxed_slice(),
        };
        store.reseed(rom);
        store
    }

    /// Restores the store to the contents of `rom`, padding with 0xFF.
    pub fn reseed(&mut self, rom: &[u8]) {
        let copy_size = rom.len().min(FLASH_SIZE);
        self.data[..copy_size].copy_from_slice(&rom[..copy_size]);
        self.data[copy_size..].fill(0xFF);
    }

    #[inline]
    pub fn read(&self, offset: usize) -> u8 {
        self.data[offset]
    }

    /// Stores one byte. Returns false when the offset is outside the store.
    pub fn program(&mut self, offset: u32, value: u8) -> bool {
        match self.data.get_mut(offset as usize) {
            Some(byte) => {
                *byte = value;
                true
            }
            None => {
                trace!("Flash program out of range: {:#X}", offset);
                false
            }
        }
    }

    /// Fills the sector starting at `base` with 0xFF. `base` must already be
    /// sector-aligned; sectors that do not fit in the store are ignored.
    pub fn erase_sector(&mut self, base: u32) -> bool {
        let in_range = base
            .checked_add(SECTOR_SIZE as u32)
            .map_or(false, |end| end as usize <= FLASH_SIZE);
        if !in_range {
            trace!("Flash erase out of range: {:#X}", base);
            return false;
        }

        let base = base as usize;
        self.data[base..base + SECTOR_SIZE].fill(0xFF);
        true
    }

    /// Slice starting at `offset` and `len` bytes long, if it fits.
    pub fn window(&self, offset: usize, len: usize) -> Option<&[u8]> {
        self.data.get(offset..offset.checked_add(len)?)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Replaces the whole image. `image` must be exactly 512KB.
    pub fn replace(&mut self, image: &[u8]) {
        self.data.copy_from_slice(image);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl std::fmt::Debug for FlashStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashStore").field("len", &self.data.len()).finish()
    }
}
