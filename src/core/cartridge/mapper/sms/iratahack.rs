// iratahack-rs/src/core/cartridge/mapper/sms/iratahack.rs

//! Iratahack 512KB flash multicart
//!
//! Four 128KB game slots selected through `$FFFE`. Inside the current slot,
//! `$0000-$3FFF` and `$4000-$7FFF` are fixed to the first two 16KB banks and
//! `$8000-$BFFF` is switched among eight banks through `$FFFF`. The whole
//! image lives on an SST-style flash chip, so games save by erasing and
//! programming it through the command sequences in [`super::flash_cmd`].

use std::io::{Read, Write};
use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use log::{debug, info, warn};

use super::flash_cmd::{
    FlashMode, FlashSequencer, FLASH_DEVICE_ID, FLASH_MANUFACTURER_ID, SECTOR_ERASE_CONFIRM,
};
use crate::core::cartridge::mapper::{Mapper, MapperType};
use crate::core::memory::{
    FlashStore, MemoryError, MemoryResult, RomImage, SystemRam, FLASH_SIZE, GAME_SLOT_SIZE,
    RAM_MIRROR_START, RAM_START, REG_BANK_SLOT2, REG_GAME_SLOT, SECTOR_SIZE, WINDOW_SIZE,
};

const WINDOW_COUNT: usize = 3;

/// Highest valid window base; a full window must still fit in the flash.
const MAX_SLOT_ADDRESS: u32 = (FLASH_SIZE - WINDOW_SIZE) as u32;

/// Register block written after the flash image in save states.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct MapperRegisters {
    mapper_slot: [u32; WINDOW_COUNT],
    mapper_slot_address: [u32; WINDOW_COUNT],
    game_slot: u32,
    flash_mode: u32,
    flash_step: [u32; 3],
}

/// Iratahack multicart mapper.
///
/// `R` is the console RAM every access at or above `$C000` is forwarded to.
pub struct IratahackMapper<R: SystemRam> {
    rom: Box<[u8]>,
    flash: FlashStore,
    ram: R,
    game_slot: u8,
    mapper_slot: [u8; WINDOW_COUNT],
    mapper_slot_address: [u32; WINDOW_COUNT],
    sequencer: FlashSequencer,
}

impl<R: SystemRam> IratahackMapper<R> {
    /// Builds the mapper and seeds the flash with `rom`. Only the first 512KB
    /// of the image are kept; they are reused on every reset.
    pub fn new<I: RomImage + ?Sized>(rom: &I, ram: R) -> Self {
        let image = rom.rom();
        let keep = rom.rom_size().min(image.len()).min(FLASH_SIZE);
        let rom: Box<[u8]> = image[..keep].into();

        Self {
            flash: FlashStore::from_rom(&rom),
            rom,
            ram,
            game_slot: 0,
            mapper_slot: [0, 1, 0],
            mapper_slot_address: [0x0000, 0x4000, 0x0000],
            sequencer: FlashSequencer::new(),
        }
    }

    pub fn game_slot(&self) -> u8 {
        self.game_slot
    }

    pub fn flash_mode(&self) -> FlashMode {
        self.sequencer.mode()
    }

    /// Flash offset currently backing window `index`.
    pub fn slot_address(&self, index: usize) -> Option<u32> {
        self.mapper_slot_address.get(index).copied()
    }

    pub fn ram(&self) -> &R {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut R {
        &mut self.ram
    }

    /// Mutable access to the flash image, for hosts that patch saves in place.
    pub fn ram_banks_mut(&mut self) -> &mut [u8] {
        self.flash.as_mut_slice()
    }

    /// Translates a cartridge address into (window, flash offset). Addresses
    /// from `$C000` up belong to the console RAM and are not translated.
    pub fn translate(&self, address: u16) -> Option<(usize, u32)> {
        let window = match address {
            0x0000..=0x3FFF => 0,
            0x4000..=0x7FFF => 1,
            0x8000..=0xBFFF => 2,
            _ => return None,
        };
        let offset = u32::from(address & 0x3FFF) + self.mapper_slot_address[window];
        Some((window, offset))
    }

    fn reset_registers(&mut self) {
        self.game_slot = 0;
        self.mapper_slot = [0, 1, 0];
        self.mapper_slot_address = [0x0000, 0x4000, 0x0000];
        self.sequencer.reset();
    }

    fn update_slot_addresses(&mut self) {
        let base = u32::from(self.game_slot) * GAME_SLOT_SIZE as u32;
        self.mapper_slot_address[0] = base;
        self.mapper_slot_address[1] = base + WINDOW_SIZE as u32;
        self.mapper_slot_address[2] = base + u32::from(self.mapper_slot[2]) * WINDOW_SIZE as u32;
    }

    fn write_rom_area(&mut self, address: u16, value: u8) {
        match self.sequencer.mode() {
            FlashMode::SoftwareId => {
                debug!("Exiting flash ID mode");
                self.sequencer.reset();
            }
            FlashMode::SectorErase => {
                if value == SECTOR_ERASE_CONFIRM {
                    // Erase always targets the window 2 bank, whatever window was written.
                    let sector_base = self.mapper_slot_address[2]
                        .wrapping_add(u32::from(address))
                        .wrapping_sub(0x8000)
                        & !(SECTOR_SIZE as u32 - 1);
                    debug!("Erasing flash sector {:#07X}", sector_base);
                    self.flash.erase_sector(sector_base);
                }
                self.sequencer.reset();
            }
            FlashMode::ByteProgram => {
                if let Some((_, offset)) = self.translate(address) {
                    self.flash.program(offset, value);
                }
                self.sequencer.reset();
            }
            // Sequencer untouched: a stray ROM write does not cancel a command in progress.
            FlashMode::None => {
                debug!("--> ** Attempting to write on ROM address ${:X} {:X}", address, value);
            }
        }
    }

    fn write_ram_area(&mut self, address: u16, value: u8) {
        self.ram.load(address, value);

        if address < RAM_MIRROR_START {
            self.ram.load(address + 0x2000, value);
            return;
        }

        self.ram.load(address - 0x2000, value);

        match address {
            REG_GAME_SLOT => {
                self.game_slot = value & 3;
                self.update_slot_addresses();
            }
            REG_BANK_SLOT2 => {
                self.mapper_slot[2] = value & 7;
                self.update_slot_addresses();
            }
            _ => {}
        }
    }

    fn registers(&self) -> MapperRegisters {
        MapperRegisters {
            mapper_slot: self.mapper_slot.map(u32::from),
            mapper_slot_address: self.mapper_slot_address,
            game_slot: u32::from(self.game_slot),
            flash_mode: self.sequencer.mode().tag(),
            flash_step: self.sequencer.steps(),
        }
    }

    fn apply_registers(&mut self, regs: &MapperRegisters) -> MemoryResult<()> {
        if regs.game_slot > 3 {
            return Err(MemoryError::InvalidState("game slot out of range"));
        }
        if regs.mapper_slot.iter().any(|&bank| bank > 7) {
            return Err(MemoryError::InvalidState("bank out of range"));
        }
        if regs.mapper_slot_address.iter().any(|&addr| addr > MAX_SLOT_ADDRESS) {
            return Err(MemoryError::InvalidState("slot address out of range"));
        }
        let mode = FlashMode::from_tag(regs.flash_mode)
            .ok_or(MemoryError::InvalidState("unknown flash mode"))?;
        let sequencer = FlashSequencer::from_parts(mode, regs.flash_step)?;

        self.mapper_slot = regs.mapper_slot.map(|bank| bank as u8);
        self.mapper_slot_address = regs.mapper_slot_address;
        self.game_slot = regs.game_slot as u8;
        self.sequencer = sequencer;
        Ok(())
    }
}

impl<R: SystemRam> Mapper for IratahackMapper<R> {
    fn mapper_type(&self) -> MapperType {
        MapperType::Iratahack
    }

    fn read(&self, address: u16) -> u8 {
        if address < 0x4000 && self.sequencer.mode() == FlashMode::SoftwareId {
            return match address {
                0x0000 => FLASH_MANUFACTURER_ID,
                0x0001 => FLASH_DEVICE_ID,
                _ => 0xFF,
            };
        }

        match self.translate(address) {
            Some((_, offset)) => self.flash.read(offset as usize),
            // RAM + RAM mirror
            None => self.ram.retrieve(address),
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        if FlashSequencer::is_command_address(address) {
            self.sequencer.process(address, value);
        } else if address < RAM_START {
            self.write_rom_area(address, value);
        } else {
            self.write_ram_area(address, value);
        }
    }

    fn reset(&mut self) {
        self.reset_registers();
        self.flash.reseed(&self.rom);
    }

    fn save_ram(&self, writer: &mut dyn Write) -> MemoryResult<()> {
        debug!("{} save RAM...", self.mapper_type());
        writer.write_all(self.flash.as_slice())?;
        info!("{} save RAM done", self.mapper_type());
        Ok(())
    }

    fn load_ram(&mut self, reader: &mut dyn Read, size: usize) -> MemoryResult<()> {
        debug!("{} load RAM...", self.mapper_type());

        if size == 0 {
            debug!("{} load RAM: no save data", self.mapper_type());
            return Ok(());
        }

        if size != FLASH_SIZE {
            warn!(
                "{} incorrect size. Expected: {} Found: {}",
                self.mapper_type(),
                FLASH_SIZE,
                size
            );
            return Err(MemoryError::RamSizeMismatch {
                expected: FLASH_SIZE,
                found: size,
            });
        }

        let mut image = vec![0u8; FLASH_SIZE];
        reader.read_exact(&mut image)?;
        self.flash.replace(&image);

        info!("{} load RAM done", self.mapper_type());
        Ok(())
    }

    fn persisted_ram(&self) -> bool {
        true
    }

    fn ram_size(&self) -> usize {
        FLASH_SIZE
    }

    fn ram_banks(&self) -> Option<&[u8]> {
        Some(self.flash.as_slice())
    }

    fn page(&self, index: usize) -> Option<&[u8]> {
        let offset = *self.mapper_slot_address.get(index)?;
        self.flash.window(offset as usize, WINDOW_SIZE)
    }

    fn bank(&self, index: usize) -> Option<u8> {
        self.mapper_slot.get(index).copied()
    }

    fn save_state(&self, writer: &mut dyn Write) -> MemoryResult<()> {
        writer.write_all(self.flash.as_slice())?;
        writer.write_all(bytemuck::bytes_of(&self.registers()))?;
        Ok(())
    }

    fn load_state(&mut self, reader: &mut dyn Read) -> MemoryResult<()> {
        let mut image = vec![0u8; FLASH_SIZE];
        reader.read_exact(&mut image)?;

        let mut raw = [0u8; size_of::<MapperRegisters>()];
        reader.read_exact(&mut raw)?;
        let regs: MapperRegisters = bytemuck::pod_read_unaligned(&raw);

        self.apply_registers(&regs)?;
        self.flash.replace(&image);

        info!(
            "{} state loaded: game slot {}, bank {}, mode {:?}",
            self.mapper_type(),
            self.game_slot,
            self.mapper_slot[2],
            self.sequencer.mode()
        );
        Ok(())
    }
}
