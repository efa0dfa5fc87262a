//! Flash command sequencer
//!
//! Software drives the flash chip by writing fixed (address, value) pairs to
//! `$5555`/`$2AAA`. The three supported commands share their first two pairs,
//! so every command is tracked on its own and all of them are stepped on each
//! command write.

use log::debug;

use crate::core::memory::{MemoryError, MemoryResult};

/// First command address
pub const FLASH_CMD_ADDR_1: u16 = 0x5555;
/// Second command address
pub const FLASH_CMD_ADDR_2: u16 = 0x2AAA;

/// Value that confirms a pending sector erase
pub const SECTOR_ERASE_CONFIRM: u8 = 0x30;

/// Manufacturer ID returned at `$0000` in software ID mode
pub const FLASH_MANUFACTURER_ID: u8 = 0xBF;
/// Device ID returned at `$0001` in software ID mode
pub const FLASH_DEVICE_ID: u8 = 0xB7;

const SOFTWARE_ID_SEQ: &[(u16, u8)] = &[(0x5555, 0xAA), (0x2AAA, 0x55), (0x5555, 0x90)];

const BYTE_PROGRAM_SEQ: &[(u16, u8)] = &[
    (0x5555, 0xAA),
    (0x2AAA, 0x55),
    (0x5555, 0x80),
    (0x5555, 0xAA),
    (0x2AAA, 0x55),
];

const SECTOR_ERASE_SEQ: &[(u16, u8)] = &[(0x5555, 0xAA), (0x2AAA, 0x55), (0x5555, 0xA0)];

/// Operation armed by a completed command sequence.
///
/// The discriminants are the tags stored in save states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FlashMode {
    #[default]
    None = 0,
    SoftwareId = 1,
    SectorErase = 2,
    ByteProgram = 3,
}

impl FlashMode {
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(FlashMode::None),
            1 => Some(FlashMode::SoftwareId),
            2 => Some(FlashMode::SectorErase),
            3 => Some(FlashMode::ByteProgram),
            _ => None,
        }
    }

    pub fn tag(self) -> u32 {
        self as u32
    }
}

/// One of the three command sequences.
///
/// The discriminant is the index of the command's step counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlashCommand {
    SoftwareId = 0,
    SectorErase = 1,
    ByteProgram = 2,
}

impl FlashCommand {
    /// Order in which the tracks are stepped on each command write.
    const CHECK_ORDER: [FlashCommand; 3] = [
        FlashCommand::ByteProgram,
        FlashCommand::SectorErase,
        FlashCommand::SoftwareId,
    ];

    const ALL: [FlashCommand; 3] = [
        FlashCommand::SoftwareId,
        FlashCommand::SectorErase,
        FlashCommand::ByteProgram,
    ];

    fn sequence(self) -> &'static [(u16, u8)] {
        match self {
            FlashCommand::SoftwareId => SOFTWARE_ID_SEQ,
            FlashCommand::SectorErase => SECTOR_ERASE_SEQ,
            FlashCommand::ByteProgram => BYTE_PROGRAM_SEQ,
        }
    }

    fn mode(self) -> FlashMode {
        match self {
            FlashCommand::SoftwareId => FlashMode::SoftwareId,
            FlashCommand::SectorErase => FlashMode::SectorErase,
            FlashCommand::ByteProgram => FlashMode::ByteProgram,
        }
    }
}

/// Active flash mode plus one step counter per command sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlashSequencer {
    mode: FlashMode,
    steps: [u8; 3],
}

impl FlashSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a sequencer from saved parts, rejecting step counters that
    /// point outside their sequence.
    pub fn from_parts(mode: FlashMode, steps: [u32; 3]) -> MemoryResult<Self> {
        let mut sequencer = Self {
            mode,
            steps: [0; 3],
        };
        for command in FlashCommand::ALL {
            let step = steps[command as usize];
            if step as usize >= command.sequence().len() {
                return Err(MemoryError::InvalidState("flash step out of range"));
            }
            sequencer.steps[command as usize] = step as u8;
        }
        Ok(sequencer)
    }

    #[inline]
    pub fn is_command_address(address: u16) -> bool {
        address == FLASH_CMD_ADDR_1 || address == FLASH_CMD_ADDR_2
    }

    #[inline]
    pub fn mode(&self) -> FlashMode {
        self.mode
    }

    /// Step counters, in `SoftwareId`, `SectorErase`, `ByteProgram` order.
    pub fn steps(&self) -> [u32; 3] {
        self.steps.map(u32::from)
    }

    /// Feeds one command write to every track. Returns the mode armed by
    /// this write, if a sequence completed.
    pub fn process(&mut self, address: u16, value: u8) -> Option<FlashMode> {
        let mut armed = None;

        for command in FlashCommand::CHECK_ORDER {
            if self.advance(command, address, value) {
                self.mode = command.mode();
                armed = Some(self.mode);
                debug!("Entering flash {:?} mode", self.mode);
            }
        }

        armed
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn advance(&mut self, command: FlashCommand, address: u16, value: u8) -> bool {
        let sequence = command.sequence();
        let step = &mut self.steps[command as usize];

        match sequence.get(*step as usize) {
            Some(&(expected_addr, expected_value))
                if address == expected_addr && value == expected_value =>
            {
                *step += 1;
                if *step as usize == sequence.len() {
                    *step = 0;
                    true
                } else {
                    false
                }
            }
            _ => {
                *step = 0;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(sequencer: &mut FlashSequencer, pairs: &[(u16, u8)]) -> Vec<Option<FlashMode>> {
        pairs
            .iter()
            .map(|&(address, value)| sequencer.process(address, value))
            .collect()
    }

    #[test]
    fn test_software_id_sequence() {
        let mut seq = FlashSequencer::new();
        let armed = feed(&mut seq, SOFTWARE_ID_SEQ);
        assert_eq!(armed, vec![None, None, Some(FlashMode::SoftwareId)]);
        assert_eq!(seq.mode(), FlashMode::SoftwareId);
    }

    #[test]
    fn test_sector_erase_sequence() {
        let mut seq = FlashSequencer::new();
        feed(&mut seq, SECTOR_ERASE_SEQ);
        assert_eq!(seq.mode(), FlashMode::SectorErase);
        assert_eq!(seq.steps(), [0, 0, 0]);
    }

    #[test]
    fn test_byte_program_sequence() {
        let mut seq = FlashSequencer::new();
        let armed = feed(&mut seq, BYTE_PROGRAM_SEQ);
        assert_eq!(armed[..4], [None, None, None, None]);
        assert_eq!(armed[4], Some(FlashMode::ByteProgram));
        assert_eq!(seq.mode(), FlashMode::ByteProgram);
        // The last two pairs also restarted the shared prefix of the short sequences.
        assert_eq!(seq.steps(), [2, 2, 0]);
    }

    #[test]
    fn test_tracks_step_in_parallel() {
        let mut seq = FlashSequencer::new();
        feed(&mut seq, &[(0x5555, 0xAA), (0x2AAA, 0x55)]);
        assert_eq!(seq.steps(), [2, 2, 2]);

        seq.process(0x5555, 0x80);
        assert_eq!(seq.steps(), [0, 0, 3]);
        assert_eq!(seq.mode(), FlashMode::None);
    }

    #[test]
    fn test_mismatch_resets_all_tracks() {
        let mut seq = FlashSequencer::new();
        feed(&mut seq, &[(0x5555, 0xAA), (0x2AAA, 0x55)]);

        assert_eq!(seq.process(0x2AAA, 0x90), None);
        assert_eq!(seq.steps(), [0, 0, 0]);
        assert_eq!(seq.mode(), FlashMode::None);

        // Wrong address with the right value
        feed(&mut seq, &[(0x5555, 0xAA)]);
        assert_eq!(seq.process(0x5555, 0x55), None);
        assert_eq!(seq.steps(), [0, 0, 0]);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut seq = FlashSequencer::new();
        feed(&mut seq, BYTE_PROGRAM_SEQ);
        assert_eq!(seq.mode(), FlashMode::ByteProgram);
        seq.reset();
        assert_eq!(seq, FlashSequencer::new());
        assert_eq!(seq.mode(), FlashMode::None);
    }

    #[test]
    fn test_mode_survives_unrelated_command_writes() {
        let mut seq = FlashSequencer::new();
        feed(&mut seq, SOFTWARE_ID_SEQ);
        seq.process(0x2AAA, 0x00);
        assert_eq!(seq.mode(), FlashMode::SoftwareId);
    }

    #[test]
    fn test_from_parts_validation() {
        let seq = FlashSequencer::from_parts(FlashMode::SectorErase, [2, 1, 4]).unwrap();
        assert_eq!(seq.mode(), FlashMode::SectorErase);
        assert_eq!(seq.steps(), [2, 1, 4]);

        assert!(FlashSequencer::from_parts(FlashMode::None, [3, 0, 0]).is_err());
        assert!(FlashSequencer::from_parts(FlashMode::None, [0, 0, 5]).is_err());
    }

    #[test]
    fn test_mode_tags() {
        for mode in [
            FlashMode::None,
            FlashMode::SoftwareId,
            FlashMode::SectorErase,
            FlashMode::ByteProgram,
        ] {
            assert_eq!(FlashMode::from_tag(mode.tag()), Some(mode));
        }
        assert_eq!(FlashMode::from_tag(4), None);
    }
}
