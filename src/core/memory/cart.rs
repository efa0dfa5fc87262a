//! Estruturas e funções para carregamento da imagem de ROM.
//! A imagem só é usada para semear (e ressemear no reset) a flash do mapper.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::info;

use super::{MemoryError, MemoryResult, FLASH_SIZE};

/// Source of the cartridge program image.
pub trait RomImage {
    /// Full ROM contents.
    fn rom(&self) -> &[u8];

    /// ROM size in bytes.
    fn rom_size(&self) -> usize {
        self.rom().len()
    }
}

impl RomImage for [u8] {
    fn rom(&self) -> &[u8] {
        self
    }
}

impl RomImage for Vec<u8> {
    fn rom(&self) -> &[u8] {
        self
    }
}

/// Estrutura principal do cartucho
#[derive(Debug, Clone, Default)]
pub struct Cartridge {
    pub rom: Vec<u8>,
}

impl Cartridge {
    /// Cria um novo cartucho vazio
    pub fn new() -> Self {
        Self { rom: Vec::new() }
    }

    /// Carrega uma ROM do arquivo
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> MemoryResult<()> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;

        self.load_from_buffer(&buffer)
    }

    /// Carrega uma ROM de um buffer
    pub fn load_from_buffer(&mut self, buffer: &[u8]) -> MemoryResult<()> {
        if buffer.is_empty() {
            return Err(MemoryError::InvalidCartridge);
        }

        self.rom = buffer.to_vec();

        if self.rom.len() > FLASH_SIZE {
            info!(
                "ROM larger than flash ({} bytes), only the first {} bytes are mapped",
                self.rom.len(),
                FLASH_SIZE
            );
        } else {
            info!("Cartucho carregado: {} bytes", self.rom.len());
        }

        Ok(())
    }
}

impl RomImage for Cartridge {
    fn rom(&self) -> &[u8] {
        &self.rom
    }
}
