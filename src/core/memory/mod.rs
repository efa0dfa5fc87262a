//! Sistema de memória do cartucho Iratahack.
//! Reúne o armazenamento flash de 512KB, a RAM do console (colaborador externo)
//! e a imagem de ROM usada para semear a flash.

pub mod cart;
pub mod flash;
pub mod ram;

// Re-exportações para facilitar o uso
pub use cart::{Cartridge, RomImage};
pub use flash::FlashStore;
pub use ram::{SystemRam, WorkRam};

use thiserror::Error;

/// Tamanho total da flash (512KB)
pub const FLASH_SIZE: usize = 0x80000;

/// Granularidade de apagamento de setor (16KB)
pub const SECTOR_SIZE: usize = 0x4000;

/// Tamanho de cada janela visível pela CPU (16KB)
pub const WINDOW_SIZE: usize = 0x4000;

/// Tamanho de cada "game slot" (128KB)
pub const GAME_SLOT_SIZE: usize = 0x20000;

/// Primeiro endereço atendido pela RAM do console
pub const RAM_START: u16 = 0xC000;

/// Início do espelho da RAM
pub const RAM_MIRROR_START: u16 = 0xE000;

/// Registrador de seleção de game slot
pub const REG_GAME_SLOT: u16 = 0xFFFE;

/// Registrador de banco da janela 2
pub const REG_BANK_SLOT2: u16 = 0xFFFF;

/// Erros do sistema de memória
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("incorrect save RAM size: expected {expected:#x} bytes, found {found:#x}")]
    RamSizeMismatch { expected: usize, found: usize },
    #[error("invalid mapper state: {0}")]
    InvalidState(&'static str),
    #[error("invalid cartridge: empty ROM image")]
    InvalidCartridge,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Tipo de resultado para operações de memória
pub type MemoryResult<T> = Result<T, MemoryError>;
