// Ponto de entrada da biblioteca.
// Expõe o mapper Iratahack (multicart flash de 512KB para Master System)
// e os colaboradores de memória de que ele depende.

// Módulos principais do projeto.
pub mod core;

// Re-exportações para facilitar o uso.
pub use crate::core::cartridge::mapper::sms::{FlashMode, IratahackMapper};
pub use crate::core::cartridge::mapper::{Mapper, MapperType};
pub use crate::core::memory::{Cartridge, MemoryError, MemoryResult, RomImage, SystemRam, WorkRam};

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
