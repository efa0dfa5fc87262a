//! RAM do console ($C000-$FFFF).
//! O mapper apenas encaminha os acessos; o espelhamento é responsabilidade dele.

use super::RAM_START;

/// Console RAM as seen by the cartridge mapper.
///
/// Every access at or above `$C000` is forwarded here, mirror writes
/// included.
pub trait SystemRam {
    /// Reads the byte stored at `address`.
    fn retrieve(&self, address: u16) -> u8;

    /// Stores `value` at `address`.
    fn load(&mut self, address: u16, value: u8);
}

impl<R: SystemRam + ?Sized> SystemRam for &mut R {
    fn retrieve(&self, address: u16) -> u8 {
        (**self).retrieve(address)
    }

    fn load(&mut self, address: u16, value: u8) {
        (**self).load(address, value)
    }
}

impl<R: SystemRam + ?Sized> SystemRam for Box<R> {
    fn retrieve(&self, address: u16) -> u8 {
        (**self).retrieve(address)
    }

    fn load(&mut self, address: u16, value: u8) {
        (**self).load(address, value)
    }
}

/// Plain 16KB backing for `$C000-$FFFF`.
///
/// The two 8KB halves are physically distinct cells, so the `$C000`/`$E000`
/// mirror only shows up when the mapper writes both copies.
#[derive(Clone)]
pub struct WorkRam {
    data: Box<[u8; 0x4000]>,
}

impl WorkRam {
    pub fn new() -> Self {
        Self {
            data: Box::new([0; 0x4000]),
        }
    }

    #[inline]
    fn index(address: u16) -> usize {
        (address.wrapping_sub(RAM_START) & 0x3FFF) as usize
    }
}

impl Default for WorkRam {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemRam for WorkRam {
    fn retrieve(&self, address: u16) -> u8 {
        self.data[Self::index(address)]
    }

    fn load(&mut self, address: u16, value: u8) {
        self.data[Self::index(address)] = value;
    }
}
