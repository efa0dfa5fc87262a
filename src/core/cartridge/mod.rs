//! Cartridge hardware: mappers and the flash logic living on the cart.

pub mod mapper;
