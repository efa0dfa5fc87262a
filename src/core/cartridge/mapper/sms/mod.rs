//! Mapeadores de cartucho para Master System
//!
//! Só o multicart flash Iratahack é implementado aqui.

mod flash_cmd;
mod iratahack;

pub use self::flash_cmd::{
    FlashMode, FlashSequencer, FLASH_CMD_ADDR_1, FLASH_CMD_ADDR_2, FLASH_DEVICE_ID,
    FLASH_MANUFACTURER_ID, SECTOR_ERASE_CONFIRM,
};
pub use self::iratahack::IratahackMapper;
