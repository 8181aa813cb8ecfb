//! Persistent storage for the sign in the Pico's internal flash.
//!
//! The storage image lives in RAM as a [`RamEeprom`]; every write is applied there and
//! then written through to the last erase block of flash as one checksummed record (see
//! [`eeprom`](crate::eeprom) for the format). Reads never touch flash after start-up.
//!
//! Flash is typically good for ~100K erase cycles per block, so callers should prefer
//! [`Eeprom::update`], which skips writes that would not change anything.

use defmt::{error, info, warn};
use embassy_rp::Peri;
use embassy_rp::flash::{Blocking, ERASE_SIZE, Flash as EmbassyFlash};
use embassy_rp::peripherals::FLASH;

use crate::eeprom::{Eeprom, RECORD_CAPACITY, RamEeprom};
use crate::{Error, Result};

// Internal flash size for Raspberry Pi Pico 2 (4 MB).
#[cfg(feature = "pico2")]
const INTERNAL_FLASH_SIZE: usize = 4 * 1024 * 1024;

// Internal flash size for Raspberry Pi Pico 1 (2 MB).
#[cfg(not(feature = "pico2"))]
const INTERNAL_FLASH_SIZE: usize = 2 * 1024 * 1024;

#[expect(clippy::cast_possible_truncation, reason = "flash sizes fit in u32")]
const RECORD_OFFSET: u32 = (INTERNAL_FLASH_SIZE - ERASE_SIZE) as u32;

const _: () = assert!(RECORD_CAPACITY <= ERASE_SIZE, "record must fit in one erase block");

/// An [`Eeprom`] backed by the last block of internal flash.
pub struct FlashEeprom {
    flash: EmbassyFlash<'static, FLASH, Blocking, INTERNAL_FLASH_SIZE>,
    image: RamEeprom,
}

impl FlashEeprom {
    /// Take the flash peripheral and load the stored image.
    ///
    /// A missing or damaged record yields an erased image, so every setting falls back
    /// to its default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Flash`] if the flash cannot be read.
    pub fn new(peripheral: Peri<'static, FLASH>) -> Result<Self> {
        let mut flash = EmbassyFlash::new_blocking(peripheral);
        let mut record = [0u8; RECORD_CAPACITY];
        flash
            .blocking_read(RECORD_OFFSET, &mut record)
            .map_err(Error::Flash)?;

        let image = match RamEeprom::decode_record(&record) {
            Ok(Some(image)) => {
                info!("Flash: Loaded storage image");
                image
            }
            Ok(None) => {
                info!("Flash: No storage image, starting erased");
                RamEeprom::new()
            }
            Err(err) => {
                warn!("Flash: Discarding storage image: {}", err);
                RamEeprom::new()
            }
        };
        Ok(Self { flash, image })
    }

    fn flush(&mut self) -> Result<()> {
        let mut record = [0xFFu8; RECORD_CAPACITY];
        let record_len = self.image.encode_record(&mut record).inspect_err(|_| {
            error!("Flash: Storage image does not fit its record");
        })?;
        let record = record.get(..record_len).ok_or(Error::FormatError)?;

        #[expect(clippy::cast_possible_truncation, reason = "erase size fits in u32")]
        let block_end = RECORD_OFFSET + ERASE_SIZE as u32;
        self.flash
            .blocking_erase(RECORD_OFFSET, block_end)
            .map_err(Error::Flash)?;
        self.flash
            .blocking_write(RECORD_OFFSET, record)
            .map_err(Error::Flash)?;
        info!("Flash: Saved {} byte record", record_len);
        Ok(())
    }
}

impl Eeprom for FlashEeprom {
    fn read(&mut self, address: usize, buffer: &mut [u8]) -> Result<()> {
        self.image.read(address, buffer)
    }

    fn write(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
        self.image.write(address, bytes)?;
        self.flush()
    }
}
