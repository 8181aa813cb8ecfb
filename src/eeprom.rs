//! Byte-addressed persistent storage, and the checksummed record that carries it in flash.
//!
//! The sign keeps a tiny EEPROM-style image: a handful of bytes at fixed addresses (see
//! [`calibration`](crate::calibration) for the layout). [`Eeprom`] is the seam between the
//! storage users and the medium. [`RamEeprom`] is the in-memory image; on the device,
//! `FlashEeprom` wraps one and writes it through to a flash block as a record.
//!
//! # Record format
//!
//! | bytes            | content                                  |
//! |------------------|------------------------------------------|
//! | 0..4             | magic `"SIGN"` (little-endian `u32`)     |
//! | 4..6             | payload length (little-endian `u16`)     |
//! | 6..6+len         | `postcard`-serialized [`RamEeprom`]      |
//! | 6+len..10+len    | CRC-32 of everything before it           |
//!
//! An erased or foreign record decodes as `None`; a damaged one is an error.
//!
//! # Example
//!
//! ```rust
//! use sign_glow::eeprom::{Eeprom, RamEeprom, RECORD_CAPACITY};
//!
//! let mut eeprom = RamEeprom::new();
//! eeprom.write(3, &[1, 2])?;
//! assert!(!eeprom.update(3, &[1, 2])?); // unchanged: nothing written
//!
//! let mut record = [0xFF; RECORD_CAPACITY];
//! eeprom.encode_record(&mut record)?;
//! let restored = RamEeprom::decode_record(&record)?.expect("record present");
//! assert_eq!(restored, eeprom);
//! # Ok::<(), sign_glow::Error>(())
//! ```

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of bytes in the persistent image.
pub const EEPROM_SIZE: usize = 16;

/// Value of a byte that has never been written.
pub const ERASED_BYTE: u8 = 0xFF;

const MAGIC: u32 = 0x4E47_4953; // 'SIGN'
const HEADER_SIZE: usize = 4 + 2; // Magic + PayloadLen
const CRC_SIZE: usize = 4;
// postcard writes each byte of a fixed array as itself; one spare byte per entry
// leaves room for a future varint field.
const MAX_PAYLOAD_SIZE: usize = EEPROM_SIZE * 2;

/// Bytes needed to hold an encoded record.
pub const RECORD_CAPACITY: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE + CRC_SIZE;

/// Byte-addressed persistent storage.
pub trait Eeprom {
    /// Fill `buffer` with the bytes starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] when the range runs past the end of storage,
    /// or the medium's own error.
    fn read(&mut self, address: usize, buffer: &mut [u8]) -> Result<()>;

    /// Store `bytes` starting at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] when the range runs past the end of storage,
    /// or the medium's own error.
    fn write(&mut self, address: usize, bytes: &[u8]) -> Result<()>;

    /// Store `bytes` only if they differ from what is already there, sparing the medium a
    /// write cycle. Returns `true` when a write happened.
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read) and [`write`](Self::write).
    fn update(&mut self, address: usize, bytes: &[u8]) -> Result<bool> {
        let mut current = [0u8; EEPROM_SIZE];
        let current = current
            .get_mut(..bytes.len())
            .ok_or(Error::IndexOutOfBounds)?;
        self.read(address, current)?;
        if current == bytes {
            return Ok(false);
        }
        self.write(address, bytes)?;
        Ok(true)
    }
}

/// The in-memory storage image. Starts out erased (every byte [`ERASED_BYTE`]).
///
/// Two images compare equal when their bytes match, whatever their write counts.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RamEeprom {
    bytes: [u8; EEPROM_SIZE],
    #[serde(skip)]
    write_count: usize,
}

impl RamEeprom {
    /// An erased image.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [ERASED_BYTE; EEPROM_SIZE],
            write_count: 0,
        }
    }

    /// The raw image.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; EEPROM_SIZE] {
        &self.bytes
    }

    /// Number of [`write`](Eeprom::write) calls that reached this image.
    #[must_use]
    pub const fn write_count(&self) -> usize {
        self.write_count
    }

    /// Serialize this image as a checksummed record into the front of `buffer`. Returns
    /// the number of bytes used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] if `buffer` is shorter than [`RECORD_CAPACITY`].
    pub fn encode_record(&self, buffer: &mut [u8]) -> Result<usize> {
        let buffer = buffer
            .get_mut(..RECORD_CAPACITY)
            .ok_or(Error::FormatError)?;
        let (header, rest) = buffer.split_at_mut(HEADER_SIZE);
        let payload = rest.get_mut(..MAX_PAYLOAD_SIZE).ok_or(Error::FormatError)?;
        let payload_len = postcard::to_slice(self, payload)
            .map_err(|_| Error::FormatError)?
            .len();
        let (magic, length) = header.split_at_mut(4);
        magic.copy_from_slice(&MAGIC.to_le_bytes());
        length.copy_from_slice(
            &u16::try_from(payload_len)
                .map_err(|_| Error::FormatError)?
                .to_le_bytes(),
        );

        let crc_offset = HEADER_SIZE + payload_len;
        let crc = compute_crc(buffer.get(..crc_offset).ok_or(Error::FormatError)?);
        buffer
            .get_mut(crc_offset..crc_offset + CRC_SIZE)
            .ok_or(Error::FormatError)?
            .copy_from_slice(&crc.to_le_bytes());
        Ok(crc_offset + CRC_SIZE)
    }

    /// Parse a record written by [`encode_record`](Self::encode_record).
    ///
    /// Returns `Ok(None)` when `buffer` holds no record (erased flash, or another
    /// program's data).
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageCorrupted`] when the magic matches but the length, CRC, or
    /// payload is damaged.
    pub fn decode_record(buffer: &[u8]) -> Result<Option<Self>> {
        let Some(magic) = read_u32(buffer, 0) else {
            return Ok(None);
        };
        if magic != MAGIC {
            return Ok(None);
        }
        let payload_len = buffer
            .get(4..HEADER_SIZE)
            .and_then(|bytes| bytes.try_into().ok())
            .map(u16::from_le_bytes)
            .ok_or(Error::StorageCorrupted)?;
        let payload_len = usize::from(payload_len);
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(Error::StorageCorrupted);
        }

        let crc_offset = HEADER_SIZE + payload_len;
        let stored_crc = read_u32(buffer, crc_offset).ok_or(Error::StorageCorrupted)?;
        let covered = buffer.get(..crc_offset).ok_or(Error::StorageCorrupted)?;
        if stored_crc != compute_crc(covered) {
            return Err(Error::StorageCorrupted);
        }

        let payload = covered.get(HEADER_SIZE..).ok_or(Error::StorageCorrupted)?;
        postcard::from_bytes(payload)
            .map(Some)
            .map_err(|_| Error::StorageCorrupted)
    }

    fn range(address: usize, len: usize) -> Result<core::ops::Range<usize>> {
        let end = address.checked_add(len).ok_or(Error::IndexOutOfBounds)?;
        if end > EEPROM_SIZE {
            return Err(Error::IndexOutOfBounds);
        }
        Ok(address..end)
    }
}

impl PartialEq for RamEeprom {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for RamEeprom {}

impl Default for RamEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl Eeprom for RamEeprom {
    fn read(&mut self, address: usize, buffer: &mut [u8]) -> Result<()> {
        let stored = self
            .bytes
            .get(Self::range(address, buffer.len())?)
            .ok_or(Error::IndexOutOfBounds)?;
        buffer.copy_from_slice(stored);
        Ok(())
    }

    fn write(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
        let stored = self
            .bytes
            .get_mut(Self::range(address, bytes.len())?)
            .ok_or(Error::IndexOutOfBounds)?;
        stored.copy_from_slice(bytes);
        self.write_count = self.write_count.saturating_add(1);
        Ok(())
    }
}

fn read_u32(buffer: &[u8], offset: usize) -> Option<u32> {
    let bytes = buffer.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

/// Compute CRC32 checksum.
fn compute_crc(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
