use derive_more::{Display, Error};

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors from the storage and console collaborators.
///
/// Rendering and calibration validation never fail; only persistence and the serial
/// console can.
#[derive(Debug, Display, Error)]
#[non_exhaustive]
pub enum Error {
    /// A storage access fell outside the backing medium.
    #[display("storage index out of bounds")]
    IndexOutOfBounds,

    /// Stored bytes failed their integrity checks.
    #[display("storage corrupted")]
    StorageCorrupted,

    /// A value could not be serialized into its storage block.
    #[display("format error")]
    FormatError,

    /// The flash driver rejected an operation.
    #[cfg(not(feature = "host"))]
    #[display("flash error: {_0:?}")]
    Flash(#[error(not(source))] embassy_rp::flash::Error),

    /// The console transport failed.
    #[display("console error")]
    Console,
}

#[cfg(not(feature = "host"))]
impl defmt::Format for Error {
    fn format(&self, fmt: defmt::Formatter<'_>) {
        match self {
            Self::IndexOutOfBounds => defmt::write!(fmt, "storage index out of bounds"),
            Self::StorageCorrupted => defmt::write!(fmt, "storage corrupted"),
            Self::FormatError => defmt::write!(fmt, "format error"),
            Self::Flash(err) => defmt::write!(fmt, "flash error: {}", err),
            Self::Console => defmt::write!(fmt, "console error"),
        }
    }
}
