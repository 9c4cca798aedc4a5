use crate::cursor::ByteCursor;
use crate::errors::{Error, FormatError};

/// The leading bytes of every binary container
pub const MAGIC: [u8; 4] = *b"RSAV";

/// The fixed size preamble of a binary container
///
/// ```text
/// magic    4 bytes  "RSAV"
/// version  u16 LE
/// flags    u16 LE   (reserved)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    version: u16,
    flags: u16,
}

impl ContainerHeader {
    pub const SIZE: usize = 8;

    /// The only container version this crate reads
    pub const SUPPORTED_VERSION: u16 = 1;

    /// Returns if the data starts with the container magic
    pub fn is_container(data: &[u8]) -> bool {
        data.starts_with(&MAGIC)
    }

    /// Parses the header from the start of a byte slice
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        let mut cursor = ByteCursor::new(data);
        ContainerHeader::read(&mut cursor)
    }

    pub(crate) fn read(cursor: &mut ByteCursor) -> Result<Self, Error> {
        if !ContainerHeader::is_container(cursor.remainder()) {
            return Err(FormatError::UnknownMarker.into());
        }

        cursor.read_bytes(MAGIC.len())?;
        let version = cursor.read_u16()?;
        let flags = cursor.read_u16()?;

        if version != ContainerHeader::SUPPORTED_VERSION {
            return Err(FormatError::ContainerVersion(version).into());
        }

        Ok(ContainerHeader { version, flags })
    }

    /// Container format version
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Reserved flags, currently ignored when decoding
    pub fn flags(&self) -> u16 {
        self.flags
    }
}
