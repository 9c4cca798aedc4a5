//! Reading of the binary save container
//!
//! A container is a short header followed by a table of named entries.
//! Each value is prefixed by a one byte [`ValueCode`] and nested arrays and
//! records carry varint element counts. See the crate level documentation
//! for the complete layout.

mod header;
mod reader;

pub use self::header::{ContainerHeader, MAGIC};
pub use self::reader::{BinaryEntry, BinaryReader, ValueCode};
