//! Reading of text saves
//!
//! When saving in plain text mode the game writes a JSON document whose
//! primitive wrappers are malformed (`"__type" : "int"5`). These are
//! repaired before the document is parsed into the same entry table the
//! binary container produces.

mod reader;
mod repair;

pub use self::reader::read_entries;
pub use self::repair::repair_primitive_wrappers;
