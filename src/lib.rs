/*!

A decoder for the save archives of a raid shooter. It turns a `.sav` file
into a strongly typed [`Archive`] and renders that as JSON for presentation
layers that should never have to look at raw bytes.

## Features

- ✔ Versatile: Reads both the binary container and the plain text saves
- ✔ Total: Missing or malformed fields default and are reported, never fatal
- ✔ Safe: Truncated or hostile input is an error, not a panic
- ✔ Small: A handful of well known dependencies

## Quick Start

```rust
use raidsave::Archive;

let data = br#"{
    "CreatedWithVersion": {"__type": "VersionData", "value": {
        "mainVersion": 0, "subVersion": 9, "buildVersion": 4, "suffix": ""
    }},
    "Level": {"__type" : "int"12},
    "Count/Kills/Cname_Wolf": {"__type" : "int"3}
}"#;

let archive = Archive::from_slice(&data[..])?;
assert_eq!(archive.version, "0.9.4");
assert_eq!(archive.level, 12);
assert_eq!(archive.kills[0].master_name, "Cname_Wolf");

let json = archive.json().to_string();
assert!(json.starts_with(r#"{"version":"0.9.4","level":12"#));
# Ok::<(), raidsave::Error>(())
```

## Formats

The binary container starts with the magic `RSAV`, a little endian `u16`
container version (only `1` is understood), a `u16` of flags and a varint
count of top level entries. Each entry is a length prefixed UTF-8 key
followed by a value: a one byte value code and its payload. Records carry a
type tag string and a varint count of named fields.

The text save is the JSON document the game writes in plain text mode,
including its malformed primitive wrappers (`"__type" : "int"5`).

Both renditions read into the same [`EntryTable`], which is then given its
typed shape. Fields that had to be defaulted along the way are available
from [`ArchiveDecoder::decode`]:

```rust
use raidsave::ArchiveDecoder;

let data = br#"{"CreatedWithVersion": "1.0.0", "GameClock": {"days": "three"}}"#;
let decoded = ArchiveDecoder::new().decode(&data[..])?;
assert_eq!(decoded.archive().game_clock.days, 0);
assert!(decoded.skipped().iter().any(|x| x.path() == "GameClock.days"));
# Ok::<(), raidsave::Error>(())
```

## Item Variables

Item variables keep their payload encoded as stored. The payload is hex or
base64 and is interpreted by the variable's data type:

```rust
use raidsave::{decode_typed_value, TypedValue};

assert_eq!(decode_typed_value(1, "0000803F"), TypedValue::Float(1.0));
assert_eq!(decode_typed_value(3, "01"), TypedValue::Bool(true));
assert_eq!(decode_typed_value(1, "not a payload!"), TypedValue::Str(String::from("not a payload!")));
```

*/

pub mod binary;
mod container;
mod cursor;
mod decode;
mod errors;
mod graph;
pub mod json;
pub mod model;
mod node;
pub mod text;
pub(crate) mod util;
mod value;

pub use self::container::{EntryTable, SaveFormat};
pub use self::cursor::{ByteCursor, CursorError, CursorErrorKind};
pub use self::decode::{ArchiveDecoder, DecodeOptions, Decoded};
pub use self::errors::*;
pub use self::graph::{normalize_type_name, FromNode, GraphDecoder, RecordTag, Section};
pub use self::model::Archive;
pub use self::node::{Node, Record};
pub use self::value::{
    decode_bytes, decode_payload, decode_typed_value, PayloadEncoding, TypedValue, VariableType,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_public_types_are_send_sync() {
        assert_send_sync::<Archive>();
        assert_send_sync::<Error>();
        assert_send_sync::<EntryTable>();
        assert_send_sync::<ArchiveDecoder>();
        assert_send_sync::<Decoded>();
        assert_send_sync::<GraphDecoder>();
        assert_send_sync::<Section>();
        assert_send_sync::<model::CustomFaceSettingData>();
        assert_send_sync::<ByteCursor<'static>>();
        assert_send_sync::<TypedValue>();
    }
}
