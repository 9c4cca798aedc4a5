//! Renders decoded saves as JSON
//!
//! ```
//! use raidsave::{Archive, json::JsonOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = br#"{"CreatedWithVersion": "0.9.4", "Level": {"__type" : "int"12}}"#;
//! let archive = Archive::from_slice(&data[..])?;
//!
//! let options = JsonOptions::new().with_prettyprint(false);
//!
//! // These are the default options
//! assert_eq!(options, JsonOptions::default());
//!
//! let actual = archive.json().with_options(options).to_string();
//! assert!(actual.starts_with(r#"{"version":"0.9.4","level":12,"exp":0,"#));
//! # Ok(())
//! # }
//! ```
//!
//! The raw entry table can be exported as well. Keys keep their stored
//! order and duplicates are preserved.
//!
//! ```
//! use raidsave::EntryTable;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = br#"{"Level": {"__type" : "int"12}, "Level": {"__type" : "int"13}}"#;
//! let table = EntryTable::from_slice(&data[..])?;
//! assert_eq!(table.json().to_string(), r#"{"Level":12,"Level":13}"#);
//! # Ok(())
//! # }
//! ```

use crate::container::EntryTable;
use crate::model::Archive;
use serde::{ser::SerializeMap, Serialize, Serializer};

/// Customizes the JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonOptions {
    /// Controls if the JSON should be pretty printed
    pretty: bool,
}

impl JsonOptions {
    /// Creates the structure with default options
    pub fn new() -> Self {
        JsonOptions::default()
    }

    /// Sets if the JSON should be pretty printed or minified
    pub fn with_prettyprint(mut self, pretty: bool) -> JsonOptions {
        self.pretty = pretty;
        self
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }
}

fn writer_json<W, S>(writer: W, pretty: bool, ser: S) -> Result<(), std::io::Error>
where
    W: std::io::Write,
    S: serde::Serialize,
{
    let result = if pretty {
        serde_json::to_writer_pretty(writer, &ser)
    } else {
        serde_json::to_writer(writer, &ser)
    };

    result.map_err(|e| e.into())
}

fn vec_json<F>(mut out: Vec<u8>, write_fn: F) -> Vec<u8>
where
    F: FnOnce(&mut Vec<u8>) -> Result<(), std::io::Error>,
{
    // Writing to a vec does not fail and every serialized type is ours, so
    // an error here is a bug rather than something to propagate
    if let Err(e) = write_fn(&mut out) {
        panic!("failed to serialize json to vector: {}", e)
    } else {
        out
    }
}

fn string_json(json: Vec<u8>) -> String {
    // From serde_json source: "we don't generate invalid utf-8"
    unsafe { String::from_utf8_unchecked(json) }
}

/// Creates JSON from a decoded value
#[derive(Debug)]
pub struct JsonBuilder<'a, T> {
    value: &'a T,
    options: JsonOptions,
}

impl<'a, T> JsonBuilder<'a, T>
where
    T: Serialize,
{
    fn new(value: &'a T) -> Self {
        JsonBuilder {
            value,
            options: JsonOptions::default(),
        }
    }

    /// Output JSON with the set of options
    pub fn with_options(mut self, options: JsonOptions) -> Self {
        self.options = options;
        self
    }

    /// Output JSON to the given writer
    pub fn to_writer<W>(self, writer: W) -> Result<(), std::io::Error>
    where
        W: std::io::Write,
    {
        writer_json(writer, self.options.pretty, self.value)
    }

    /// Output JSON to vec that contains UTF-8 data
    pub fn to_vec(self) -> Vec<u8> {
        vec_json(Vec::with_capacity(4096), |x| self.to_writer(x))
    }

    /// Output JSON to a string
    #[allow(clippy::inherent_to_string)]
    pub fn to_string(self) -> String {
        string_json(self.to_vec())
    }
}

impl Archive {
    /// Converts the archive to its JSON representation
    pub fn json(&self) -> JsonBuilder<'_, Archive> {
        JsonBuilder::new(self)
    }
}

impl EntryTable {
    /// Converts the entry table to a JSON object in entry order
    pub fn json(&self) -> JsonBuilder<'_, EntryTable> {
        JsonBuilder::new(self)
    }
}

impl Serialize for EntryTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GameClock, ItemEntry, ItemTreeData, ItemVariable, Kill};

    #[test]
    fn test_default_archive_field_order() {
        let json = Archive::default().json().to_string();
        let expected = concat!(
            r#"{"version":"","level":0,"exp":0,"health":0.0,"gameClock":{"days":0},"#,
            r#""economyData":{"money":0,"unlockedItems":[],"unlockesWaitingForConfirm":[]},"#,
            r#""masterKeys":[],"deathList":[],"#,
            r#""quests":{"activeQuestsData":[],"historyQuestsData":[],"everInspectedData":[]},"#,
            r#""inventory":[],"kills":[],"save_time":0,"#,
            r#""playerStorage":{"capacity":0,"entries":[]},"#,
            r#""inventorySafe":{"capacity":0,"entries":[]},"#,
            r#""characterItemData":{"rootInstanceID":0,"entries":[]}}"#
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn test_nested_field_names() {
        let archive = Archive {
            health: 80.5,
            game_clock: GameClock { days: 3 },
            kills: vec![Kill {
                master_name: String::from("Cname_Wolf"),
                count: 2,
            }],
            character_item_data: ItemTreeData {
                root_instance_id: -1,
                entries: vec![ItemEntry {
                    instance_id: -1,
                    type_id: 7,
                    variables: vec![ItemVariable {
                        key: String::from("Count"),
                        data_type: 2,
                        data: String::from("05000000"),
                        display: true,
                    }],
                    ..ItemEntry::default()
                }],
            },
            ..Archive::default()
        };

        let json = archive.json().to_string();
        assert!(json.contains(r#""health":80.5"#));
        assert!(json.contains(r#""kills":[{"masterName":"Cname_Wolf","count":2}]"#));
        assert!(json.contains(concat!(
            r#""entries":[{"instanceID":-1,"typeID":7,"#,
            r#""variables":[{"key":"Count","dataType":2,"data":"05000000","display":true}],"#,
            r#""slotContents":[],"inventory":[]}]"#
        )));
    }

    #[test]
    fn test_pretty_and_writer_agree() {
        let archive = Archive::default();
        let options = JsonOptions::new().with_prettyprint(true);
        let pretty = archive.json().with_options(options).to_string();
        assert!(pretty.starts_with("{\n  \"version\": \"\",\n"));

        let mut out = Vec::new();
        archive.json().with_options(options).to_writer(&mut out).unwrap();
        assert_eq!(out, pretty.into_bytes());
    }

    #[test]
    fn test_json_reads_back() {
        let archive = Archive {
            version: String::from("1.0.2"),
            exp: 1 << 40,
            ..Archive::default()
        };
        let json = archive.json().to_vec();
        let parsed: Archive = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed, archive);
    }
}
