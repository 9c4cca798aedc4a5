use super::repair::repair_primitive_wrappers;
use crate::errors::{Error, FormatError};
use crate::node::{Node, Record};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

const TYPE_KEYS: [&str; 2] = ["__type", "$type"];
const VALUE_KEY: &str = "value";

/// Wrapper type names of primitives. A tag from one of these is not
/// carried onto the unwrapped value.
const PRIMITIVE_TYPES: [&str; 7] = ["bool", "int", "float", "double", "long", "string", "byte"];

/// Parses a text save into its top level entries.
///
/// The input is repaired with [`repair_primitive_wrappers`] first. Wrapper
/// objects (`{"__type": ..., "value": ...}`) unwrap to their value, and
/// objects with a type key become tagged records.
///
/// ```
/// use raidsave::text::read_entries;
/// use raidsave::Node;
///
/// let data = br#"{"Level": {"__type" : "int"12}, "Exp": {"__type": "int", "value": 1200}}"#;
/// let entries = read_entries(&data[..]).unwrap();
/// assert_eq!(entries[0], (String::from("Level"), Node::Int(12)));
/// assert_eq!(entries[1], (String::from("Exp"), Node::Int(1200)));
/// ```
pub fn read_entries(data: &[u8]) -> Result<Vec<(String, Node)>, Error> {
    let data = data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(data);
    let repaired = repair_primitive_wrappers(data);
    if repaired.len() != data.len() {
        log::debug!(
            "repaired primitive wrappers in text save ({} -> {} bytes)",
            data.len(),
            repaired.len()
        );
    }

    let root: TextNode =
        serde_json::from_slice(&repaired).map_err(|e| Error::format(FormatError::Text(e)))?;

    match root.0 {
        Node::Record(record) => Ok(record.into_fields()),
        _ => Err(FormatError::UnknownMarker.into()),
    }
}

/// A [`Node`] deserialized from JSON with wrapper objects resolved
struct TextNode(Node);

impl<'de> Deserialize<'de> for TextNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(TextNodeVisitor).map(TextNode)
    }
}

struct TextNodeVisitor;

impl<'de> Visitor<'de> for TextNodeVisitor {
    type Value = Node;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a text save value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Node::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v).map_or(Node::Float(v as f64), Node::Int))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Node::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Node::Str(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Node::Str(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Node::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(TextNode(value)) = seq.next_element()? {
            values.push(value);
        }
        Ok(Node::Array(values))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut tag = None;
        let mut fields = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            let TextNode(value) = map.next_value()?;
            match value {
                Node::Str(name) if TYPE_KEYS.contains(&key.as_str()) => tag = Some(name),
                value => fields.push((key, value)),
            }
        }

        Ok(resolve_object(tag, fields))
    }
}

fn resolve_object(tag: Option<String>, mut fields: Vec<(String, Node)>) -> Node {
    let is_wrapper = tag.is_some() && fields.len() == 1 && fields[0].0 == VALUE_KEY;
    if !is_wrapper {
        return Node::Record(Record::new(tag, fields));
    }

    let (_, value) = fields.swap_remove(0);
    match (tag, value) {
        (Some(tag), Node::Record(inner))
            if inner.tag().is_none() && !PRIMITIVE_TYPES.contains(&tag.as_str()) =>
        {
            Node::Record(Record::new(Some(tag), inner.into_fields()))
        }
        (_, value) => value,
    }
}
