use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A value in a save's object graph, before it is given a typed shape.
///
/// Both the binary container and the text save decode into nodes, so
/// everything downstream is agnostic of where the data came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Array(Vec<Node>),
    Record(Record),
}

impl Node {
    /// Short description of the node's shape, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Int(_) => "int",
            Node::Float(_) => "float",
            Node::Str(_) => "string",
            Node::Bytes(_) => "bytes",
            Node::Array(_) => "array",
            Node::Record(_) => "record",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Node::Bool(x) => Some(x),
            Node::Int(0) => Some(false),
            Node::Int(1) => Some(true),
            _ => None,
        }
    }

    /// Integers, and floats that hold an integral value
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Node::Int(x) => Some(x),
            Node::Float(x) if x.fract() == 0.0 && x.abs() < 9.0e15 => Some(x as i64),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|x| i32::try_from(x).ok())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Node::Float(x) => Some(x),
            Node::Int(x) => Some(x as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Str(x) => Some(x.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Node]> {
        match self {
            Node::Array(x) => Some(x.as_slice()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Node::Record(x) => Some(x),
            _ => None,
        }
    }
}

/// An object in the graph: an optional type tag and named fields in source
/// order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    tag: Option<String>,
    fields: Vec<(String, Node)>,
}

impl Record {
    pub fn new(tag: Option<String>, fields: Vec<(String, Node)>) -> Self {
        Record { tag, fields }
    }

    /// The type name exactly as stored in the save
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn fields(&self) -> &[(String, Node)] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<(String, Node)> {
        self.fields
    }

    /// Looks up a field. A repeated field name resolves to the last value.
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.fields
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(x) => serializer.serialize_bool(*x),
            Node::Int(x) => serializer.serialize_i64(*x),
            Node::Float(x) => serializer.serialize_f64(*x),
            Node::Str(x) => serializer.serialize_str(x),
            Node::Bytes(x) => serializer.serialize_bytes(x),
            Node::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Node::Record(record) => record.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = self.fields.len() + usize::from(self.tag.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(tag) = &self.tag {
            map.serialize_entry("$type", tag)?;
        }

        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
