#![allow(dead_code)]

use raidsave::{Node, Record};

pub fn s(x: &str) -> Node {
    Node::Str(String::from(x))
}

pub fn arr(values: Vec<Node>) -> Node {
    Node::Array(values)
}

pub fn record(tag: Option<&str>, fields: Vec<(&str, Node)>) -> Node {
    Node::Record(Record::new(
        tag.map(String::from),
        fields
            .into_iter()
            .map(|(k, v)| (String::from(k), v))
            .collect(),
    ))
}

pub fn entries(entries: Vec<(&str, Node)>) -> Vec<(String, Node)> {
    entries
        .into_iter()
        .map(|(k, v)| (String::from(k), v))
        .collect()
}

fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn write_str(out: &mut Vec<u8>, value: &str) {
    write_varint(out, value.len() as u64);
    out.extend_from_slice(value.as_bytes());
}

fn write_node(out: &mut Vec<u8>, node: &Node) {
    match node {
        Node::Null => out.push(0x00),
        Node::Bool(x) => {
            out.push(0x01);
            out.push(u8::from(*x));
        }
        Node::Int(x) => match i32::try_from(*x) {
            Ok(x) => {
                out.push(0x02);
                out.extend_from_slice(&x.to_le_bytes());
            }
            Err(_) => {
                out.push(0x03);
                out.extend_from_slice(&x.to_le_bytes());
            }
        },
        Node::Float(x) => {
            out.push(0x05);
            out.extend_from_slice(&x.to_le_bytes());
        }
        Node::Str(x) => {
            out.push(0x06);
            write_str(out, x);
        }
        Node::Array(values) => {
            out.push(0x07);
            write_varint(out, values.len() as u64);
            for value in values {
                write_node(out, value);
            }
        }
        Node::Record(record) => {
            out.push(0x08);
            write_str(out, record.tag().unwrap_or(""));
            write_varint(out, record.len() as u64);
            for (name, value) in record.fields() {
                write_str(out, name);
                write_node(out, value);
            }
        }
        Node::Bytes(x) => {
            out.push(0x09);
            write_varint(out, x.len() as u64);
            out.extend_from_slice(x);
        }
    }
}

/// Encodes entries into a version 1 binary container
pub fn encode_binary(entries: &[(String, Node)]) -> Vec<u8> {
    let mut out = b"RSAV\x01\x00\x00\x00".to_vec();
    write_varint(&mut out, entries.len() as u64);
    for (key, value) in entries {
        write_str(&mut out, key);
        write_node(&mut out, value);
    }
    out
}

fn write_json_value(out: &mut String, node: &Node) {
    match node {
        Node::Null => out.push_str("null"),
        Node::Bool(x) => out.push_str(if *x { "true" } else { "false" }),
        Node::Int(x) => out.push_str(&x.to_string()),
        Node::Float(x) => out.push_str(&format!("{:?}", x)),
        Node::Str(x) => out.push_str(&serde_json::to_string(x).unwrap()),
        Node::Bytes(_) => panic!("text saves have no byte values"),
        Node::Array(values) => {
            out.push('[');
            for (i, value) in values.iter().enumerate() {
                if i != 0 {
                    out.push(',');
                }
                write_json_value(out, value);
            }
            out.push(']');
        }
        Node::Record(record) => {
            out.push('{');
            let mut first = true;
            if let Some(tag) = record.tag() {
                out.push_str(&format!("\"__type\":{}", serde_json::to_string(tag).unwrap()));
                first = false;
            }
            for (name, value) in record.fields() {
                if !first {
                    out.push(',');
                }
                first = false;
                out.push_str(&serde_json::to_string(name).unwrap());
                out.push(':');
                write_json_value(out, value);
            }
            out.push('}');
        }
    }
}

/// Renders entries the way the game's text mode writes them: top level
/// primitives in glued wrappers and top level records in value wrappers
pub fn encode_text(entries: &[(String, Node)]) -> Vec<u8> {
    let mut out = String::from("{\n");
    for (i, (key, value)) in entries.iter().enumerate() {
        if i != 0 {
            out.push_str(",\n");
        }
        out.push_str(&format!("\t{} : ", serde_json::to_string(key).unwrap()));
        match value {
            Node::Bool(x) => out.push_str(&format!("{{\"__type\" : \"bool\"{}}}", x)),
            Node::Int(x) => out.push_str(&format!("{{\"__type\" : \"int\"{}}}", x)),
            Node::Float(x) => out.push_str(&format!("{{\"__type\" : \"float\"{:?}}}", x)),
            Node::Record(record) if record.tag().is_some() => {
                let inner = Record::new(None, record.fields().to_vec());
                out.push_str("{\"__type\" : ");
                out.push_str(&serde_json::to_string(record.tag().unwrap()).unwrap());
                out.push_str(",\"value\" : ");
                write_json_value(&mut out, &Node::Record(inner));
                out.push('}');
            }
            other => write_json_value(&mut out, other),
        }
    }
    out.push_str("\n}");
    out.into_bytes()
}
