//! Decoding of item variable payloads.
//!
//! Item variables store their value as text: usually base64, sometimes hex.
//! The text is turned into bytes and then read according to the variable's
//! data type.
//!
//! ```
//! use raidsave::{decode_typed_value, TypedValue};
//!
//! assert_eq!(decode_typed_value(1, "0000803F"), TypedValue::Float(1.0));
//! assert_eq!(decode_typed_value(2, "BQAAAA=="), TypedValue::Int(5));
//! assert_eq!(decode_typed_value(3, "01"), TypedValue::Bool(true));
//! assert_eq!(decode_typed_value(1, "00"), TypedValue::Unknown);
//! assert_eq!(decode_typed_value(2, "not a payload!"), TypedValue::Str("not a payload!".into()));
//! ```

use crate::util::decode_hex;
use base64::alphabet;
use base64::engine::general_purpose::GeneralPurpose;
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::Engine;
use serde::{Serialize, Serializer};

/// Standard alphabet, padding optional, trailing bits tolerated
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// The data type code attached to an item variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    Float,
    Int,
    Bool,
    String,
    Other(u8),
}

impl VariableType {
    pub fn new(code: u8) -> VariableType {
        match code {
            1 => VariableType::Float,
            2 => VariableType::Int,
            3 => VariableType::Bool,
            4 => VariableType::String,
            x => VariableType::Other(x),
        }
    }

    pub fn code(&self) -> u8 {
        match *self {
            VariableType::Float => 1,
            VariableType::Int => 2,
            VariableType::Bool => 3,
            VariableType::String => 4,
            VariableType::Other(x) => x,
        }
    }
}

/// How a payload string was turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    Hex,
    Base64,
}

/// Turns payload text into bytes.
///
/// A non-empty, even length string of only hex digits is read as hex even
/// when it would also be valid base64. Anything else is tried as base64
/// with ASCII whitespace ignored. Returns `None` when neither applies.
pub fn decode_payload(raw: &str) -> Option<(PayloadEncoding, Vec<u8>)> {
    if let Some(bytes) = decode_hex(raw) {
        return Some((PayloadEncoding::Hex, bytes));
    }

    let compact: Vec<u8> = raw
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    PAYLOAD_ENGINE
        .decode(compact)
        .ok()
        .map(|bytes| (PayloadEncoding::Base64, bytes))
}

/// A value decoded from an item variable payload
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Str(String),
    Unknown,
}

impl TypedValue {
    pub fn is_unknown(&self) -> bool {
        matches!(self, TypedValue::Unknown)
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            TypedValue::Float(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            TypedValue::Int(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            TypedValue::Bool(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Str(x) => Some(x.as_str()),
            _ => None,
        }
    }
}

impl Serialize for TypedValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TypedValue::Float(x) => serializer.serialize_f32(*x),
            TypedValue::Int(x) => serializer.serialize_i32(*x),
            TypedValue::Bool(x) => serializer.serialize_bool(*x),
            TypedValue::Str(x) => serializer.serialize_str(x),
            TypedValue::Unknown => serializer.serialize_none(),
        }
    }
}

/// Decodes the payload text of an item variable.
///
/// Never fails. Text that is neither hex nor base64 comes back verbatim as
/// [`TypedValue::Str`]. A payload too short for its type, or an unknown
/// type code, yields [`TypedValue::Unknown`].
pub fn decode_typed_value(data_type: u8, raw: &str) -> TypedValue {
    let Some((_, bytes)) = decode_payload(raw) else {
        log::trace!("payload is neither hex nor base64, keeping it as text");
        return TypedValue::Str(raw.to_owned());
    };

    decode_bytes(VariableType::new(data_type), &bytes)
}

/// Reads already decoded payload bytes as the given type
pub fn decode_bytes(kind: VariableType, bytes: &[u8]) -> TypedValue {
    match kind {
        VariableType::Float => bytes
            .first_chunk::<4>()
            .map_or(TypedValue::Unknown, |x| {
                TypedValue::Float(f32::from_le_bytes(*x))
            }),
        VariableType::Int => bytes
            .first_chunk::<4>()
            .map_or(TypedValue::Unknown, |x| TypedValue::Int(i32::from_le_bytes(*x))),
        VariableType::Bool => bytes
            .first()
            .map_or(TypedValue::Unknown, |&x| TypedValue::Bool(x != 0)),
        VariableType::String => TypedValue::Str(String::from_utf8_lossy(bytes).into_owned()),
        VariableType::Other(_) => TypedValue::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;
    use rstest::*;

    #[rstest]
    #[case(1, "0000803F", TypedValue::Float(1.0))]
    #[case(1, "0000803f", TypedValue::Float(1.0))]
    #[case(1, "AACAPw==", TypedValue::Float(1.0))]
    #[case(1, "AACAPw", TypedValue::Float(1.0))]
    #[case(1, "00", TypedValue::Unknown)]
    #[case(1, "AAA=", TypedValue::Unknown)]
    #[case(2, "05000000", TypedValue::Int(5))]
    #[case(2, "FFFFFFFF", TypedValue::Int(-1))]
    #[case(2, "BQAAAA==", TypedValue::Int(5))]
    #[case(2, "0500000000000000", TypedValue::Int(5))]
    #[case(3, "01", TypedValue::Bool(true))]
    #[case(3, "00", TypedValue::Bool(false))]
    #[case(3, "02", TypedValue::Bool(true))]
    #[case(3, "AQ==", TypedValue::Bool(true))]
    #[case(3, "", TypedValue::Unknown)]
    #[case(4, "68656c6c6f", TypedValue::Str(String::from("hello")))]
    #[case(4, "aGVsbG8=", TypedValue::Str(String::from("hello")))]
    #[case(4, "", TypedValue::Str(String::new()))]
    #[case(9, "01", TypedValue::Unknown)]
    #[case(0, "AQ==", TypedValue::Unknown)]
    fn test_decode_typed_value(
        #[case] data_type: u8,
        #[case] raw: &str,
        #[case] expected: TypedValue,
    ) {
        assert_eq!(decode_typed_value(data_type, raw), expected);
    }

    #[rstest]
    #[case("not base64!")]
    #[case("ab!")]
    #[case("A")]
    #[case("Prison_Key")]
    fn test_undecodable_is_verbatim(#[case] raw: &str) {
        for data_type in 0..=5 {
            assert_eq!(
                decode_typed_value(data_type, raw),
                TypedValue::Str(raw.to_string())
            );
        }
    }

    #[test]
    fn test_hex_takes_priority() {
        // "abcd" is also valid base64 (0x69 0xb7 0x1d)
        let (encoding, bytes) = decode_payload("abcd").unwrap();
        assert_eq!(encoding, PayloadEncoding::Hex);
        assert_eq!(bytes, vec![0xab, 0xcd]);

        // odd length hex digits fall through to base64, where 9 chars is
        // never a valid length
        assert!(decode_payload("abcdabcd0").is_none());
    }

    #[test]
    fn test_base64_ignores_whitespace() {
        assert_eq!(decode_typed_value(2, " BQAA\nAA== "), TypedValue::Int(5));
    }

    #[test]
    fn test_variable_type_codes() {
        for code in 0..=10u8 {
            assert_eq!(VariableType::new(code).code(), code);
        }
    }

    #[test]
    fn test_serialize_typed_value() {
        let values = vec![
            TypedValue::Float(80.5),
            TypedValue::Int(-3),
            TypedValue::Bool(true),
            TypedValue::Str(String::from("a")),
            TypedValue::Unknown,
        ];
        let actual = serde_json::to_string(&values).unwrap();
        assert_eq!(actual, r#"[80.5,-3,true,"a",null]"#);
    }

    #[quickcheck]
    fn undecodable_strings_are_returned_verbatim(data_type: u8, raw: String) -> TestResult {
        if decode_payload(&raw).is_some() {
            return TestResult::discard();
        }

        TestResult::from_bool(decode_typed_value(data_type, &raw) == TypedValue::Str(raw.clone()))
    }

    #[quickcheck]
    fn decoding_never_panics(data_type: u8, raw: String) -> bool {
        let _ = decode_typed_value(data_type, &raw);
        true
    }
}
