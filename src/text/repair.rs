use std::borrow::Cow;

/// Rewrites the malformed primitive wrappers that the game's text
/// serializer emits so that the data becomes valid JSON.
///
/// The serializer writes a primitive as `"__type" : "int"5`, with the value
/// glued to the type name. The fix inserts the missing `"value"` key:
/// `"__type": "int", "value": 5`. Bool, int and float wrappers are handled.
/// String contents are skipped over so text that only looks like a wrapper
/// is left alone.
///
/// ```
/// use raidsave::text::repair_primitive_wrappers;
///
/// let data = br#"{"Level":{"__type" : "int"12}}"#;
/// let repaired = repair_primitive_wrappers(&data[..]);
/// assert_eq!(&repaired[..], &br#"{"Level":{"__type": "int", "value": 12}}"#[..]);
///
/// // Well formed input is returned as is
/// let data = br#"{"Level":{"__type": "int", "value": 12}}"#;
/// assert_eq!(&repair_primitive_wrappers(&data[..])[..], &data[..]);
/// ```
pub fn repair_primitive_wrappers(data: &[u8]) -> Cow<'_, [u8]> {
    let mut out = Vec::new();
    let mut copied = 0;
    let mut i = 0;

    while i < data.len() {
        if data[i] != b'"' {
            i += 1;
            continue;
        }

        let end = string_end(data, i);
        if &data[i..end] == b"\"__type\"" {
            if let Some(wrapper) = glued_wrapper(data, end) {
                out.extend_from_slice(&data[copied..i]);
                out.extend_from_slice(b"\"__type\": \"");
                out.extend_from_slice(wrapper.type_name);
                out.extend_from_slice(b"\", \"value\": ");
                out.extend_from_slice(&data[wrapper.value_start..wrapper.value_end]);
                copied = wrapper.value_end;
                i = wrapper.value_end;
                continue;
            }
        }

        i = end;
    }

    if copied == 0 {
        Cow::Borrowed(data)
    } else {
        out.extend_from_slice(&data[copied..]);
        Cow::Owned(out)
    }
}

struct GluedWrapper<'a> {
    type_name: &'a [u8],
    value_start: usize,
    value_end: usize,
}

/// Returns the index one past the closing quote of the string starting at
/// `start`, or the end of the data for an unterminated string
#[inline]
fn string_end(data: &[u8], start: usize) -> usize {
    let mut j = start + 1;
    while j < data.len() {
        match data[j] {
            b'\\' => j += 2,
            b'"' => return j + 1,
            _ => j += 1,
        }
    }
    data.len()
}

#[inline]
fn skip_whitespace(data: &[u8], mut pos: usize) -> usize {
    while pos < data.len() && matches!(data[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}

/// Matches `\s*:\s*"<type>"<value>` right after a `"__type"` key
fn glued_wrapper(data: &[u8], pos: usize) -> Option<GluedWrapper<'_>> {
    let pos = skip_whitespace(data, pos);
    if data.get(pos) != Some(&b':') {
        return None;
    }

    let name_start = skip_whitespace(data, pos + 1);
    if data.get(name_start) != Some(&b'"') {
        return None;
    }

    let name_end = string_end(data, name_start);
    if name_end < name_start + 2 || data[name_end - 1] != b'"' {
        return None;
    }

    let type_name = &data[name_start + 1..name_end - 1];
    let rest = &data[name_end..];
    let len = match type_name {
        b"bool" => bool_len(rest),
        b"int" => int_len(rest),
        b"float" => float_len(rest),
        _ => None,
    }?;

    Some(GluedWrapper {
        type_name,
        value_start: name_end,
        value_end: name_end + len,
    })
}

fn bool_len(data: &[u8]) -> Option<usize> {
    if data.starts_with(b"true") {
        Some(4)
    } else if data.starts_with(b"false") {
        Some(5)
    } else {
        None
    }
}

fn digits_len(data: &[u8]) -> usize {
    data.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn int_len(data: &[u8]) -> Option<usize> {
    let sign = usize::from(data.first() == Some(&b'-'));
    let digits = digits_len(&data[sign..]);
    (digits > 0).then_some(sign + digits)
}

fn float_len(data: &[u8]) -> Option<usize> {
    let sign = usize::from(data.first() == Some(&b'-'));
    let mantissa = data[sign..]
        .iter()
        .take_while(|&&b| b.is_ascii_digit() || b == b'.')
        .count();
    if mantissa == 0 {
        return None;
    }

    let mut len = sign + mantissa;
    if matches!(data.get(len), Some(b'e' | b'E')) {
        let exp_sign = usize::from(matches!(data.get(len + 1), Some(b'+' | b'-')));
        let exp_digits = digits_len(&data[(len + 1 + exp_sign).min(data.len())..]);
        if exp_digits > 0 {
            len += 1 + exp_sign + exp_digits;
        }
    }

    Some(len)
}
