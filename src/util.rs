#[inline]
pub(crate) fn get_split<const N: usize>(data: &[u8]) -> Option<([u8; N], &[u8])> {
    let (head, rest) = data.split_first_chunk::<N>()?;
    Some((*head, rest))
}

/// Decodes a string of hex digit pairs. Returns `None` for odd lengths,
/// empty input, or any non hex digit.
pub(crate) fn decode_hex(data: &str) -> Option<Vec<u8>> {
    let data = data.as_bytes();
    if data.is_empty() || data.len() % 2 != 0 {
        return None;
    }

    data.chunks_exact(2)
        .map(|pair| Some((hex_digit(pair[0])? << 4) | hex_digit(pair[1])?))
        .collect()
}

#[inline]
const fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
