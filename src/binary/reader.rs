use super::header::ContainerHeader;
use crate::cursor::ByteCursor;
use crate::errors::{Error, FormatError};
use crate::node::{Node, Record};

/// Type code that prefixes every value in the binary container
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ValueCode(pub u8);

impl ValueCode {
    pub const NULL: ValueCode = ValueCode::new(0x00);
    pub const BOOL: ValueCode = ValueCode::new(0x01);
    pub const I32: ValueCode = ValueCode::new(0x02);
    pub const I64: ValueCode = ValueCode::new(0x03);
    pub const F32: ValueCode = ValueCode::new(0x04);
    pub const F64: ValueCode = ValueCode::new(0x05);
    pub const STRING: ValueCode = ValueCode::new(0x06);
    pub const ARRAY: ValueCode = ValueCode::new(0x07);
    pub const RECORD: ValueCode = ValueCode::new(0x08);
    pub const BYTES: ValueCode = ValueCode::new(0x09);

    #[inline]
    pub const fn new(x: u8) -> Self {
        ValueCode(x)
    }
}

/// A top level entry along with the offset its key starts at
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryEntry {
    pub offset: usize,
    pub key: String,
    pub value: Node,
}

/// Pull based reader of a binary container's entry table.
///
/// ```
/// use raidsave::binary::BinaryReader;
/// use raidsave::Node;
///
/// let data = b"RSAV\x01\x00\x00\x00\x01\x05Level\x02\x07\x00\x00\x00";
/// let mut reader = BinaryReader::new(&data[..]).unwrap();
/// assert_eq!(reader.declared_entries(), 1);
///
/// let entry = reader.next_entry().unwrap().unwrap();
/// assert_eq!(entry.offset, 9);
/// assert_eq!(entry.key, "Level");
/// assert_eq!(entry.value, Node::Int(7));
/// assert!(reader.next_entry().unwrap().is_none());
/// ```
#[derive(Debug)]
pub struct BinaryReader<'a> {
    cursor: ByteCursor<'a>,
    header: ContainerHeader,
    declared: u64,
    read: u64,
    max_depth: usize,
}

impl<'a> BinaryReader<'a> {
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// Validates the container header and positions the reader at the first
    /// entry
    pub fn new(data: &'a [u8]) -> Result<Self, Error> {
        let mut cursor = ByteCursor::new(data);
        let header = ContainerHeader::read(&mut cursor)?;
        let declared = cursor.read_varint()?;
        Ok(BinaryReader {
            cursor,
            header,
            declared,
            read: 0,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        })
    }

    /// Sets how deeply arrays and records may nest before the data is
    /// rejected
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// The number of entries the container claims to hold
    pub fn declared_entries(&self) -> u64 {
        self.declared
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Reads the next top level entry or `None` once all declared entries
    /// have been read
    pub fn next_entry(&mut self) -> Result<Option<BinaryEntry>, Error> {
        if self.read >= self.declared {
            if !self.cursor.is_empty() {
                log::debug!(
                    "ignoring {} trailing bytes after the entry table",
                    self.cursor.remainder().len()
                );
            }
            return Ok(None);
        }

        let offset = self.cursor.position();
        let key = self.cursor.read_str()?.into_owned();
        let value = self.read_value(0)?;
        self.read += 1;
        Ok(Some(BinaryEntry { offset, key, value }))
    }

    /// Reads every remaining entry
    pub fn read_entries(&mut self) -> Result<Vec<(String, Node)>, Error> {
        let mut entries = Vec::with_capacity(self.bounded_len(self.declared));
        while let Some(entry) = self.next_entry()? {
            entries.push((entry.key, entry.value));
        }
        Ok(entries)
    }

    /// Every element occupies at least one byte, so a count is never
    /// allowed to reserve more than what remains
    #[inline]
    fn bounded_len(&self, count: u64) -> usize {
        let remaining = self.cursor.remainder().len();
        usize::try_from(count).map_or(remaining, |x| x.min(remaining))
    }

    fn read_value(&mut self, depth: usize) -> Result<Node, Error> {
        let offset = self.cursor.position();
        let code = ValueCode(self.cursor.read_u8()?);
        match code {
            ValueCode::NULL => Ok(Node::Null),
            ValueCode::BOOL => Ok(Node::Bool(self.cursor.read_u8()? != 0)),
            ValueCode::I32 => Ok(Node::Int(i64::from(self.cursor.read_i32()?))),
            ValueCode::I64 => Ok(Node::Int(self.cursor.read_i64()?)),
            ValueCode::F32 => Ok(Node::Float(f64::from(self.cursor.read_f32()?))),
            ValueCode::F64 => Ok(Node::Float(self.cursor.read_f64()?)),
            ValueCode::STRING => Ok(Node::Str(self.cursor.read_str()?.into_owned())),
            ValueCode::BYTES => Ok(Node::Bytes(self.cursor.read_len_prefixed()?.to_vec())),
            ValueCode::ARRAY => {
                self.check_depth(depth, offset)?;
                let count = self.cursor.read_varint()?;
                let mut values = Vec::with_capacity(self.bounded_len(count));
                for _ in 0..count {
                    values.push(self.read_value(depth + 1)?);
                }
                Ok(Node::Array(values))
            }
            ValueCode::RECORD => {
                self.check_depth(depth, offset)?;
                let tag = self.cursor.read_str()?;
                let tag = (!tag.is_empty()).then(|| tag.into_owned());
                let count = self.cursor.read_varint()?;
                let mut fields = Vec::with_capacity(self.bounded_len(count));
                for _ in 0..count {
                    let name = self.cursor.read_str()?.into_owned();
                    let value = self.read_value(depth + 1)?;
                    fields.push((name, value));
                }
                Ok(Node::Record(Record::new(tag, fields)))
            }
            ValueCode(code) => Err(FormatError::ValueCode { code, offset }.into()),
        }
    }

    #[inline]
    fn check_depth(&self, depth: usize, offset: usize) -> Result<(), Error> {
        if depth >= self.max_depth {
            Err(FormatError::TooDeep { offset }.into())
        } else {
            Ok(())
        }
    }
}
