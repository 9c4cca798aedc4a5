use crate::binary::BinaryReader;
use crate::container::EntryTable;
use crate::errors::{Error, FormatError, SkipReason, SkippedField};
use crate::graph::{FromNode, GraphDecoder, Section};
use crate::model::{Archive, EconomyData, Kill, VersionData};
use crate::node::Node;

const VERSION_KEY: &str = "CreatedWithVersion";
const MONEY_KEY: &str = "Currency/Money";
const KILLS_PREFIX: &str = "Count/Kills/";

/// Knobs for decoding a save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    max_depth: usize,
    require_version: bool,
}

impl DecodeOptions {
    /// Creates default options
    pub fn new() -> Self {
        DecodeOptions::default()
    }

    /// Maximum nesting of arrays and records in the binary container
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> DecodeOptions {
        self.max_depth = max_depth;
        self
    }

    /// Whether a save without a readable game version is rejected. When
    /// disabled the version decodes as an empty string instead.
    #[inline]
    pub fn with_require_version(mut self, require_version: bool) -> DecodeOptions {
        self.require_version = require_version;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn require_version(&self) -> bool {
        self.require_version
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_depth: BinaryReader::DEFAULT_MAX_DEPTH,
            require_version: true,
        }
    }
}

/// A decoded save together with the fields that had to be defaulted
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    archive: Archive,
    skipped: Vec<SkippedField>,
}

impl Decoded {
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub fn skipped(&self) -> &[SkippedField] {
        &self.skipped
    }

    pub fn into_archive(self) -> Archive {
        self.archive
    }

    pub fn into_parts(self) -> (Archive, Vec<SkippedField>) {
        (self.archive, self.skipped)
    }
}

/// Decodes save files into an [`Archive`].
///
/// ```
/// use raidsave::{ArchiveDecoder, DecodeOptions};
///
/// let data = br#"{"CreatedWithVersion": "0.9.4", "Level": {"__type" : "int"12}}"#;
/// let decoded = ArchiveDecoder::new().decode(&data[..])?;
/// assert_eq!(decoded.archive().version, "0.9.4");
/// assert_eq!(decoded.archive().level, 12);
///
/// let lenient = ArchiveDecoder::with_options(DecodeOptions::new().with_require_version(false));
/// let decoded = lenient.decode(b"{}")?;
/// assert_eq!(decoded.archive().version, "");
/// # Ok::<(), raidsave::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveDecoder {
    options: DecodeOptions,
}

impl ArchiveDecoder {
    pub fn new() -> Self {
        ArchiveDecoder::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        ArchiveDecoder { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Reads and assembles a save in either rendition
    pub fn decode(&self, data: &[u8]) -> Result<Decoded, Error> {
        let table = EntryTable::from_slice_with(data, &self.options)?;
        self.assemble(&table)
    }

    /// Assembles an archive from an entry table that was already read
    pub fn assemble(&self, table: &EntryTable) -> Result<Decoded, Error> {
        let mut asm = Assembler {
            table,
            de: GraphDecoder::new(),
        };

        let version = asm.version(self.options.require_version)?;
        let archive = Archive {
            version,
            level: asm.scalar("Level", "i32", Node::as_i32),
            exp: asm.scalar("Exp", "i64", Node::as_i64),
            health: asm.scalar("MainCharacter/Health", "f32", |x| {
                x.as_f64().map(|x| x as f32)
            }),
            game_clock: asm.record("GameClock"),
            economy_data: asm.economy(),
            master_keys: asm.list("MasterKeys"),
            death_list: asm.list("DeathList"),
            quests: asm.record("Quests"),
            inventory: asm.i32_list("Inventory"),
            kills: asm.kills(),
            save_time: asm.scalar("SaveTime", "i64", Node::as_i64),
            player_storage: asm.record("PlayerStorage"),
            inventory_safe: asm.record("Inventory/Safe"),
            character_item_data: asm.record("Item/MainCharacterItemData"),
        };

        let skipped = asm.de.into_skipped();
        log::info!(
            "decoded save from version {} ({} fields defaulted)",
            archive.version,
            skipped.len()
        );

        Ok(Decoded { archive, skipped })
    }
}

struct Assembler<'a> {
    table: &'a EntryTable,
    de: GraphDecoder,
}

impl<'a> Assembler<'a> {
    fn missing(&mut self, key: &str) {
        self.de.entry(key, |de| de.skip(SkipReason::Missing));
    }

    fn version(&mut self, required: bool) -> Result<String, Error> {
        let rendered = match self.table.get(VERSION_KEY) {
            Some(node) => self.de.entry(VERSION_KEY, |de| match de.decode_section(node) {
                Section::Version(version) => Some(version.to_string()),
                Section::Opaque(Node::Str(version)) => Some(version),
                Section::Opaque(node @ Node::Record(_)) => {
                    Some(de.decode::<VersionData>(&node).to_string())
                }
                _ => None,
            }),
            None => None,
        };

        match rendered {
            Some(version) => Ok(version),
            None if required => Err(FormatError::MissingVersion.into()),
            None => {
                self.missing(VERSION_KEY);
                Ok(String::new())
            }
        }
    }

    fn scalar<T: Default>(
        &mut self,
        key: &str,
        expected: &'static str,
        convert: impl FnOnce(&Node) -> Option<T>,
    ) -> T {
        let Some(node) = self.table.get(key) else {
            self.missing(key);
            return T::default();
        };

        match convert(node) {
            Some(x) => x,
            None if matches!(node, Node::Null) => T::default(),
            None => {
                self.de
                    .entry(key, |de| de.skip(SkipReason::Mistyped { expected }));
                T::default()
            }
        }
    }

    fn record<T: FromNode>(&mut self, key: &str) -> T {
        match self.table.get(key) {
            Some(node) => self.de.entry(key, |de| de.decode(node)),
            None => {
                self.missing(key);
                T::default()
            }
        }
    }

    fn list<T: FromNode>(&mut self, key: &str) -> Vec<T> {
        match self.table.get(key) {
            Some(node) => self.de.entry(key, |de| de.decode_list(node)),
            None => {
                self.missing(key);
                Vec::new()
            }
        }
    }

    fn i32_list(&mut self, key: &str) -> Vec<i32> {
        match self.table.get(key) {
            Some(node) => self.de.entry(key, |de| de.decode_i32_list(node)),
            None => {
                self.missing(key);
                Vec::new()
            }
        }
    }

    /// The economy record, or just the money entry when the record is absent
    fn economy(&mut self) -> EconomyData {
        if self.table.get("EconomyData").is_some() {
            return self.record("EconomyData");
        }

        if self.table.get(MONEY_KEY).is_none() {
            self.missing("EconomyData");
            return EconomyData::default();
        }

        EconomyData {
            money: self.scalar(MONEY_KEY, "i64", Node::as_i64),
            ..EconomyData::default()
        }
    }

    /// Kill counters in entry order. A counter that is not an integer is
    /// left out.
    fn kills(&mut self) -> Vec<Kill> {
        let mut kills = Vec::new();
        for (name, node) in self.table.with_prefix(KILLS_PREFIX) {
            match node.as_i32() {
                Some(count) => kills.push(Kill {
                    master_name: name.to_owned(),
                    count,
                }),
                None => {
                    let key = format!("{}{}", KILLS_PREFIX, name);
                    self.de
                        .entry(&key, |de| de.skip(SkipReason::Mistyped { expected: "i32" }));
                }
            }
        }
        kills
    }
}

impl Archive {
    /// Decodes a save in either rendition with default options.
    ///
    /// ```
    /// use raidsave::Archive;
    ///
    /// let data = br#"{"CreatedWithVersion": "0.9.4", "Exp": {"__type" : "int"350}}"#;
    /// let archive = Archive::from_slice(&data[..])?;
    /// assert_eq!(archive.exp, 350);
    /// # Ok::<(), raidsave::Error>(())
    /// ```
    pub fn from_slice(data: &[u8]) -> Result<Archive, Error> {
        ArchiveDecoder::new().decode(data).map(Decoded::into_archive)
    }
}
