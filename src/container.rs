use crate::binary::{BinaryReader, ContainerHeader};
use crate::decode::DecodeOptions;
use crate::errors::{Error, FormatError};
use crate::graph::{GraphDecoder, Section};
use crate::model::CustomFaceSettingData;
use crate::node::Node;
use crate::text;

const VISITED_PREFIX: &str = "MultiSceneCore_Visited_";
const CONSTRUCTION_PREFIX: &str = "ConstructionSite_";
const FACE_KEY: &str = "CustomFace_MainCharacter";

/// The rendition a save was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// The `RSAV` container
    Binary,

    /// A JSON document written in the game's plain text mode
    Text,
}

impl SaveFormat {
    /// Sniffs the rendition from the leading bytes.
    ///
    /// ```
    /// use raidsave::SaveFormat;
    ///
    /// assert_eq!(SaveFormat::detect(b"RSAV\x01\x00\x00\x00\x00"), Some(SaveFormat::Binary));
    /// assert_eq!(SaveFormat::detect(b"\xef\xbb\xbf\r\n {}"), Some(SaveFormat::Text));
    /// assert_eq!(SaveFormat::detect(b"PK\x03\x04"), None);
    /// ```
    pub fn detect(data: &[u8]) -> Option<SaveFormat> {
        if ContainerHeader::is_container(data) {
            return Some(SaveFormat::Binary);
        }

        let data = data.strip_prefix(b"\xef\xbb\xbf").unwrap_or(data);
        let first = data.iter().find(|x| !x.is_ascii_whitespace());
        match first {
            Some(b'{') => Some(SaveFormat::Text),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SaveFormat::Binary => "binary",
            SaveFormat::Text => "text",
        }
    }
}

/// The ordered top level entries of a save.
///
/// Entry order is the order the save stores them in. Keys are not required
/// to be unique; lookups resolve to the last entry with a key.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryTable {
    format: SaveFormat,
    entries: Vec<(String, Node)>,
}

impl EntryTable {
    /// Reads the entries of a save in either rendition
    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        EntryTable::from_slice_with(data, &DecodeOptions::default())
    }

    pub fn from_slice_with(data: &[u8], options: &DecodeOptions) -> Result<Self, Error> {
        let format = SaveFormat::detect(data).ok_or(FormatError::UnknownMarker)?;
        log::info!("detected {} save ({} bytes)", format.name(), data.len());

        let entries = match format {
            SaveFormat::Binary => BinaryReader::new(data)?
                .with_max_depth(options.max_depth())
                .read_entries()?,
            SaveFormat::Text => text::read_entries(data)?,
        };

        log::debug!("read {} top level entries", entries.len());
        Ok(EntryTable::new(format, entries))
    }

    pub fn new(format: SaveFormat, entries: Vec<(String, Node)>) -> Self {
        EntryTable { format, entries }
    }

    pub fn format(&self) -> SaveFormat {
        self.format
    }

    pub fn entries(&self) -> &[(String, Node)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The last entry stored under `key`
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Entries whose key starts with `prefix`, paired with the rest of the
    /// key, in entry order
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Node)> + 'a {
        self.iter()
            .filter_map(move |(k, v)| k.strip_prefix(prefix).map(|rest| (rest, v)))
    }

    /// Dispatches every entry on its record tag. Fields defaulted along the
    /// way are recorded in `de`.
    pub fn sections(&self, de: &mut GraphDecoder) -> Vec<(&str, Section)> {
        self.iter()
            .map(|(key, node)| (key, de.entry(key, |de| de.decode_section(node))))
            .collect()
    }

    /// Scenes the player has entered.
    ///
    /// ```
    /// use raidsave::{EntryTable, Node, SaveFormat};
    ///
    /// let table = EntryTable::new(SaveFormat::Text, vec![
    ///     (String::from("MultiSceneCore_Visited_Level_Farm"), Node::Bool(true)),
    ///     (String::from("MultiSceneCore_Visited_Level_Lab"), Node::Bool(false)),
    /// ]);
    /// assert_eq!(table.visited_scenes(), vec!["Level_Farm"]);
    /// ```
    pub fn visited_scenes(&self) -> Vec<&str> {
        self.with_prefix(VISITED_PREFIX)
            .filter(|(_, v)| v.as_bool() == Some(true))
            .map(|(scene, _)| scene)
            .collect()
    }

    /// Construction sites and whether each is built. Values that are not
    /// booleans are left out.
    pub fn construction_sites(&self) -> Vec<(&str, bool)> {
        self.with_prefix(CONSTRUCTION_PREFIX)
            .filter_map(|(name, v)| v.as_bool().map(|built| (name, built)))
            .collect()
    }

    /// The main character's face settings, or `None` when the save has
    /// none. Defaulted fields are recorded in `de`.
    pub fn custom_face(&self, de: &mut GraphDecoder) -> Option<CustomFaceSettingData> {
        let node = self.get(FACE_KEY)?;
        Some(de.entry(FACE_KEY, |de| de.decode(node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use rstest::*;

    #[rstest]
    #[case(b"RSAV", Some(SaveFormat::Binary))]
    #[case(b"{", Some(SaveFormat::Text))]
    #[case(b"  \n\t{\"a\":1}", Some(SaveFormat::Text))]
    #[case(b"\xef\xbb\xbf{}", Some(SaveFormat::Text))]
    #[case(b"", None)]
    #[case(b"   ", None)]
    #[case(b"RSA", None)]
    #[case(b"[1]", None)]
    #[case(b"\xef\xbb\xbfRSAV", None)]
    fn test_detect(#[case] data: &[u8], #[case] expected: Option<SaveFormat>) {
        assert_eq!(SaveFormat::detect(data), expected);
    }

    #[test]
    fn test_unknown_marker() {
        let err = EntryTable::from_slice(b"PK\x03\x04").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnsupportedFormat(FormatError::UnknownMarker)
        ));
    }

    #[test]
    fn test_text_table() {
        let data = br#"{
            "Count/Kills/Cname_Wolf": {"__type" : "int"3},
            "ConstructionSite_Workbench": {"__type" : "bool"true},
            "ConstructionSite_Bench": {"__type" : "bool"false},
            "ConstructionSite_Note": "x",
            "MultiSceneCore_Visited_Base": true,
            "Count/Kills/Cname_Wolf": {"__type" : "int"4}
        }"#;

        let table = EntryTable::from_slice(&data[..]).unwrap();
        assert_eq!(table.format(), SaveFormat::Text);
        assert_eq!(table.len(), 6);
        assert_eq!(table.get("Count/Kills/Cname_Wolf"), Some(&Node::Int(4)));
        assert_eq!(table.get("Count/Kills/Cname_Bear"), None);
        assert_eq!(
            table.construction_sites(),
            vec![("Workbench", true), ("Bench", false)]
        );
        assert_eq!(table.visited_scenes(), vec!["Base"]);

        let kills: Vec<_> = table.with_prefix("Count/Kills/").map(|(k, _)| k).collect();
        assert_eq!(kills, vec!["Cname_Wolf", "Cname_Wolf"]);
    }

    #[test]
    fn test_custom_face() {
        let data = br#"{
            "CreatedWithVersion": "1.0.0",
            "CustomFace_MainCharacter": {
                "__type": "CustomFaceSettingData,TeamSoda.Duckov.Core",
                "value": {
                    "savedSetting": true,
                    "headSetting": {
                        "mainColor": {"__type": "UnityEngine.Color,UnityEngine.CoreModule", "r": 0.8, "g": 0.5, "b": 0.25, "a": 1},
                        "headScaleOffset": 0.1,
                        "foreheadHeight": 0.5,
                        "foreheadRound": 0.25
                    },
                    "hairId": 12,
                    "hairInfo": {"radius": 1, "color": {"r": 0, "g": 0, "b": 0, "a": 1}, "height": 0.5,
                        "heightOffset": 0, "scale": 1.5, "twist": 0, "distanceAngle": 30, "leftRightAngle": -15},
                    "eyeId": 3,
                    "eyebrowId": 4,
                    "mouthId": 5,
                    "tailId": 0,
                    "footId": 7,
                    "wingId": null
                }
            }
        }"#;

        let table = EntryTable::from_slice(&data[..]).unwrap();
        let mut de = GraphDecoder::new();
        let face = table.custom_face(&mut de).unwrap();
        assert!(face.saved_setting);
        assert_eq!(face.head_setting.main_color.r, 0.8);
        assert_eq!(face.head_setting.main_color.b, 0.25);
        assert_eq!(face.head_setting.forehead_round, 0.25);
        assert_eq!(face.hair_id, 12);
        assert_eq!(face.hair_info.scale, 1.5);
        assert_eq!(face.hair_info.left_right_angle, -15.0);
        assert_eq!(face.foot_id, 7);
        assert_eq!(face.wing_id, 0);

        let skipped: Vec<_> = de.skipped().iter().map(|x| x.to_string()).collect();
        assert_eq!(
            skipped,
            vec![
                "CustomFace_MainCharacter.eyeInfo: missing",
                "CustomFace_MainCharacter.eyebrowInfo: missing",
                "CustomFace_MainCharacter.mouthInfo: missing",
                "CustomFace_MainCharacter.tailInfo: missing",
                "CustomFace_MainCharacter.footInfo: missing",
                "CustomFace_MainCharacter.wingInfo: missing",
            ]
        );

        // The face stays out of the archive
        let json = crate::Archive::from_slice(&data[..]).unwrap().json().to_string();
        assert!(!json.contains("hairId"));
    }

    #[test]
    fn test_no_custom_face() {
        let table = EntryTable::new(SaveFormat::Text, vec![]);
        assert_eq!(table.custom_face(&mut GraphDecoder::new()), None);
    }

    #[test]
    fn test_sections() {
        let data = br#"{
            "GameClock": {"__type": "GameClock,Assembly-CSharp", "value": {"days": 4}},
            "Level": {"__type" : "int"2}
        }"#;

        let table = EntryTable::from_slice(&data[..]).unwrap();
        let mut de = GraphDecoder::new();
        let sections = table.sections(&mut de);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].0, "GameClock");
        assert_eq!(sections[0].1.tag(), Some(crate::graph::RecordTag::GameClock));
        assert_eq!(sections[1].1, Section::Opaque(Node::Int(2)));
        assert!(de.skipped().is_empty());
    }
}
