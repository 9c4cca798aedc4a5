//! Gives typed shape to the generic [`Node`] graph.
//!
//! Decoding a shape never fails. A field that is absent or holds the wrong
//! kind of value takes its default and is reported as a [`SkippedField`].

use crate::errors::{SkipReason, SkippedField};
use crate::model::{
    Color, CustomFaceSettingData, EconomyData, GameClock, HeadSetting, Inventory, InventoryItem,
    InventoryItemData, ItemEntry, ItemTreeData, ItemVariable, MasterKey, PartInfo, QuestData,
    QuestSaveData, SlotContent, StashData, VersionData, WorldPosition,
};
use crate::node::{Node, Record};
use std::fmt::Write;

/// The record shapes that have a typed decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    ItemTree,
    Item,
    Variable,
    Slot,
    InventoryItem,
    Inventory,
    InventoryEntry,
    Stash,
    Vector,
    Quest,
    Quests,
    Economy,
    MasterKey,
    GameClock,
    Version,
    Face,
    FaceHead,
    FacePart,
    Color,
}

impl RecordTag {
    /// Looks up the shape of a stored type name.
    ///
    /// ```
    /// use raidsave::RecordTag;
    ///
    /// let tag = RecordTag::from_type_name("TeamSoda.Duckov.ItemTreeData,Assembly-CSharp");
    /// assert_eq!(tag, Some(RecordTag::ItemTree));
    /// assert_eq!(RecordTag::from_type_name("UnityEngine.Quaternion"), None);
    /// ```
    pub fn from_type_name(name: &str) -> Option<RecordTag> {
        let tag = match normalize_type_name(name) {
            "ItemTreeData" => RecordTag::ItemTree,
            "ItemEntry" | "ItemData" => RecordTag::Item,
            "ItemVariable" | "CustomData" => RecordTag::Variable,
            "SlotContent" => RecordTag::Slot,
            "InventoryItem" => RecordTag::InventoryItem,
            "Inventory" | "InventoryData" => RecordTag::Inventory,
            "InventoryItemData" => RecordTag::InventoryEntry,
            "StashData" | "DeadBodyData" => RecordTag::Stash,
            "Vector3" | "WorldPosition" => RecordTag::Vector,
            "QuestSaveData" => RecordTag::Quest,
            "QuestData" | "QuestManagerSaveData" => RecordTag::Quests,
            "EconomyData" | "EconomyManagerData" => RecordTag::Economy,
            "MasterKey" | "MasterKeyData" => RecordTag::MasterKey,
            "GameClock" | "GameClockData" => RecordTag::GameClock,
            "VersionData" => RecordTag::Version,
            "CustomFaceSettingData" => RecordTag::Face,
            "CustomFaceHeadSetting" | "HeadSetting" => RecordTag::FaceHead,
            "CustomFacePartInfo" | "PartInfo" => RecordTag::FacePart,
            "Color" => RecordTag::Color,
            _ => return None,
        };

        Some(tag)
    }

    /// Canonical type name of the shape
    pub fn name(&self) -> &'static str {
        match self {
            RecordTag::ItemTree => "ItemTreeData",
            RecordTag::Item => "ItemEntry",
            RecordTag::Variable => "ItemVariable",
            RecordTag::Slot => "SlotContent",
            RecordTag::InventoryItem => "InventoryItem",
            RecordTag::Inventory => "Inventory",
            RecordTag::InventoryEntry => "InventoryItemData",
            RecordTag::Stash => "StashData",
            RecordTag::Vector => "Vector3",
            RecordTag::Quest => "QuestSaveData",
            RecordTag::Quests => "QuestData",
            RecordTag::Economy => "EconomyData",
            RecordTag::MasterKey => "MasterKey",
            RecordTag::GameClock => "GameClock",
            RecordTag::Version => "VersionData",
            RecordTag::Face => "CustomFaceSettingData",
            RecordTag::FaceHead => "CustomFaceHeadSetting",
            RecordTag::FacePart => "CustomFacePartInfo",
            RecordTag::Color => "Color",
        }
    }
}

/// Strips the assembly qualifier, generic arguments and namespace from a
/// stored type name.
///
/// ```
/// use raidsave::normalize_type_name;
///
/// assert_eq!(normalize_type_name("TeamSoda.Duckov.ItemTreeData,Assembly-CSharp"), "ItemTreeData");
/// assert_eq!(normalize_type_name("Saves.Outer+StashData"), "StashData");
/// assert_eq!(normalize_type_name("System.Collections.Generic.List`1[[System.Int32]]"), "List");
/// ```
pub fn normalize_type_name(name: &str) -> &str {
    let name = name.split_once(',').map_or(name, |(head, _)| head);
    let name = name
        .find(|c: char| matches!(c, '`' | '[' | '<'))
        .map_or(name, |i| &name[..i]);
    let name = name.rsplit(|c: char| c == '.' || c == '+').next().unwrap_or(name);
    name.trim()
}

/// A shape that can be read out of a record
pub trait FromNode: Default {
    /// The tag records of this shape carry when they carry one
    const TAG: RecordTag;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self;
}

/// A top level value after tag dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    ItemTree(ItemTreeData),
    Item(ItemEntry),
    Variable(ItemVariable),
    Slot(SlotContent),
    InventoryItem(InventoryItem),
    Inventory(Inventory),
    InventoryEntry(InventoryItemData),
    Stash(StashData),
    Vector(WorldPosition),
    Quest(QuestSaveData),
    Quests(QuestData),
    Economy(EconomyData),
    MasterKey(MasterKey),
    GameClock(GameClock),
    Version(VersionData),
    Face(CustomFaceSettingData),
    FaceHead(HeadSetting),
    FacePart(PartInfo),
    Color(Color),

    /// Anything without a recognized tag, kept as it was read
    Opaque(Node),
}

impl Section {
    pub fn tag(&self) -> Option<RecordTag> {
        let tag = match self {
            Section::ItemTree(_) => RecordTag::ItemTree,
            Section::Item(_) => RecordTag::Item,
            Section::Variable(_) => RecordTag::Variable,
            Section::Slot(_) => RecordTag::Slot,
            Section::InventoryItem(_) => RecordTag::InventoryItem,
            Section::Inventory(_) => RecordTag::Inventory,
            Section::InventoryEntry(_) => RecordTag::InventoryEntry,
            Section::Stash(_) => RecordTag::Stash,
            Section::Vector(_) => RecordTag::Vector,
            Section::Quest(_) => RecordTag::Quest,
            Section::Quests(_) => RecordTag::Quests,
            Section::Economy(_) => RecordTag::Economy,
            Section::MasterKey(_) => RecordTag::MasterKey,
            Section::GameClock(_) => RecordTag::GameClock,
            Section::Version(_) => RecordTag::Version,
            Section::Face(_) => RecordTag::Face,
            Section::FaceHead(_) => RecordTag::FaceHead,
            Section::FacePart(_) => RecordTag::FacePart,
            Section::Color(_) => RecordTag::Color,
            Section::Opaque(_) => return None,
        };

        Some(tag)
    }
}

#[derive(Debug)]
enum Segment {
    Key(String),
    Field(&'static str),
    Index(usize),
}

/// Decodes nodes into typed shapes while recording every field that had
/// to be defaulted.
///
/// ```
/// use raidsave::{GraphDecoder, Node, Record};
/// use raidsave::model::GameClock;
///
/// let record = Record::new(Some(String::from("GameClock")), vec![]);
/// let mut de = GraphDecoder::new();
/// let clock: GameClock = de.entry("GameClock", |de| de.decode(&Node::Record(record)));
/// assert_eq!(clock.days, 0);
///
/// let skipped = de.into_skipped();
/// assert_eq!(skipped[0].to_string(), "GameClock.days: missing");
/// ```
#[derive(Debug, Default)]
pub struct GraphDecoder {
    path: Vec<Segment>,
    skipped: Vec<SkippedField>,
}

impl GraphDecoder {
    pub fn new() -> Self {
        GraphDecoder::default()
    }

    /// Fields defaulted so far
    pub fn skipped(&self) -> &[SkippedField] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<SkippedField> {
        self.skipped
    }

    /// Runs `f` with the path rooted at a top level entry key
    pub fn entry<T>(&mut self, key: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scoped(Segment::Key(key.to_owned()), f)
    }

    fn scoped<T>(&mut self, segment: Segment, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(segment);
        let result = f(self);
        self.path.pop();
        result
    }

    fn path_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            match segment {
                Segment::Key(key) => out.push_str(key),
                Segment::Field(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(name);
                }
                Segment::Index(i) => {
                    let _ = write!(out, "[{}]", i);
                }
            }
        }
        out
    }

    /// Records the current location as skipped
    pub fn skip(&mut self, reason: SkipReason) {
        let field = SkippedField::new(self.path_string(), reason);
        log::debug!("defaulting {}", field);
        self.skipped.push(field);
    }

    /// Decodes a node as `T`.
    ///
    /// A record of another known shape, or a node that is not a record,
    /// yields the default. Untagged records and records with an unknown
    /// tag are decoded by shape.
    pub fn decode<T: FromNode>(&mut self, node: &Node) -> T {
        let record = match node {
            Node::Record(record) => record,
            Node::Null => return T::default(),
            _ => {
                self.skip(SkipReason::Mistyped {
                    expected: T::TAG.name(),
                });
                return T::default();
            }
        };

        if let Some(found) = record.tag() {
            match RecordTag::from_type_name(found) {
                Some(tag) if tag != T::TAG => {
                    self.skip(SkipReason::UnexpectedTag {
                        expected: T::TAG.name(),
                        found: found.to_owned(),
                    });
                    return T::default();
                }
                _ => {}
            }
        }

        T::from_record(record, self)
    }

    /// Decodes every element of an array node as `T`
    pub fn decode_list<T: FromNode>(&mut self, node: &Node) -> Vec<T> {
        match node {
            Node::Array(values) => values
                .iter()
                .enumerate()
                .map(|(i, value)| self.scoped(Segment::Index(i), |de| de.decode(value)))
                .collect(),
            Node::Null => Vec::new(),
            _ => {
                self.skip(SkipReason::Mistyped { expected: "array" });
                Vec::new()
            }
        }
    }

    /// Decodes an array of integers, leaving out elements that are not
    pub fn decode_i32_list(&mut self, node: &Node) -> Vec<i32> {
        match node {
            Node::Array(values) => {
                let mut out = Vec::with_capacity(values.len());
                for (i, value) in values.iter().enumerate() {
                    match value.as_i32() {
                        Some(x) => out.push(x),
                        None => self.scoped(Segment::Index(i), |de| {
                            de.skip(SkipReason::Mistyped { expected: "i32" })
                        }),
                    }
                }
                out
            }
            Node::Null => Vec::new(),
            _ => {
                self.skip(SkipReason::Mistyped { expected: "array" });
                Vec::new()
            }
        }
    }

    /// Dispatches on the node's tag
    pub fn decode_section(&mut self, node: &Node) -> Section {
        let Some(record) = node.as_record() else {
            return Section::Opaque(node.clone());
        };

        let Some(tag) = record.tag().and_then(RecordTag::from_type_name) else {
            return Section::Opaque(node.clone());
        };

        log::debug!("decoding {} section", tag.name());
        match tag {
            RecordTag::ItemTree => Section::ItemTree(FromNode::from_record(record, self)),
            RecordTag::Item => Section::Item(FromNode::from_record(record, self)),
            RecordTag::Variable => Section::Variable(FromNode::from_record(record, self)),
            RecordTag::Slot => Section::Slot(FromNode::from_record(record, self)),
            RecordTag::InventoryItem => Section::InventoryItem(FromNode::from_record(record, self)),
            RecordTag::Inventory => Section::Inventory(FromNode::from_record(record, self)),
            RecordTag::InventoryEntry => {
                Section::InventoryEntry(FromNode::from_record(record, self))
            }
            RecordTag::Stash => Section::Stash(FromNode::from_record(record, self)),
            RecordTag::Vector => Section::Vector(FromNode::from_record(record, self)),
            RecordTag::Quest => Section::Quest(FromNode::from_record(record, self)),
            RecordTag::Quests => Section::Quests(FromNode::from_record(record, self)),
            RecordTag::Economy => Section::Economy(FromNode::from_record(record, self)),
            RecordTag::MasterKey => Section::MasterKey(FromNode::from_record(record, self)),
            RecordTag::GameClock => Section::GameClock(FromNode::from_record(record, self)),
            RecordTag::Version => Section::Version(FromNode::from_record(record, self)),
            RecordTag::Face => Section::Face(FromNode::from_record(record, self)),
            RecordTag::FaceHead => Section::FaceHead(FromNode::from_record(record, self)),
            RecordTag::FacePart => Section::FacePart(FromNode::from_record(record, self)),
            RecordTag::Color => Section::Color(FromNode::from_record(record, self)),
        }
    }

    fn field<T: Default>(
        &mut self,
        record: &Record,
        name: &'static str,
        expected: &'static str,
        convert: impl FnOnce(&Node) -> Option<T>,
    ) -> T {
        self.scoped(Segment::Field(name), |de| match record.get(name) {
            None => {
                de.skip(SkipReason::Missing);
                T::default()
            }
            Some(Node::Null) => T::default(),
            Some(node) => match convert(node) {
                Some(x) => x,
                None => {
                    de.skip(SkipReason::Mistyped { expected });
                    T::default()
                }
            },
        })
    }

    pub fn bool_field(&mut self, record: &Record, name: &'static str) -> bool {
        self.field(record, name, "bool", Node::as_bool)
    }

    pub fn i32_field(&mut self, record: &Record, name: &'static str) -> i32 {
        self.field(record, name, "i32", Node::as_i32)
    }

    pub fn i64_field(&mut self, record: &Record, name: &'static str) -> i64 {
        self.field(record, name, "i64", Node::as_i64)
    }

    pub fn u8_field(&mut self, record: &Record, name: &'static str) -> u8 {
        self.field(record, name, "u8", |x| {
            x.as_i64().and_then(|x| u8::try_from(x).ok())
        })
    }

    pub fn f32_field(&mut self, record: &Record, name: &'static str) -> f32 {
        self.field(record, name, "f32", |x| x.as_f64().map(|x| x as f32))
    }

    /// A string field. A null value reads as the empty string.
    pub fn string_field(&mut self, record: &Record, name: &'static str) -> String {
        self.field(record, name, "string", |x| x.as_str().map(String::from))
    }

    pub fn record_field<T: FromNode>(&mut self, record: &Record, name: &'static str) -> T {
        self.scoped(Segment::Field(name), |de| match record.get(name) {
            Some(node) => de.decode(node),
            None => {
                de.skip(SkipReason::Missing);
                T::default()
            }
        })
    }

    pub fn list_field<T: FromNode>(&mut self, record: &Record, name: &'static str) -> Vec<T> {
        self.scoped(Segment::Field(name), |de| match record.get(name) {
            Some(node) => de.decode_list(node),
            None => {
                de.skip(SkipReason::Missing);
                Vec::new()
            }
        })
    }

    pub fn i32_list_field(&mut self, record: &Record, name: &'static str) -> Vec<i32> {
        self.scoped(Segment::Field(name), |de| match record.get(name) {
            Some(node) => de.decode_i32_list(node),
            None => {
                de.skip(SkipReason::Missing);
                Vec::new()
            }
        })
    }
}

/// Picks the first name the record has, falling back to the first
fn aliased(record: &Record, names: &[&'static str]) -> &'static str {
    names
        .iter()
        .copied()
        .find(|name| record.get(name).is_some())
        .unwrap_or(names[0])
}

impl FromNode for ItemVariable {
    const TAG: RecordTag = RecordTag::Variable;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        ItemVariable {
            key: de.string_field(record, "key"),
            data_type: de.u8_field(record, "dataType"),
            data: de.string_field(record, "data"),
            display: de.bool_field(record, "display"),
        }
    }
}

impl FromNode for SlotContent {
    const TAG: RecordTag = RecordTag::Slot;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        SlotContent {
            slot: de.string_field(record, "slot"),
            instance_id: de.i64_field(record, "instanceID"),
        }
    }
}

impl FromNode for InventoryItem {
    const TAG: RecordTag = RecordTag::InventoryItem;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        InventoryItem {
            position: de.i32_field(record, "position"),
            instance_id: de.i64_field(record, "instanceID"),
        }
    }
}

impl FromNode for ItemEntry {
    const TAG: RecordTag = RecordTag::Item;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        ItemEntry {
            instance_id: de.i64_field(record, "instanceID"),
            type_id: de.i32_field(record, "typeID"),
            variables: de.list_field(record, "variables"),
            slot_contents: de.list_field(record, "slotContents"),
            inventory: de.list_field(record, "inventory"),
        }
    }
}

impl FromNode for ItemTreeData {
    const TAG: RecordTag = RecordTag::ItemTree;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        ItemTreeData {
            root_instance_id: de.i64_field(record, "rootInstanceID"),
            entries: de.list_field(record, "entries"),
        }
    }
}

impl FromNode for InventoryItemData {
    const TAG: RecordTag = RecordTag::InventoryEntry;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        InventoryItemData {
            inventory_position: de.i32_field(record, "inventoryPosition"),
            item_tree_data: de.record_field(record, "itemTreeData"),
        }
    }
}

impl FromNode for Inventory {
    const TAG: RecordTag = RecordTag::Inventory;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        Inventory {
            capacity: de.i32_field(record, "capacity"),
            entries: de.list_field(record, "entries"),
        }
    }
}

impl FromNode for WorldPosition {
    const TAG: RecordTag = RecordTag::Vector;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        WorldPosition {
            x: de.f32_field(record, "x"),
            y: de.f32_field(record, "y"),
            z: de.f32_field(record, "z"),
        }
    }
}

impl FromNode for StashData {
    const TAG: RecordTag = RecordTag::Stash;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        StashData {
            valid: de.bool_field(record, "valid"),
            raid_id: de.i32_field(record, "raidID"),
            sub_scene_id: de.string_field(record, "subSceneID"),
            world_position: de.record_field(record, "worldPosition"),
            item_tree_data: de.record_field(record, "itemTreeData"),
            spawned: de.bool_field(record, "spawned"),
            touched: de.bool_field(record, "touched"),
        }
    }
}

impl FromNode for QuestSaveData {
    const TAG: RecordTag = RecordTag::Quest;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        QuestSaveData {
            id: de.i32_field(record, "id"),
            complete: de.bool_field(record, "complete"),
            need_inspection: de.bool_field(record, "needInspection"),
            quest_giver_id: de.i32_field(record, "questGiverID"),
        }
    }
}

impl FromNode for QuestData {
    const TAG: RecordTag = RecordTag::Quests;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        let inspected = aliased(record, &["everInspectedData", "everInspectedQuest"]);
        QuestData {
            active_quests: de.list_field(record, "activeQuestsData"),
            history_quests: de.list_field(record, "historyQuestsData"),
            ever_inspected: de.i32_list_field(record, inspected),
        }
    }
}

impl FromNode for EconomyData {
    const TAG: RecordTag = RecordTag::Economy;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        EconomyData {
            money: de.i64_field(record, "money"),
            unlocked_items: de.i32_list_field(record, "unlockedItems"),
            unlockes_waiting_for_confirm: de.i32_list_field(record, "unlockesWaitingForConfirm"),
        }
    }
}

impl FromNode for MasterKey {
    const TAG: RecordTag = RecordTag::MasterKey;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        MasterKey {
            id: de.i32_field(record, "id"),
            active: de.bool_field(record, "active"),
        }
    }
}

impl FromNode for GameClock {
    const TAG: RecordTag = RecordTag::GameClock;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        GameClock {
            days: de.i32_field(record, "days"),
        }
    }
}

impl FromNode for VersionData {
    const TAG: RecordTag = RecordTag::Version;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        VersionData {
            main_version: de.i32_field(record, "mainVersion"),
            sub_version: de.i32_field(record, "subVersion"),
            build_version: de.i32_field(record, "buildVersion"),
            suffix: de.string_field(record, "suffix"),
        }
    }
}

impl FromNode for Color {
    const TAG: RecordTag = RecordTag::Color;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        Color {
            r: de.f32_field(record, "r"),
            g: de.f32_field(record, "g"),
            b: de.f32_field(record, "b"),
            a: de.f32_field(record, "a"),
        }
    }
}

impl FromNode for HeadSetting {
    const TAG: RecordTag = RecordTag::FaceHead;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        HeadSetting {
            main_color: de.record_field(record, "mainColor"),
            head_scale_offset: de.f32_field(record, "headScaleOffset"),
            forehead_height: de.f32_field(record, "foreheadHeight"),
            forehead_round: de.f32_field(record, "foreheadRound"),
        }
    }
}

impl FromNode for PartInfo {
    const TAG: RecordTag = RecordTag::FacePart;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        PartInfo {
            radius: de.f32_field(record, "radius"),
            color: de.record_field(record, "color"),
            height: de.f32_field(record, "height"),
            height_offset: de.f32_field(record, "heightOffset"),
            scale: de.f32_field(record, "scale"),
            twist: de.f32_field(record, "twist"),
            distance_angle: de.f32_field(record, "distanceAngle"),
            left_right_angle: de.f32_field(record, "leftRightAngle"),
        }
    }
}

impl FromNode for CustomFaceSettingData {
    const TAG: RecordTag = RecordTag::Face;

    fn from_record(record: &Record, de: &mut GraphDecoder) -> Self {
        CustomFaceSettingData {
            saved_setting: de.bool_field(record, "savedSetting"),
            head_setting: de.record_field(record, "headSetting"),
            hair_id: de.i32_field(record, "hairId"),
            hair_info: de.record_field(record, "hairInfo"),
            eye_id: de.i32_field(record, "eyeId"),
            eye_info: de.record_field(record, "eyeInfo"),
            eyebrow_id: de.i32_field(record, "eyebrowId"),
            eyebrow_info: de.record_field(record, "eyebrowInfo"),
            mouth_id: de.i32_field(record, "mouthId"),
            mouth_info: de.record_field(record, "mouthInfo"),
            tail_id: de.i32_field(record, "tailId"),
            tail_info: de.record_field(record, "tailInfo"),
            foot_id: de.i32_field(record, "footId"),
            foot_info: de.record_field(record, "footInfo"),
            wing_id: de.i32_field(record, "wingId"),
            wing_info: de.record_field(record, "wingInfo"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn record(tag: Option<&str>, fields: Vec<(&str, Node)>) -> Node {
        Node::Record(Record::new(
            tag.map(String::from),
            fields
                .into_iter()
                .map(|(k, v)| (String::from(k), v))
                .collect(),
        ))
    }

    fn s(x: &str) -> Node {
        Node::Str(String::from(x))
    }

    #[rstest]
    #[case("ItemTreeData", Some(RecordTag::ItemTree))]
    #[case("ItemTreeData,Assembly-CSharp", Some(RecordTag::ItemTree))]
    #[case("TeamSoda.Duckov.Core.StashData, TeamSoda.Duckov.Core", Some(RecordTag::Stash))]
    #[case("UnityEngine.Vector3,UnityEngine.CoreModule", Some(RecordTag::Vector))]
    #[case("Saves.QuestManager+QuestData", Some(RecordTag::Quests))]
    #[case("System.Collections.Generic.List`1[[QuestSaveData]]", None)]
    #[case("", None)]
    #[case("Dictionary<int,int>", None)]
    fn test_tag_lookup(#[case] input: &str, #[case] expected: Option<RecordTag>) {
        assert_eq!(RecordTag::from_type_name(input), expected);
    }

    #[test]
    fn test_tag_names_round_trip() {
        let tags = [
            RecordTag::ItemTree,
            RecordTag::Item,
            RecordTag::Variable,
            RecordTag::Slot,
            RecordTag::InventoryItem,
            RecordTag::Inventory,
            RecordTag::InventoryEntry,
            RecordTag::Stash,
            RecordTag::Vector,
            RecordTag::Quest,
            RecordTag::Quests,
            RecordTag::Economy,
            RecordTag::MasterKey,
            RecordTag::GameClock,
            RecordTag::Version,
            RecordTag::Face,
            RecordTag::FaceHead,
            RecordTag::FacePart,
            RecordTag::Color,
        ];

        for tag in tags {
            assert_eq!(RecordTag::from_type_name(tag.name()), Some(tag));
        }
    }

    #[test]
    fn test_decode_item_tree() {
        let variable = record(
            Some("ItemVariable"),
            vec![
                ("key", s("Count")),
                ("dataType", Node::Int(2)),
                ("data", s("05000000")),
                ("display", Node::Bool(true)),
            ],
        );
        let entry = record(
            Some("ItemEntry"),
            vec![
                ("instanceID", Node::Int(-12)),
                ("typeID", Node::Int(254)),
                ("variables", Node::Array(vec![variable])),
                (
                    "slotContents",
                    Node::Array(vec![record(
                        None,
                        vec![("slot", s("Scope")), ("instanceID", Node::Int(-13))],
                    )]),
                ),
                ("inventory", Node::Array(vec![])),
            ],
        );
        let tree = record(
            Some("ItemTreeData"),
            vec![
                ("rootInstanceID", Node::Int(-12)),
                ("entries", Node::Array(vec![entry])),
            ],
        );

        let mut de = GraphDecoder::new();
        let actual: ItemTreeData = de.decode(&tree);
        assert!(de.skipped().is_empty());
        assert_eq!(actual.root_instance_id, -12);
        assert_eq!(actual.entries[0].type_id, 254);
        assert_eq!(actual.entries[0].slot_contents[0].slot, "Scope");
        assert_eq!(actual.entries[0].slot_contents[0].instance_id, -13);
        assert_eq!(actual.entries[0].variables[0].data, "05000000");
    }

    #[test]
    fn test_missing_and_mistyped_fields_default() {
        let quest = record(
            Some("QuestSaveData"),
            vec![
                ("id", s("seven")),
                ("complete", Node::Bool(true)),
                ("needInspection", Node::Int(0)),
            ],
        );
        let quests = record(
            None,
            vec![
                ("activeQuestsData", Node::Array(vec![quest])),
                ("historyQuestsData", Node::Null),
                ("everInspectedQuest", Node::Array(vec![Node::Int(1), s("x"), Node::Int(3)])),
            ],
        );

        let mut de = GraphDecoder::new();
        let actual: QuestData = de.entry("Quests", |de| de.decode(&quests));
        assert_eq!(actual.active_quests[0].id, 0);
        assert!(actual.active_quests[0].complete);
        assert!(!actual.active_quests[0].need_inspection);
        assert!(actual.history_quests.is_empty());
        assert_eq!(actual.ever_inspected, vec![1, 3]);

        let skipped: Vec<_> = de.skipped().iter().map(|x| x.to_string()).collect();
        assert_eq!(
            skipped,
            vec![
                "Quests.activeQuestsData[0].id: expected i32",
                "Quests.activeQuestsData[0].questGiverID: missing",
                "Quests.everInspectedQuest[1]: expected i32",
            ]
        );
    }

    #[test]
    fn test_null_fields_default_silently() {
        let clock = record(Some("GameClock"), vec![("days", Node::Null)]);
        let mut de = GraphDecoder::new();
        let actual: GameClock = de.entry("GameClock", |de| de.decode(&clock));
        assert_eq!(actual.days, 0);
        assert!(de.skipped().is_empty());

        let key = record(None, vec![("id", Node::Null), ("active", s("yes"))]);
        let actual: MasterKey = de.decode(&key);
        assert_eq!(actual, MasterKey::default());
        assert_eq!(de.skipped().len(), 1);
        assert_eq!(de.skipped()[0].to_string(), "active: expected bool");
    }

    #[test]
    fn test_unexpected_tag() {
        let node = record(Some("GameClock"), vec![("days", Node::Int(3))]);
        let mut de = GraphDecoder::new();
        let actual: MasterKey = de.entry("MasterKeys", |de| de.decode(&node));
        assert_eq!(actual, MasterKey::default());
        assert_eq!(
            de.skipped()[0].reason(),
            &SkipReason::UnexpectedTag {
                expected: "MasterKey",
                found: String::from("GameClock"),
            }
        );
    }

    #[test]
    fn test_unknown_tag_decodes_by_shape() {
        let node = record(
            Some("Saves.LegacyClock"),
            vec![("days", Node::Float(12.0))],
        );
        let mut de = GraphDecoder::new();
        let actual: GameClock = de.decode(&node);
        assert_eq!(actual.days, 12);
        assert!(de.skipped().is_empty());
    }

    #[test]
    fn test_non_record_is_mistyped() {
        let mut de = GraphDecoder::new();
        let actual: GameClock = de.entry("GameClock", |de| de.decode(&Node::Int(4)));
        assert_eq!(actual.days, 0);
        assert_eq!(de.skipped()[0].to_string(), "GameClock: expected GameClock");
    }

    #[test]
    fn test_out_of_range_data_type() {
        let node = record(
            None,
            vec![
                ("key", s("a")),
                ("dataType", Node::Int(300)),
                ("data", Node::Null),
                ("display", Node::Bool(false)),
            ],
        );
        let mut de = GraphDecoder::new();
        let actual: ItemVariable = de.decode(&node);
        assert_eq!(actual.data_type, 0);
        assert_eq!(actual.data, "");
        assert_eq!(de.skipped().len(), 1);
        assert_eq!(de.skipped()[0].path(), "dataType");
    }

    #[test]
    fn test_section_dispatch() {
        let mut de = GraphDecoder::new();
        let clock = record(Some("GameClock,Assembly-CSharp"), vec![("days", Node::Int(9))]);
        assert_eq!(
            de.decode_section(&clock),
            Section::GameClock(GameClock { days: 9 })
        );

        let unknown = record(Some("UnityEngine.Quaternion"), vec![("w", Node::Float(1.0))]);
        let section = de.decode_section(&unknown);
        assert_eq!(section.tag(), None);
        assert_eq!(section, Section::Opaque(unknown));

        let untagged = record(None, vec![("days", Node::Int(9))]);
        assert!(matches!(de.decode_section(&untagged), Section::Opaque(_)));
        assert!(matches!(de.decode_section(&Node::Int(1)), Section::Opaque(Node::Int(1))));
    }
}
