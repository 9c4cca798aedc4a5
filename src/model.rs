//! The typed save record and its parts.
//!
//! Field names serialize exactly as the presentation layer expects them,
//! which is why a few of them keep the game's own spelling
//! (`unlockesWaitingForConfirm`, `save_time`).

use crate::value::{decode_typed_value, TypedValue};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// The fully decoded save
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    pub version: String,
    pub level: i32,
    pub exp: i64,
    pub health: f32,
    #[serde(rename = "gameClock")]
    pub game_clock: GameClock,
    #[serde(rename = "economyData")]
    pub economy_data: EconomyData,
    #[serde(rename = "masterKeys")]
    pub master_keys: Vec<MasterKey>,
    #[serde(rename = "deathList")]
    pub death_list: Vec<StashData>,
    pub quests: QuestData,
    pub inventory: Vec<i32>,
    pub kills: Vec<Kill>,
    pub save_time: i64,
    #[serde(rename = "playerStorage")]
    pub player_storage: Inventory,
    #[serde(rename = "inventorySafe")]
    pub inventory_safe: Inventory,
    #[serde(rename = "characterItemData")]
    pub character_item_data: ItemTreeData,
}

/// The game build that wrote the save
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionData {
    pub main_version: i32,
    pub sub_version: i32,
    pub build_version: i32,
    pub suffix: String,
}

impl fmt::Display for VersionData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}{}",
            self.main_version, self.sub_version, self.build_version, self.suffix
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    pub days: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyData {
    pub money: i64,
    #[serde(rename = "unlockedItems")]
    pub unlocked_items: Vec<i32>,
    #[serde(rename = "unlockesWaitingForConfirm")]
    pub unlockes_waiting_for_confirm: Vec<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterKey {
    pub id: i32,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kill {
    #[serde(rename = "masterName")]
    pub master_name: String,
    pub count: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSaveData {
    pub id: i32,
    pub complete: bool,
    #[serde(rename = "needInspection")]
    pub need_inspection: bool,
    #[serde(rename = "questGiverID")]
    pub quest_giver_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestData {
    #[serde(rename = "activeQuestsData")]
    pub active_quests: Vec<QuestSaveData>,
    #[serde(rename = "historyQuestsData")]
    pub history_quests: Vec<QuestSaveData>,
    #[serde(rename = "everInspectedData")]
    pub ever_inspected: Vec<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Gear left behind on death
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StashData {
    pub valid: bool,
    #[serde(rename = "raidID")]
    pub raid_id: i32,
    #[serde(rename = "subSceneID")]
    pub sub_scene_id: String,
    pub world_position: WorldPosition,
    pub item_tree_data: ItemTreeData,
    pub spawned: bool,
    pub touched: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub capacity: i32,
    pub entries: Vec<InventoryItemData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemData {
    pub inventory_position: i32,
    pub item_tree_data: ItemTreeData,
}

/// Linear RGBA, each channel in `0.0..=1.0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadSetting {
    pub main_color: Color,
    pub head_scale_offset: f32,
    pub forehead_height: f32,
    pub forehead_round: f32,
}

/// Placement of one face part
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartInfo {
    pub radius: f32,
    pub color: Color,
    pub height: f32,
    pub height_offset: f32,
    pub scale: f32,
    pub twist: f32,
    pub distance_angle: f32,
    pub left_right_angle: f32,
}

/// The main character's appearance.
///
/// Not part of [`Archive`]. Read it with
/// [`EntryTable::custom_face`](crate::EntryTable::custom_face).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFaceSettingData {
    pub saved_setting: bool,
    pub head_setting: HeadSetting,
    pub hair_id: i32,
    pub hair_info: PartInfo,
    pub eye_id: i32,
    pub eye_info: PartInfo,
    pub eyebrow_id: i32,
    pub eyebrow_info: PartInfo,
    pub mouth_id: i32,
    pub mouth_info: PartInfo,
    pub tail_id: i32,
    pub tail_info: PartInfo,
    pub foot_id: i32,
    pub foot_info: PartInfo,
    pub wing_id: i32,
    pub wing_info: PartInfo,
}

/// A raw item variable. The payload stays encoded; see [`ItemVariable::value`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemVariable {
    pub key: String,
    pub data_type: u8,
    pub data: String,
    pub display: bool,
}

impl ItemVariable {
    /// Decodes the payload according to the variable's data type
    pub fn value(&self) -> TypedValue {
        decode_typed_value(self.data_type, &self.data)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotContent {
    pub slot: String,
    #[serde(rename = "instanceID")]
    pub instance_id: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub position: i32,
    #[serde(rename = "instanceID")]
    pub instance_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEntry {
    #[serde(rename = "instanceID")]
    pub instance_id: i64,
    #[serde(rename = "typeID")]
    pub type_id: i32,
    pub variables: Vec<ItemVariable>,
    pub slot_contents: Vec<SlotContent>,
    pub inventory: Vec<InventoryItem>,
}

impl ItemEntry {
    /// Instance ids this item holds, slots first and then inventory
    pub fn child_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.slot_contents
            .iter()
            .map(|x| x.instance_id)
            .chain(self.inventory.iter().map(|x| x.instance_id))
    }

    /// Finds a variable by key
    pub fn variable(&self, key: &str) -> Option<&ItemVariable> {
        self.variables.iter().find(|x| x.key == key)
    }
}

/// Items stored flat, linked by instance id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTreeData {
    #[serde(rename = "rootInstanceID")]
    pub root_instance_id: i64,
    pub entries: Vec<ItemEntry>,
}

impl ItemTreeData {
    pub fn get(&self, instance_id: i64) -> Option<&ItemEntry> {
        self.entries.iter().find(|x| x.instance_id == instance_id)
    }

    /// The entry whose id is the root id
    pub fn root(&self) -> Option<&ItemEntry> {
        self.get(self.root_instance_id)
    }

    /// Visits the root and everything reachable from it, depth first.
    ///
    /// Every instance id is visited at most once, so cyclic references end
    /// the walk instead of looping. Ids without an entry are passed over.
    /// The visitor receives each entry with its depth below the root.
    pub fn walk<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a ItemEntry, usize),
    {
        let mut seen = HashSet::new();
        let mut stack = vec![(self.root_instance_id, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }

            let Some(entry) = self.get(id) else {
                continue;
            };

            visit(entry, depth);
            let children: Vec<_> = entry.child_ids().collect();
            stack.extend(children.into_iter().rev().map(|x| (x, depth + 1)));
        }
    }

    /// Entries reachable from the root in walk order
    pub fn reachable(&self) -> Vec<&ItemEntry> {
        let mut out = Vec::new();
        self.walk(|entry, _| out.push(entry));
        out
    }
}
