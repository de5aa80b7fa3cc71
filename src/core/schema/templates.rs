//! Item schema templates
//!
//! Each template is the canonical default-value tree for one item category.
//! The frontend reads these documents to build its item forms, so the
//! serialized field names are part of the wire contract and are kept exactly
//! (Italian names included).

use crate::domain::{fields_from_json, BastionError, Fields, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Level thresholds at which item parameters progress
pub const PROGRESSION_LEVELS: [&str; 4] = ["1", "4", "7", "10"];

/// Base character stats
pub const BASE_STATS: [&str; 6] = [
    "Fortuna",
    "Destrezza",
    "Costituzione",
    "Intelligenza",
    "Saggezza",
    "Forza",
];

/// Combat stats
pub const COMBAT_STATS: [&str; 7] = [
    "Difesa",
    "Salute",
    "Critico",
    "Attacco",
    "RiduzioneDanni",
    "Disciplina",
    "Mira",
];

/// A parameter value: a flat number or a dice expression such as `1d8`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressionValue {
    Number(i64),
    Dice(String),
}

impl Default for ProgressionValue {
    fn default() -> Self {
        ProgressionValue::Number(0)
    }
}

/// Parameter value at each progression level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionTable {
    #[serde(rename = "1")]
    pub level_1: ProgressionValue,
    #[serde(rename = "4")]
    pub level_4: ProgressionValue,
    #[serde(rename = "7")]
    pub level_7: ProgressionValue,
    #[serde(rename = "10")]
    pub level_10: ProgressionValue,
}

impl ProgressionTable {
    /// Same value at every level
    pub fn flat(value: ProgressionValue) -> Self {
        Self {
            level_1: value.clone(),
            level_4: value.clone(),
            level_7: value.clone(),
            level_10: value,
        }
    }

    /// Same dice expression at every level
    pub fn dice(expression: &str) -> Self {
        Self::flat(ProgressionValue::Dice(expression.to_string()))
    }
}

/// Stat name to progression table
pub type StatGroup = BTreeMap<String, ProgressionTable>;

fn zeroed_group(stats: &[&str]) -> StatGroup {
    stats
        .iter()
        .map(|stat| (stat.to_string(), ProgressionTable::default()))
        .collect()
}

/// The `Parametri` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(rename = "Base")]
    pub base: StatGroup,
    #[serde(rename = "Combattimento")]
    pub combat: StatGroup,
    #[serde(rename = "Special")]
    pub special: StatGroup,
}

impl Parameters {
    /// Zeroed base and combat groups plus the given special group
    pub fn with_special(special: StatGroup) -> Self {
        Self {
            base: zeroed_group(&BASE_STATS),
            combat: zeroed_group(&COMBAT_STATS),
            special,
        }
    }
}

/// The `General` section, shared by every category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct General {
    #[serde(rename = "Nome")]
    pub name: String,
    /// Equip slots the item may go in
    #[serde(rename = "Slot")]
    pub slot: Vec<String>,
    #[serde(rename = "Effetto")]
    pub effect: String,
    #[serde(rename = "prezzo")]
    pub price: i64,
    pub image_url: String,
    /// Technique name to cost reduction
    #[serde(rename = "ridCostoTecSingola")]
    pub technique_cost_reduction: BTreeMap<String, i64>,
    /// Spell name to cost reduction
    #[serde(rename = "ridCostoSpellSingola")]
    pub spell_cost_reduction: BTreeMap<String, i64>,
}

impl General {
    fn with_slots(slots: &[&str]) -> Self {
        Self {
            name: String::new(),
            slot: slots.iter().map(|s| s.to_string()).collect(),
            effect: String::new(),
            price: 0,
            image_url: String::new(),
            technique_cost_reduction: BTreeMap::new(),
            spell_cost_reduction: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorSpecific {
    /// Armor weight class options
    #[serde(rename = "Tipo")]
    pub kind: Vec<String>,
    #[serde(rename = "slotCapacity")]
    pub slot_capacity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSpecific {
    /// Hands needed to wield, as options
    #[serde(rename = "Hands")]
    pub hands: Vec<i64>,
    /// Weapon class options
    #[serde(rename = "Tipo")]
    pub kind: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorySpecific {
    #[serde(rename = "slotCapacity")]
    pub slot_capacity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableSpecific {
    pub stackable: bool,
    #[serde(rename = "maxStack")]
    pub max_stack: i64,
    pub effects: Vec<String>,
}

/// A full template: the three sections, with a category-specific middle one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate<S> {
    #[serde(rename = "General")]
    pub general: General,
    #[serde(rename = "Specific")]
    pub specific: S,
    #[serde(rename = "Parametri")]
    pub parameters: Parameters,
}

/// Template of one item category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SchemaTemplate {
    Armor(ItemTemplate<ArmorSpecific>),
    Weapon(ItemTemplate<WeaponSpecific>),
    Accessory(ItemTemplate<AccessorySpecific>),
    Consumable(ItemTemplate<ConsumableSpecific>),
}

impl SchemaTemplate {
    /// Convert to document fields
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::Serialization`] if the template cannot be
    /// serialized.
    pub fn to_fields(&self) -> Result<Fields> {
        Ok(fields_from_json(serde_json::to_value(self)?))
    }
}

/// Item categories with a schema template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Armor,
    Weapon,
    Accessory,
    Consumable,
}

impl TemplateKind {
    /// Every category, in seeding order
    pub const ALL: [TemplateKind; 4] = [
        TemplateKind::Armor,
        TemplateKind::Weapon,
        TemplateKind::Accessory,
        TemplateKind::Consumable,
    ];

    /// Collection holding every schema document
    pub const COLLECTION: &'static str = "utils";

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Armor => "armor",
            TemplateKind::Weapon => "weapon",
            TemplateKind::Accessory => "accessory",
            TemplateKind::Consumable => "consumable",
        }
    }

    /// Id of the schema document in [`COLLECTION`](Self::COLLECTION)
    pub fn document_id(&self) -> &'static str {
        match self {
            TemplateKind::Armor => "schema_armatura",
            TemplateKind::Weapon => "schema_arma",
            TemplateKind::Accessory => "schema_accessorio",
            TemplateKind::Consumable => "schema_consumabile",
        }
    }

    /// Build the canonical template
    pub fn template(&self) -> SchemaTemplate {
        match self {
            TemplateKind::Armor => SchemaTemplate::Armor(ItemTemplate {
                general: General::with_slots(&["Testa", "Corpo", "Cintura", "Stivali"]),
                specific: ArmorSpecific {
                    kind: vec!["Leggera".into(), "Media".into(), "Pesante".into()],
                    slot_capacity: 0,
                },
                parameters: Parameters::with_special(cost_reduction_group()),
            }),
            TemplateKind::Weapon => SchemaTemplate::Weapon(ItemTemplate {
                general: General::with_slots(&["Mano Principale", "Mano Secondaria", "Fodero"]),
                specific: WeaponSpecific {
                    hands: vec![1, 2],
                    kind: vec!["Mischia".into(), "Distanza".into(), "Magica".into()],
                },
                parameters: Parameters::with_special(weapon_special_group()),
            }),
            TemplateKind::Accessory => SchemaTemplate::Accessory(ItemTemplate {
                general: General::with_slots(&["Accessorio"]),
                specific: AccessorySpecific { slot_capacity: 0 },
                parameters: Parameters::with_special(cost_reduction_group()),
            }),
            TemplateKind::Consumable => SchemaTemplate::Consumable(ItemTemplate {
                general: General::with_slots(&["Cintura"]),
                specific: ConsumableSpecific {
                    stackable: true,
                    max_stack: 1,
                    effects: Vec::new(),
                },
                parameters: Parameters::with_special(StatGroup::new()),
            }),
        }
    }
}

fn weapon_special_group() -> StatGroup {
    let mut group = zeroed_group(&["Penetrazione", "Bonus Danno", "Bonus Danno Critico"]);
    group.insert("Danno".to_string(), ProgressionTable::dice("1d4"));
    group.insert("Danno Critico".to_string(), ProgressionTable::dice("1d4"));
    group
}

fn cost_reduction_group() -> StatGroup {
    zeroed_group(&["ridCostoTec", "ridCostoSpell"])
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = BastionError;

    /// Accepts the English and Italian category names, case-insensitively
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "armor" | "armatura" => Ok(TemplateKind::Armor),
            "weapon" | "arma" => Ok(TemplateKind::Weapon),
            "accessory" | "accessorio" => Ok(TemplateKind::Accessory),
            "consumable" | "consumabile" => Ok(TemplateKind::Consumable),
            _ => Err(BastionError::UnknownTemplate(format!(
                "'{s}' (expected one of: armor, weapon, accessory, consumable)"
            ))),
        }
    }
}
