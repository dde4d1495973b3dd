//! Closed enumerations sampled by the detection subsystem every tick.
//!
//! Unlike the open id spaces in [`crate::ids`], these sets are small and
//! fixed by the engine ABI, so detectors enumerate them exhaustively via
//! `strum::IntoEnumIterator`.

use serde::{Deserialize, Serialize};

use crate::flags::TearFlags;
use crate::ids::{CollectibleType, TrinketType};

/// The slots in which a player can hold an active (rechargeable) item.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[strum(serialize_all = "snake_case")]
pub enum ActiveSlot {
    Primary,
    Secondary,
    Pocket,
    PocketSingle,
}

/// The categories of health a player can hold.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[strum(serialize_all = "snake_case")]
pub enum HealthKind {
    Red,
    Soul,
    Eternal,
    Bone,
    Golden,
    Broken,
    Rotten,
    MaxHearts,
}

/// The transformations a player can hold simultaneously.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[strum(serialize_all = "snake_case")]
pub enum PlayerForm {
    Guppy,
    Beelzebub,
    FunGuy,
    Seraphim,
    Bob,
    SpiderBaby,
    Leviathan,
    PoopBaby,
    Bookworm,
    Adult,
}

/// The per-player statistics the engine recomputes on cache evaluation.
///
/// Each stat has a fixed value kind; [`PlayerStat::default_value`] gives the
/// neutral value of that kind.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[strum(serialize_all = "snake_case")]
pub enum PlayerStat {
    Damage,
    FireDelay,
    ShotSpeed,
    Range,
    Speed,
    Luck,
    Flying,
    TearFlags,
    TearColor,
}

impl PlayerStat {
    /// Returns the neutral value for this stat's value kind.
    pub fn default_value(self) -> StatValue {
        match self {
            Self::Damage | Self::FireDelay | Self::ShotSpeed | Self::Range | Self::Speed
            | Self::Luck => StatValue::Float(0.0),
            Self::Flying => StatValue::Bool(false),
            Self::TearFlags => StatValue::Flags(TearFlags::empty()),
            Self::TearColor => StatValue::Color(StatColor::default()),
        }
    }
}

/// An RGBA color attached to a stat (tear color).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// A sampled stat value.
///
/// Equality is per value kind: numeric, boolean, flag-set, or per-component
/// color equality. Only numeric kinds produce a nonzero delta.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Flags(TearFlags),
    Color(StatColor),
}

impl StatValue {
    /// Returns the numeric difference `self - previous`, or `0.0` when either
    /// value is non-numeric.
    pub fn numeric_delta(&self, previous: &Self) -> f64 {
        match (self, previous) {
            (Self::Int(new), Self::Int(old)) => (*new - *old) as f64,
            (Self::Float(new), Self::Float(old)) => new - old,
            (Self::Int(new), Self::Float(old)) => *new as f64 - old,
            (Self::Float(new), Self::Int(old)) => new - *old as f64,
            _ => 0.0,
        }
    }
}

/// The broad item categories a queued pickup can belong to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    Collectible,
    Trinket,
}

/// An item a player is holding above their head, before it lands in the
/// inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PickingUpItem {
    Collectible(CollectibleType),
    Trinket(TrinketType),
}

impl PickingUpItem {
    pub fn kind(self) -> ItemKind {
        match self {
            Self::Collectible(_) => ItemKind::Collectible,
            Self::Trinket(_) => ItemKind::Trinket,
        }
    }

    /// The raw registry id, regardless of kind.
    pub fn id(self) -> u32 {
        match self {
            Self::Collectible(collectible) => collectible.0,
            Self::Trinket(trinket) => trinket.0,
        }
    }
}
