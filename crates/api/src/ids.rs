//! Open-set numeric identifiers mirroring the host engine's registries.
//!
//! The engine identifies collectibles, trinkets, characters, and entity kinds
//! by plain integers. These newtypes keep the integer spaces apart at the type
//! level. Only the identifiers that the detection subsystem itself consults
//! are given named constants; mods are free to construct any other value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a collectible item in the host engine's item registry.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CollectibleType(pub u32);

impl CollectibleType {
    /// Sentinel for "no collectible", e.g. an empty active slot.
    pub const NONE: Self = Self(0);

    pub const SAD_ONION: Self = Self(1);
    pub const INNER_EYE: Self = Self(2);
    pub const SPOON_BENDER: Self = Self(3);
    pub const PONY: Self = Self(130);
    pub const WHITE_PONY: Self = Self(181);
    pub const D100: Self = Self(283);
    pub const D4: Self = Self(284);
    pub const BROKEN_GLASS_CANNON: Self = Self(474);
    pub const BERSERK: Self = Self(704);

    /// Returns true if this is the "no collectible" sentinel.
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl fmt::Display for CollectibleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collectible#{}", self.0)
    }
}

/// Identifier of a trinket in the host engine's item registry.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TrinketType(pub u32);

impl TrinketType {
    pub const NONE: Self = Self(0);
    pub const WISH_BONE: Self = Self(104);
    pub const WALNUT: Self = Self(108);
}

impl fmt::Display for TrinketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trinket#{}", self.0)
    }
}

/// Identifier of a playable character.
///
/// Some characters are alternate faces of the same save slot (the
/// [`FORGOTTEN`](Self::FORGOTTEN) / [`SOUL`](Self::SOUL) pair shares one
/// inventory and one init seed); player-index derivation special-cases them.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerType(pub u32);

impl PlayerType {
    pub const ISAAC: Self = Self(0);
    pub const FORGOTTEN: Self = Self(16);
    pub const SOUL: Self = Self(17);
}

impl fmt::Display for PlayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "character#{}", self.0)
    }
}

/// Identifier of an entity kind (players, NPCs, effects, ...).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityType(pub u32);

impl EntityType {
    pub const NONE: Self = Self(0);
    pub const PLAYER: Self = Self(1);
    pub const SUCKER: Self = Self(61);
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Sub-kind of an entity type, disambiguating entities that share a type id.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NpcVariant(pub u32);

impl NpcVariant {
    /// The charge-draining variant of [`EntityType::SUCKER`].
    pub const BULB: Self = Self(4);
}

/// A stable RNG seed scalar exposed by the host engine.
///
/// Seeds are the only per-player property documented to survive both frame
/// churn and a save/continue cycle, which is why player identity is derived
/// from them rather than from handles or slot indices.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Seed(pub u64);

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
