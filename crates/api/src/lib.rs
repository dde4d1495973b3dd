//! Read-only surface of the host game engine, as seen by mod code.
//!
//! `modkit-api` defines the typed identifiers, closed enums, and flag sets
//! that the host engine exposes, together with the [`GameView`] and
//! [`PlayerView`] traits through which all engine state is sampled. The
//! engine itself is an external collaborator; nothing in this crate mutates
//! it. The [`harness`] module provides in-memory implementations of the view
//! traits for driving tests without a running engine.
pub mod enums;
pub mod flags;
pub mod harness;
pub mod host;
pub mod ids;

pub use enums::{
    ActiveSlot, HealthKind, ItemKind, PickingUpItem, PlayerForm, PlayerStat, StatColor, StatValue,
};
pub use flags::{DamageFlags, EntityFlags, TearFlags};
pub use harness::{TestGame, TestPlayer};
pub use host::{GameView, PlayerView};
pub use ids::{CollectibleType, EntityType, NpcVariant, PlayerType, Seed, TrinketType};
