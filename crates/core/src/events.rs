//! Semantic events produced by the detectors.
//!
//! Events are plain owned data: the player is identified by
//! [`PlayerIndex`], never by a borrowed engine handle, so subscribers can
//! store or defer them freely. Each event defines its filter argument(s) by
//! implementing [`FilteredEvent`].

use modkit_api::{
    ActiveSlot, CollectibleType, DamageFlags, EntityType, HealthKind, ItemKind, PickingUpItem,
    PlayerForm, PlayerStat, StatValue, TrinketType,
};

use crate::dispatch::FilteredEvent;
use crate::player_index::PlayerIndex;

/// A player gained one copy of a collectible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectibleAdded {
    pub player: PlayerIndex,
    pub collectible: CollectibleType,
}

impl FilteredEvent for CollectibleAdded {
    type Filter = CollectibleType;

    fn matches(&self, filter: &Self::Filter) -> bool {
        self.collectible == *filter
    }
}

/// A player lost one copy of a collectible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectibleRemoved {
    pub player: PlayerIndex,
    pub collectible: CollectibleType,
}

impl FilteredEvent for CollectibleRemoved {
    type Filter = CollectibleType;

    fn matches(&self, filter: &Self::Filter) -> bool {
        self.collectible == *filter
    }
}

/// A recomputed stat differs from the previous frame.
///
/// `delta` is `current - previous` for numeric stat kinds and `0.0`
/// otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatChanged {
    pub player: PlayerIndex,
    pub stat: PlayerStat,
    pub previous: StatValue,
    pub current: StatValue,
    pub delta: f64,
}

impl FilteredEvent for StatChanged {
    type Filter = PlayerStat;

    fn matches(&self, filter: &Self::Filter) -> bool {
        self.stat == *filter
    }
}

/// The amount of one health category differs from the previous frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthChanged {
    pub player: PlayerIndex,
    pub kind: HealthKind,
    pub previous: i32,
    pub current: i32,
    pub delta: i32,
}

impl FilteredEvent for HealthChanged {
    type Filter = HealthKind;

    fn matches(&self, filter: &Self::Filter) -> bool {
        self.kind == *filter
    }
}

/// A transformation was assembled or lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformationChanged {
    pub player: PlayerIndex,
    pub form: PlayerForm,
    pub active: bool,
}

impl FilteredEvent for TransformationChanged {
    type Filter = PlayerForm;

    fn matches(&self, filter: &Self::Filter) -> bool {
        self.form == *filter
    }
}

/// An active item lost charge by being used, with drain-by-enemy and
/// item-swap false positives already suppressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemDischarged {
    pub player: PlayerIndex,
    pub collectible: CollectibleType,
    pub slot: ActiveSlot,
    pub previous_charge: i32,
    pub current_charge: i32,
}

impl FilteredEvent for ItemDischarged {
    type Filter = CollectibleType;

    fn matches(&self, filter: &Self::Filter) -> bool {
        self.collectible == *filter
    }
}

/// A breakable trinket was destroyed by damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrinketBroken {
    pub player: PlayerIndex,
    pub trinket: TrinketType,
}

impl FilteredEvent for TrinketBroken {
    type Filter = TrinketType;

    fn matches(&self, filter: &Self::Filter) -> bool {
        self.trinket == *filter
    }
}

/// The derived "riding a mount" state flipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PonyActiveChanged {
    pub player: PlayerIndex,
    pub active: bool,
}

impl FilteredEvent for PonyActiveChanged {
    type Filter = bool;

    fn matches(&self, filter: &Self::Filter) -> bool {
        self.active == *filter
    }
}

/// Filter arguments for [`ItemPickedUp`]: both values are optional and must
/// match exactly when set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PickupFilter {
    pub kind: Option<ItemKind>,
    pub id: Option<u32>,
}

/// A held-above-head item finished its pickup animation and entered the
/// player's inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemPickedUp {
    pub player: PlayerIndex,
    pub item: PickingUpItem,
}

impl FilteredEvent for ItemPickedUp {
    type Filter = PickupFilter;

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.kind.is_none_or(|kind| self.item.kind() == kind)
            && filter.id.is_none_or(|id| self.item.id() == id)
    }
}

/// Subscriber verdict on an imminent fatal hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FatalDecision {
    /// Let the death proceed normally.
    Allow,
    /// Cancel the hit; the player does not die.
    Veto,
}

/// Incoming damage was computed to be fatal. Interception stream: the first
/// subscriber returning a [`FatalDecision`] is honored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FatalDamage {
    pub player: PlayerIndex,
    pub amount: f64,
    pub flags: DamageFlags,
    pub source: EntityType,
    pub frame: u64,
}

impl FilteredEvent for FatalDamage {
    type Filter = EntityType;

    fn matches(&self, filter: &Self::Filter) -> bool {
        self.source == *filter
    }
}
