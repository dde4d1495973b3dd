//! In-memory implementations of the host view traits.
//!
//! The harness stands in for the engine in tests: every sampled quantity is a
//! plain public field that a test mutates between ticks. Seeds are derived
//! deterministically from a per-player base so that identity stays stable
//! across simulated save/continue cycles.

use std::collections::{BTreeMap, BTreeSet};

use crate::enums::{ActiveSlot, HealthKind, PickingUpItem, PlayerForm, PlayerStat, StatValue};
use crate::flags::EntityFlags;
use crate::host::{GameView, PlayerView};
use crate::ids::{CollectibleType, PlayerType, Seed, TrinketType};

/// Scripted global engine state.
#[derive(Clone, Debug, Default)]
pub struct TestGame {
    pub frame: u64,
}

impl TestGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the simulated frame counter by one.
    pub fn advance(&mut self) {
        self.frame += 1;
    }
}

impl GameView for TestGame {
    fn frame_count(&self) -> u64 {
        self.frame
    }
}

/// Scripted player state with public fields.
#[derive(Clone, Debug)]
pub struct TestPlayer {
    /// Base value that every derived RNG seed mixes in. Two logical players
    /// must use distinct bases.
    pub seed_base: u64,
    pub player_type: PlayerType,
    pub is_sub_player: bool,
    /// Owning parent, for sub-player entities. `None` on a sub-player models
    /// the early-initialization window in which no parent is resolvable.
    pub parent: Option<Box<TestPlayer>>,
    pub collectibles: BTreeMap<CollectibleType, u32>,
    pub active_items: BTreeMap<ActiveSlot, CollectibleType>,
    pub charges: BTreeMap<ActiveSlot, i32>,
    pub stats: BTreeMap<PlayerStat, StatValue>,
    pub hearts: BTreeMap<HealthKind, i32>,
    pub forms: BTreeSet<PlayerForm>,
    pub temporary_effects: BTreeSet<CollectibleType>,
    pub entity_flags: EntityFlags,
    pub trinkets: BTreeMap<TrinketType, u32>,
    pub queued_item: Option<PickingUpItem>,
    pub num_hits_remaining: i32,
    pub will_revive: bool,
}

impl TestPlayer {
    pub fn new(seed_base: u64) -> Self {
        Self {
            seed_base,
            player_type: PlayerType::ISAAC,
            is_sub_player: false,
            parent: None,
            collectibles: BTreeMap::new(),
            active_items: BTreeMap::new(),
            charges: BTreeMap::new(),
            stats: BTreeMap::new(),
            hearts: BTreeMap::new(),
            forms: BTreeSet::new(),
            temporary_effects: BTreeSet::new(),
            entity_flags: EntityFlags::empty(),
            trinkets: BTreeMap::new(),
            queued_item: None,
            num_hits_remaining: 6,
            will_revive: false,
        }
    }

    /// Builds a sub-player whose identity resolves to `parent`.
    pub fn sub_player_of(parent: &TestPlayer) -> Self {
        let mut sub = Self::new(parent.seed_base.wrapping_add(0xD1CE));
        sub.is_sub_player = true;
        sub.parent = Some(Box::new(parent.clone()));
        sub
    }

    pub fn add_collectible(&mut self, collectible: CollectibleType) {
        *self.collectibles.entry(collectible).or_insert(0) += 1;
    }

    pub fn remove_collectible(&mut self, collectible: CollectibleType) {
        if let Some(count) = self.collectibles.get_mut(&collectible) {
            *count -= 1;
            if *count == 0 {
                self.collectibles.remove(&collectible);
            }
        }
    }

    /// Puts an active item with the given charge into a slot, registering it
    /// in the inventory as well.
    pub fn set_active_item(&mut self, slot: ActiveSlot, collectible: CollectibleType, charge: i32) {
        let previous = self.active_items.insert(slot, collectible);
        self.charges.insert(slot, charge);
        if let Some(previous) = previous
            && !previous.is_none()
        {
            self.remove_collectible(previous);
        }
        if !collectible.is_none() {
            self.add_collectible(collectible);
        }
    }

    pub fn set_charge(&mut self, slot: ActiveSlot, charge: i32) {
        self.charges.insert(slot, charge);
    }

    pub fn set_stat(&mut self, stat: PlayerStat, value: StatValue) {
        self.stats.insert(stat, value);
    }

    pub fn set_hearts(&mut self, kind: HealthKind, amount: i32) {
        self.hearts.insert(kind, amount);
    }

    pub fn set_trinket_count(&mut self, trinket: TrinketType, count: u32) {
        if count == 0 {
            self.trinkets.remove(&trinket);
        } else {
            self.trinkets.insert(trinket, count);
        }
    }
}

impl PlayerView for TestPlayer {
    fn collectible_rng_seed(&self, collectible: CollectibleType) -> Seed {
        // Splitmix-style mix keeps streams for different collectibles apart
        // while staying a pure function of the base.
        let mut z = self
            .seed_base
            .wrapping_add((collectible.0 as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Seed(z ^ (z >> 31))
    }

    fn is_sub_player(&self) -> bool {
        self.is_sub_player
    }

    fn parent(&self) -> Option<&dyn PlayerView> {
        self.parent.as_deref().map(|parent| parent as &dyn PlayerView)
    }

    fn player_type(&self) -> PlayerType {
        self.player_type
    }

    fn collectible_count(&self) -> u32 {
        self.collectibles.values().sum()
    }

    fn collectible_counts(&self) -> BTreeMap<CollectibleType, u32> {
        self.collectibles.clone()
    }

    fn has_collectible(&self, collectible: CollectibleType) -> bool {
        self.collectibles.contains_key(&collectible)
    }

    fn active_item(&self, slot: ActiveSlot) -> CollectibleType {
        self.active_items
            .get(&slot)
            .copied()
            .unwrap_or(CollectibleType::NONE)
    }

    fn total_charge(&self, slot: ActiveSlot) -> i32 {
        self.charges.get(&slot).copied().unwrap_or(0)
    }

    fn stat(&self, stat: PlayerStat) -> StatValue {
        self.stats
            .get(&stat)
            .copied()
            .unwrap_or_else(|| stat.default_value())
    }

    fn hearts(&self, kind: HealthKind) -> i32 {
        self.hearts.get(&kind).copied().unwrap_or(0)
    }

    fn has_form(&self, form: PlayerForm) -> bool {
        self.forms.contains(&form)
    }

    fn has_temporary_effect(&self, collectible: CollectibleType) -> bool {
        self.temporary_effects.contains(&collectible)
    }

    fn entity_flags(&self) -> EntityFlags {
        self.entity_flags
    }

    fn trinket_count(&self, trinket: TrinketType) -> u32 {
        self.trinkets.get(&trinket).copied().unwrap_or(0)
    }

    fn queued_item(&self) -> Option<PickingUpItem> {
        self.queued_item
    }

    fn num_hits_remaining(&self) -> i32 {
        self.num_hits_remaining
    }

    fn will_revive(&self) -> bool {
        self.will_revive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_are_stable_and_distinct() {
        let player = TestPlayer::new(42);
        let again = TestPlayer::new(42);
        assert_eq!(
            player.collectible_rng_seed(CollectibleType::SAD_ONION),
            again.collectible_rng_seed(CollectibleType::SAD_ONION),
        );
        assert_ne!(
            player.collectible_rng_seed(CollectibleType::SAD_ONION),
            player.collectible_rng_seed(CollectibleType::INNER_EYE),
        );

        let other = TestPlayer::new(43);
        assert_ne!(
            player.collectible_rng_seed(CollectibleType::SAD_ONION),
            other.collectible_rng_seed(CollectibleType::SAD_ONION),
        );
    }

    #[test]
    fn set_active_item_keeps_inventory_consistent() {
        let mut player = TestPlayer::new(1);
        player.set_active_item(ActiveSlot::Primary, CollectibleType(90), 4);
        assert_eq!(player.collectible_count(), 1);

        player.set_active_item(ActiveSlot::Primary, CollectibleType(91), 2);
        assert_eq!(player.collectible_count(), 1);
        assert!(!player.has_collectible(CollectibleType(90)));
        assert!(player.has_collectible(CollectibleType(91)));
    }
}
