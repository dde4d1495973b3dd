//! Traits describing read-only engine state.
//!
//! The host engine is an external collaborator: it drives the simulation,
//! invokes the native hooks, and owns every entity. These traits expose the
//! quantities the detection subsystem samples, without coupling it to a
//! concrete engine binding. The [`crate::harness`] module implements them
//! in-memory for tests.

use std::collections::BTreeMap;

use crate::enums::{ActiveSlot, HealthKind, PickingUpItem, PlayerForm, PlayerStat, StatValue};
use crate::flags::EntityFlags;
use crate::ids::{CollectibleType, PlayerType, Seed, TrinketType};

/// Global, per-frame engine state.
pub trait GameView {
    /// The number of simulation frames elapsed in the current run.
    ///
    /// Monotonically non-decreasing within a run; resets when a new run
    /// begins.
    fn frame_count(&self) -> u64;
}

/// Read-only view of a single player entity at the current frame.
///
/// All methods are cheap accessors; detectors may call them several times per
/// tick. None of the returned quantities are stable identity sources except
/// [`collectible_rng_seed`](Self::collectible_rng_seed) — array positions,
/// controller slots, and handle equality are all documented as unstable in
/// the host environment.
pub trait PlayerView {
    /// The seed of this player's per-collectible RNG stream.
    ///
    /// Stable for the lifetime of a run, including across save/continue, and
    /// distinct between logical players. This is the basis of player-index
    /// derivation.
    fn collectible_rng_seed(&self, collectible: CollectibleType) -> Seed;

    /// True if this entity is a dependent sub-player (e.g. a cosmetic child
    /// puppet) rather than an independent player.
    fn is_sub_player(&self) -> bool;

    /// The owning parent of a sub-player, when one can be resolved.
    ///
    /// Returns `None` for top-level players, and also for sub-players during
    /// very early initialization before the parent link exists.
    fn parent(&self) -> Option<&dyn PlayerView>;

    /// The character this player is playing.
    fn player_type(&self) -> PlayerType;

    /// Total number of collectibles held, counting duplicates.
    fn collectible_count(&self) -> u32;

    /// Per-type collectible counts for every type with a nonzero count.
    ///
    /// Keys are in ascending numeric order (`BTreeMap`), which fixes the
    /// enumeration order of the add/remove reconciliation.
    fn collectible_counts(&self) -> BTreeMap<CollectibleType, u32>;

    /// True if the player holds at least one copy of the collectible.
    fn has_collectible(&self, collectible: CollectibleType) -> bool;

    /// The collectible in the given active slot, or
    /// [`CollectibleType::NONE`] when the slot is empty.
    fn active_item(&self, slot: ActiveSlot) -> CollectibleType;

    /// The total charge (normal + battery overcharge) of the given slot.
    fn total_charge(&self, slot: ActiveSlot) -> i32;

    /// The current value of a recomputed stat.
    fn stat(&self, stat: PlayerStat) -> StatValue;

    /// The amount of health held in the given category.
    fn hearts(&self, kind: HealthKind) -> i32;

    /// True while the transformation is assembled.
    fn has_form(&self, form: PlayerForm) -> bool;

    /// True while a transient collectible effect is applied.
    ///
    /// Transient effects are known to drop spuriously across room
    /// transitions; see the mount detector for how that gap is bridged.
    fn has_temporary_effect(&self, collectible: CollectibleType) -> bool;

    /// The persistent entity flags currently set on this player.
    fn entity_flags(&self) -> EntityFlags;

    /// Number of copies of the trinket held (including smelted copies).
    fn trinket_count(&self, trinket: TrinketType) -> u32;

    /// The item currently held above the player's head, if any.
    fn queued_item(&self) -> Option<PickingUpItem>;

    /// How many hits of one damage the player can absorb before dying,
    /// across all heart categories.
    fn num_hits_remaining(&self) -> i32;

    /// True if a held revival item would bring the player back from the next
    /// death.
    fn will_revive(&self) -> bool;
}
