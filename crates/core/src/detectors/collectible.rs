//! Collectible add/remove detection (count diff with reconciliation).
//!
//! The total collectible count is cheap to read every tick; the full
//! per-type inventory is not. The detector therefore diffs the total first
//! and only rebuilds the per-type map when the total moved, attributing the
//! measured delta to whichever types changed, in ascending numeric order,
//! and stopping once the number of fired events equals the measured delta.
//!
//! A swap of one active item for another leaves the total unchanged, so a
//! plain count diff is blind to it. When the total is flat, the detector
//! additionally compares the multiset of held active-slot items and runs an
//! uncapped reconciliation when they differ, which produces the balanced
//! removed/added pair.
//!
//! Unlike the pure per-frame diffs, the pre-run baseline is defined as an
//! empty inventory, so the first observed count increase does fire.
//!
//! Not handled: rerolls triggered by taking damage (Tainted Eden). Those
//! land on the frame after the damage hook, so catching a flat-total
//! passive-for-passive reroll would need a reconciliation deferred by one
//! frame. There is no deferred-frame scheduler here; the swap check still
//! catches any active-item change such a reroll makes.

use std::collections::{BTreeMap, BTreeSet};

use modkit_api::{ActiveSlot, CollectibleType, PlayerView};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::trace;

use crate::containers::DefaultPlayerMap;
use crate::dispatch::CallbackId;
use crate::error::RegistryError;
use crate::events::{CollectibleAdded, CollectibleRemoved};
use crate::player_index::player_index;
use crate::save::{SaveData, SaveDataManager, Scope};

use super::DetectorContext;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct CollectibleRun {
    /// Previous total collectible count per player. Defaults to zero: the
    /// baseline before the first sample is an empty inventory.
    counts: DefaultPlayerMap<u32>,
    /// Previous per-type counts per player.
    inventories: DefaultPlayerMap<BTreeMap<CollectibleType, u32>>,
    /// Previous active item per slot per player, for swap detection.
    active_items: DefaultPlayerMap<BTreeMap<ActiveSlot, CollectibleType>>,
}

type CollectibleState = SaveData<CollectibleRun>;

const SCOPE: &str = "collectible_detection";

const STREAMS: &[CallbackId] = &[CallbackId::CollectibleAdded, CallbackId::CollectibleRemoved];

pub struct CollectibleDetection {
    state: Scope<CollectibleState>,
}

impl CollectibleDetection {
    pub(crate) fn new(
        save: &mut SaveDataManager,
        callbacks: &crate::dispatch::CallbackRegistry,
    ) -> Result<Self, RegistryError> {
        let state = save.register(
            SCOPE,
            CollectibleState::default(),
            Some(callbacks.active_when(STREAMS)),
        )?;
        Ok(Self { state })
    }

    /// Per-player update tick.
    pub(crate) fn post_effect_update(&mut self, ctx: &mut DetectorContext<'_>, player: &dyn PlayerView) {
        if !STREAMS.iter().any(|&id| ctx.callbacks.has_subscriptions(id)) {
            return;
        }

        let mut state = self.state.borrow_mut();
        let run = &mut state.run;

        let new_count = player.collectible_count();
        let old_count = std::mem::replace(run.counts.get_or_default(player), new_count);

        // The slot snapshot must refresh on every tick, including ticks that
        // reconcile for other reasons, or a later swap diffs against stale
        // slots.
        let actives_changed = active_items_changed(run, player);

        let difference = i64::from(new_count) - i64::from(old_count);
        if difference != 0 {
            reconcile(ctx, run, player, Some(difference.unsigned_abs() as u32));
        } else if actives_changed {
            // One or more active items changed while the total stayed flat:
            // a swap, reconciled as a balanced removed/added pair.
            reconcile(ctx, run, player, None);
        }
    }

    /// A queued item finished its pickup animation. Some engine-side item
    /// grants do not move the collectible count, so the inventory diff is
    /// forced here with a budget of one.
    pub(crate) fn on_item_pickup(&mut self, ctx: &mut DetectorContext<'_>, player: &dyn PlayerView) {
        if !STREAMS.iter().any(|&id| ctx.callbacks.has_subscriptions(id)) {
            return;
        }

        let mut state = self.state.borrow_mut();
        let run = &mut state.run;
        *run.counts.get_or_default(player) = player.collectible_count();
        reconcile(ctx, run, player, Some(1));
    }

    /// A build-rerolling active item was used; the entire inventory may have
    /// changed at once, so diff without a budget.
    pub(crate) fn on_use_item(
        &mut self,
        ctx: &mut DetectorContext<'_>,
        player: &dyn PlayerView,
        collectible: CollectibleType,
    ) {
        if collectible != CollectibleType::D4 && collectible != CollectibleType::D100 {
            return;
        }
        if !STREAMS.iter().any(|&id| ctx.callbacks.has_subscriptions(id)) {
            return;
        }

        let mut state = self.state.borrow_mut();
        let run = &mut state.run;
        *run.counts.get_or_default(player) = player.collectible_count();
        reconcile(ctx, run, player, None);
    }
}

/// Rebuilds the per-type inventory snapshot and fires one added/removed
/// event per unit of per-type difference, in ascending numeric type order,
/// stopping once `budget` events have fired (when a budget is given).
fn reconcile(
    ctx: &mut DetectorContext<'_>,
    run: &mut CollectibleRun,
    player: &dyn PlayerView,
    budget: Option<u32>,
) {
    let index = player_index(player);
    let new_inventory = player.collectible_counts();
    let old_inventory =
        std::mem::replace(run.inventories.get_or_default(player), new_inventory.clone());

    let types: BTreeSet<CollectibleType> = old_inventory
        .keys()
        .chain(new_inventory.keys())
        .copied()
        .collect();

    let mut fired = 0u32;
    for collectible in types {
        let old_num = old_inventory.get(&collectible).copied().unwrap_or(0);
        let new_num = new_inventory.get(&collectible).copied().unwrap_or(0);
        let difference = i64::from(new_num) - i64::from(old_num);

        for _ in 0..difference.unsigned_abs() {
            if difference > 0 {
                trace!(player = %index, %collectible, "collectible added");
                ctx.callbacks
                    .collectible_added
                    .notify(&CollectibleAdded { player: index, collectible });
            } else {
                trace!(player = %index, %collectible, "collectible removed");
                ctx.callbacks
                    .collectible_removed
                    .notify(&CollectibleRemoved { player: index, collectible });
            }
            fired += 1;
            if budget == Some(fired) {
                return;
            }
        }
    }
}

/// Updates the active-slot snapshot and reports whether the multiset of held
/// active items changed. Items can migrate between slots without changing
/// the build, so both sides are compared sorted.
fn active_items_changed(run: &mut CollectibleRun, player: &dyn PlayerView) -> bool {
    let slots = run.active_items.get_or_default(player);

    let mut old_items = Vec::with_capacity(ActiveSlot::iter().len());
    let mut new_items = Vec::with_capacity(ActiveSlot::iter().len());
    for slot in ActiveSlot::iter() {
        let new_item = player.active_item(slot);
        let old_item = slots.insert(slot, new_item).unwrap_or(new_item);
        old_items.push(old_item);
        new_items.push(new_item);
    }

    old_items.sort_unstable();
    new_items.sort_unstable();
    old_items != new_items
}
