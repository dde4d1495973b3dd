//! Item discharge detection (cross-signal disambiguation).
//!
//! A charge meter decreasing is ambiguous: the item may have been used, or a
//! charge-draining enemy may have zapped the player. The draining enemy only
//! reveals itself in its animation state a frame too late to be useful, so
//! the detector instead records the last frame on which a bulb collided with
//! each player, and suppresses the discharge event when the charge drop
//! lands on that frame or the one after it.
//!
//! Swapping the active item for a different one also moves the charge meter;
//! a slot whose item changed since the previous frame is skipped entirely
//! for that tick. When the heuristics cannot attribute a drop confidently,
//! no event fires: subscribers treat discharges as reliable triggers, so a
//! missed event is preferable to a false one.

use std::collections::BTreeMap;

use modkit_api::{ActiveSlot, CollectibleType, EntityType, NpcVariant, PlayerView};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::trace;

use crate::containers::{DefaultPlayerMap, PlayerMap};
use crate::dispatch::CallbackId;
use crate::error::RegistryError;
use crate::events::ItemDischarged;
use crate::player_index::player_index;
use crate::save::{SaveData, SaveDataManager, Scope};

use super::DetectorContext;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct DischargeRun {
    active_items: DefaultPlayerMap<BTreeMap<ActiveSlot, CollectibleType>>,
    charges: DefaultPlayerMap<BTreeMap<ActiveSlot, i32>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct DischargeRoom {
    /// Last frame on which a bulb collided with each player. Room tier:
    /// bulbs do not follow players through doors.
    bulb_collision_frames: PlayerMap<u64>,
}

type DischargeState = SaveData<DischargeRun, DischargeRoom>;

const SCOPE: &str = "item_discharge_detection";

pub struct ItemDischargeDetection {
    state: Scope<DischargeState>,
}

impl ItemDischargeDetection {
    pub(crate) fn new(
        save: &mut SaveDataManager,
        callbacks: &crate::dispatch::CallbackRegistry,
    ) -> Result<Self, RegistryError> {
        let state = save.register(
            SCOPE,
            DischargeState::default(),
            Some(callbacks.active_when(&[CallbackId::ItemDischarged])),
        )?;
        Ok(Self { state })
    }

    /// NPC collision hook, filtered to the charge-draining bulb variant.
    /// Runs earlier in the frame than the update tick, so the recorded frame
    /// is queryable by the charge diff of the same frame.
    pub(crate) fn record_bulb_collision(
        &mut self,
        ctx: &mut DetectorContext<'_>,
        npc_type: EntityType,
        variant: NpcVariant,
        collider: &dyn PlayerView,
    ) {
        if !ctx.callbacks.has_subscriptions(CallbackId::ItemDischarged) {
            return;
        }
        if npc_type != EntityType::SUCKER || variant != NpcVariant::BULB {
            return;
        }

        let frame = ctx.game.frame_count();
        trace!(player = %player_index(collider), frame, "bulb collision recorded");
        self.state
            .borrow_mut()
            .room
            .bulb_collision_frames
            .insert(collider, frame);
    }

    /// Per-player update tick.
    pub(crate) fn post_effect_update(&mut self, ctx: &mut DetectorContext<'_>, player: &dyn PlayerView) {
        if !ctx.callbacks.has_subscriptions(CallbackId::ItemDischarged) {
            return;
        }

        let index = player_index(player);
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let zapped = recently_collided_with_bulb(&state.room, ctx.game.frame_count(), player);
        let run = &mut state.run;

        for slot in ActiveSlot::iter() {
            let current_item = player.active_item(slot);
            let previous_item = run
                .active_items
                .get_or_default(player)
                .insert(slot, current_item)
                .unwrap_or(current_item);

            let current_charge = player.total_charge(slot);
            let previous_charge = run
                .charges
                .get_or_default(player)
                .insert(slot, current_charge)
                .unwrap_or(current_charge);

            if previous_item != current_item {
                // The slot's item was swapped out; a discharge cannot have
                // happened on this frame.
                continue;
            }

            if zapped {
                continue;
            }

            if current_charge < previous_charge {
                ctx.callbacks.item_discharged.notify(&ItemDischarged {
                    player: index,
                    collectible: current_item,
                    slot,
                    previous_charge,
                    current_charge,
                });
            }
        }
    }
}

/// True if a bulb collided with the player on this frame or the previous
/// one. A collision is assumed to mean a zap.
fn recently_collided_with_bulb(room: &DischargeRoom, frame: u64, player: &dyn PlayerView) -> bool {
    match room.bulb_collision_frames.get(player) {
        Some(&collision_frame) => {
            collision_frame == frame || Some(collision_frame) == frame.checked_sub(1)
        }
        None => false,
    }
}
