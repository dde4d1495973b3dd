//! Item pickup detection via queue-slot edge watching.
//!
//! Collected items pass through a per-player queue slot while the pickup
//! animation plays. The detector watches the slot every tick and fires when
//! it transitions from occupied to empty, meaning the item actually entered
//! the inventory on this frame. Filling the slot, or holding an item across
//! several frames, fires nothing.
//!
//! This detector runs unconditionally: collectible detection consumes its
//! dequeue edge for attribution even when no mod subscribed to the pickup
//! stream itself.

use modkit_api::{PickingUpItem, PlayerView};
use serde::{Deserialize, Serialize};

use crate::containers::DefaultPlayerMap;
use crate::error::RegistryError;
use crate::events::ItemPickedUp;
use crate::player_index::player_index;
use crate::save::{SaveData, SaveDataManager, Scope};

use super::DetectorContext;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct PickupRun {
    holding: DefaultPlayerMap<Option<PickingUpItem>>,
}

type PickupState = SaveData<PickupRun>;

const SCOPE: &str = "item_pickup_detection";

pub struct ItemPickupDetection {
    state: Scope<PickupState>,
}

impl ItemPickupDetection {
    pub(crate) fn new(
        save: &mut SaveDataManager,
        _callbacks: &crate::dispatch::CallbackRegistry,
    ) -> Result<Self, RegistryError> {
        // No is_active gate: the dequeue edge feeds collectible detection
        // regardless of pickup subscribers.
        let state = save.register(SCOPE, PickupState::default(), None)?;
        Ok(Self { state })
    }

    /// Per-player update tick. Returns the item that finished its pickup on
    /// this frame, if any, for downstream attribution.
    pub(crate) fn post_effect_update(
        &mut self,
        ctx: &mut DetectorContext<'_>,
        player: &dyn PlayerView,
    ) -> Option<PickingUpItem> {
        let queued = player.queued_item();
        let mut state = self.state.borrow_mut();
        let slot = state.run.holding.get_or_default(player);
        let previous = std::mem::replace(slot, queued);
        drop(state);

        let (Some(item), None) = (previous, queued) else {
            return None;
        };

        ctx.callbacks.item_picked_up.notify(&ItemPickedUp {
            player: player_index(player),
            item,
        });
        Some(item)
    }
}
