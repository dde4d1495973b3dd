//! Mount ("pony") activity tracking.
//!
//! The engine exposes two signals for a mounted player, neither sufficient
//! alone: the transient collectible effect is authoritative while present
//! but is known to drop spuriously across room transitions, and the
//! persistent riding entity flags remain set while mounted but are not a
//! trustworthy activation signal by themselves. The detector runs a
//! two-state machine per player:
//!
//! ```text
//! active' = transient_effect || (active && riding_flags_present)
//! ```
//!
//! so the flags only ever *extend* an activity the transient signal started.
//! Other detectors and mods query the result exclusively through
//! [`PonyDetection::is_active_for`]; the underlying map is never exposed.

use modkit_api::{CollectibleType, EntityFlags, PlayerView};
use serde::{Deserialize, Serialize};

use crate::containers::DefaultPlayerMap;
use crate::error::RegistryError;
use crate::events::PonyActiveChanged;
use crate::player_index::player_index;
use crate::save::{SaveData, SaveDataManager, Scope};

use super::DetectorContext;

const MOUNT_EFFECTS: [CollectibleType; 2] = [CollectibleType::PONY, CollectibleType::WHITE_PONY];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct PonyRun {
    active: DefaultPlayerMap<bool>,
}

type PonyState = SaveData<PonyRun>;

const SCOPE: &str = "pony_detection";

pub struct PonyDetection {
    state: Scope<PonyState>,
}

impl PonyDetection {
    pub(crate) fn new(
        save: &mut SaveDataManager,
        _callbacks: &crate::dispatch::CallbackRegistry,
    ) -> Result<Self, RegistryError> {
        // No is_active gate: the accessor below must answer correctly even
        // when nobody subscribed to the change stream.
        let state = save.register(SCOPE, PonyState::default(), None)?;
        Ok(Self { state })
    }

    pub(crate) fn post_effect_update(&mut self, ctx: &mut DetectorContext<'_>, player: &dyn PlayerView) {
        let transient = MOUNT_EFFECTS
            .iter()
            .any(|&effect| player.has_temporary_effect(effect));
        let flags_present = player.entity_flags().contains(EntityFlags::riding());

        let mut state = self.state.borrow_mut();
        let slot = state.run.active.get_or_default(player);
        let previous = *slot;
        let active = transient || (previous && flags_present);
        *slot = active;

        if active != previous {
            ctx.callbacks.pony_active_changed.notify(&PonyActiveChanged {
                player: player_index(player),
                active,
            });
        }
    }

    /// Whether the player is currently mounted, bridging the engine's
    /// transient-signal gaps. The sole sanctioned cross-detector query.
    pub fn is_active_for(&self, player: &dyn PlayerView) -> bool {
        self.state
            .borrow()
            .run
            .active
            .get(player)
            .copied()
            .unwrap_or(false)
    }
}
