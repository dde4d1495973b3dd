//! Breakable trinket detection.
//!
//! Two trinkets can shatter when the holder takes damage. A bare count
//! decrease is not enough to conclude a break: dropping or smelting a
//! trinket also lowers the count. The damage hook therefore snapshots the
//! counts and the frame, and the update tick only compares counts when
//! damage landed on this frame or the previous one. Outside that window the
//! snapshot is refreshed silently, which absorbs drops and swaps.

use std::collections::BTreeMap;

use modkit_api::{PlayerView, TrinketType};
use serde::{Deserialize, Serialize};

use crate::containers::{DefaultPlayerMap, PlayerMap};
use crate::dispatch::CallbackId;
use crate::error::RegistryError;
use crate::events::TrinketBroken;
use crate::player_index::player_index;
use crate::save::{SaveData, SaveDataManager, Scope};

use super::DetectorContext;

const BREAKABLE: [TrinketType; 2] = [TrinketType::WISH_BONE, TrinketType::WALNUT];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct TrinketRun {
    counts: DefaultPlayerMap<BTreeMap<TrinketType, u32>>,
    last_damage_frames: PlayerMap<u64>,
}

type TrinketState = SaveData<TrinketRun>;

const SCOPE: &str = "trinket_break_detection";

pub struct TrinketBreakDetection {
    state: Scope<TrinketState>,
}

impl TrinketBreakDetection {
    pub(crate) fn new(
        save: &mut SaveDataManager,
        callbacks: &crate::dispatch::CallbackRegistry,
    ) -> Result<Self, RegistryError> {
        let state = save.register(
            SCOPE,
            TrinketState::default(),
            Some(callbacks.active_when(&[CallbackId::TrinketBroken])),
        )?;
        Ok(Self { state })
    }

    /// Damage hook. Snapshots the breakable counts before the engine gets a
    /// chance to shatter anything, and marks the frame so the next update
    /// tick knows a decrease is attributable to damage.
    pub(crate) fn record_damage(&mut self, ctx: &mut DetectorContext<'_>, player: &dyn PlayerView) {
        if !ctx.callbacks.has_subscriptions(CallbackId::TrinketBroken) {
            return;
        }

        let frame = ctx.game.frame_count();
        let mut state = self.state.borrow_mut();
        state.run.last_damage_frames.insert(player, frame);

        let counts = state.run.counts.get_or_default(player);
        for &trinket in &BREAKABLE {
            counts.insert(trinket, player.trinket_count(trinket));
        }
    }

    pub(crate) fn post_effect_update(&mut self, ctx: &mut DetectorContext<'_>, player: &dyn PlayerView) {
        if !ctx.callbacks.has_subscriptions(CallbackId::TrinketBroken) {
            return;
        }

        let index = player_index(player);
        let frame = ctx.game.frame_count();
        let mut state = self.state.borrow_mut();
        let damaged_recently = state
            .run
            .last_damage_frames
            .get(player)
            .is_some_and(|&damage_frame| {
                damage_frame == frame || Some(damage_frame) == frame.checked_sub(1)
            });

        let counts = state.run.counts.get_or_default(player);
        for &trinket in &BREAKABLE {
            let current = player.trinket_count(trinket);
            let previous = counts.insert(trinket, current).unwrap_or(current);

            if damaged_recently && current < previous {
                ctx.callbacks.trinket_broken.notify(&TrinketBroken {
                    player: index,
                    trinket,
                });
            }
        }
    }
}
