//! Stat change detection (pure per-frame diff).
//!
//! First observation of a player seeds the snapshot and never fires; the
//! snapshot is overwritten with the current value on every tick regardless
//! of whether an event fired.

use std::collections::BTreeMap;

use modkit_api::{PlayerStat, PlayerView, StatValue};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::containers::DefaultPlayerMap;
use crate::dispatch::CallbackId;
use crate::error::RegistryError;
use crate::events::StatChanged;
use crate::player_index::player_index;
use crate::save::{SaveData, SaveDataManager, Scope};

use super::DetectorContext;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StatRun {
    snapshots: DefaultPlayerMap<BTreeMap<PlayerStat, StatValue>>,
}

type StatState = SaveData<StatRun>;

const SCOPE: &str = "stat_change_detection";

pub struct StatChangeDetection {
    state: Scope<StatState>,
}

impl StatChangeDetection {
    pub(crate) fn new(
        save: &mut SaveDataManager,
        callbacks: &crate::dispatch::CallbackRegistry,
    ) -> Result<Self, RegistryError> {
        let state = save.register(
            SCOPE,
            StatState::default(),
            Some(callbacks.active_when(&[CallbackId::StatChanged])),
        )?;
        Ok(Self { state })
    }

    pub(crate) fn post_effect_update(&mut self, ctx: &mut DetectorContext<'_>, player: &dyn PlayerView) {
        if !ctx.callbacks.has_subscriptions(CallbackId::StatChanged) {
            return;
        }

        let index = player_index(player);
        let mut state = self.state.borrow_mut();
        let snapshot = state.run.snapshots.get_or_default(player);

        for stat in PlayerStat::iter() {
            let current = player.stat(stat);
            let Some(previous) = snapshot.insert(stat, current) else {
                // First observation seeds the snapshot.
                continue;
            };

            if previous != current {
                ctx.callbacks.stat_changed.notify(&StatChanged {
                    player: index,
                    stat,
                    previous,
                    current,
                    delta: current.numeric_delta(&previous),
                });
            }
        }
    }
}
