//! Health change detection, one diff per health category.
//!
//! Same shape as stat change detection; keyed by the fixed [`HealthKind`]
//! set instead of the stat set.

use std::collections::BTreeMap;

use modkit_api::{HealthKind, PlayerView};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::containers::DefaultPlayerMap;
use crate::dispatch::CallbackId;
use crate::error::RegistryError;
use crate::events::HealthChanged;
use crate::player_index::player_index;
use crate::save::{SaveData, SaveDataManager, Scope};

use super::DetectorContext;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct HealthRun {
    snapshots: DefaultPlayerMap<BTreeMap<HealthKind, i32>>,
}

type HealthState = SaveData<HealthRun>;

const SCOPE: &str = "health_change_detection";

pub struct HealthChangeDetection {
    state: Scope<HealthState>,
}

impl HealthChangeDetection {
    pub(crate) fn new(
        save: &mut SaveDataManager,
        callbacks: &crate::dispatch::CallbackRegistry,
    ) -> Result<Self, RegistryError> {
        let state = save.register(
            SCOPE,
            HealthState::default(),
            Some(callbacks.active_when(&[CallbackId::HealthChanged])),
        )?;
        Ok(Self { state })
    }

    pub(crate) fn post_effect_update(&mut self, ctx: &mut DetectorContext<'_>, player: &dyn PlayerView) {
        if !ctx.callbacks.has_subscriptions(CallbackId::HealthChanged) {
            return;
        }

        let index = player_index(player);
        let mut state = self.state.borrow_mut();
        let snapshot = state.run.snapshots.get_or_default(player);

        for kind in HealthKind::iter() {
            let current = player.hearts(kind);
            let Some(previous) = snapshot.insert(kind, current) else {
                continue;
            };

            if previous != current {
                ctx.callbacks.health_changed.notify(&HealthChanged {
                    player: index,
                    kind,
                    previous,
                    current,
                    delta: current - previous,
                });
            }
        }
    }
}
