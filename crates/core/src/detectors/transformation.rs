//! Transformation toggle detection.
//!
//! Enumerates the fixed form set once per tick and fires once per flip, in
//! either direction. First observation seeds without firing, so a player
//! restored mid-run with assembled forms does not re-announce them.

use std::collections::BTreeMap;

use modkit_api::{PlayerForm, PlayerView};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::containers::DefaultPlayerMap;
use crate::dispatch::CallbackId;
use crate::error::RegistryError;
use crate::events::TransformationChanged;
use crate::player_index::player_index;
use crate::save::{SaveData, SaveDataManager, Scope};

use super::DetectorContext;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct TransformationRun {
    snapshots: DefaultPlayerMap<BTreeMap<PlayerForm, bool>>,
}

type TransformationState = SaveData<TransformationRun>;

const SCOPE: &str = "transformation_detection";

pub struct TransformationDetection {
    state: Scope<TransformationState>,
}

impl TransformationDetection {
    pub(crate) fn new(
        save: &mut SaveDataManager,
        callbacks: &crate::dispatch::CallbackRegistry,
    ) -> Result<Self, RegistryError> {
        let state = save.register(
            SCOPE,
            TransformationState::default(),
            Some(callbacks.active_when(&[CallbackId::TransformationChanged])),
        )?;
        Ok(Self { state })
    }

    pub(crate) fn post_effect_update(&mut self, ctx: &mut DetectorContext<'_>, player: &dyn PlayerView) {
        if !ctx.callbacks.has_subscriptions(CallbackId::TransformationChanged) {
            return;
        }

        let index = player_index(player);
        let mut state = self.state.borrow_mut();
        let snapshot = state.run.snapshots.get_or_default(player);

        for form in PlayerForm::iter() {
            let active = player.has_form(form);
            let Some(previous) = snapshot.insert(form, active) else {
                continue;
            };

            if previous != active {
                ctx.callbacks.transformation_changed.notify(&TransformationChanged {
                    player: index,
                    form,
                    active,
                });
            }
        }
    }
}
