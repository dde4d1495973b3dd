//! Fatal damage interception.
//!
//! Unlike the diffing detectors, this one reacts inside the damage hook
//! itself: it precomputes whether the incoming hit would kill the player,
//! and only then offers the event to interception subscribers. The first
//! subscriber returning a verdict is honored; a veto cancels the hit.
//!
//! Fatality is a prediction, not a record of an observed death, so it is a
//! best-effort computation. Each exemption below corresponds to an engine
//! mechanism that would keep the player alive despite lethal-looking
//! numbers.

use modkit_api::{CollectibleType, DamageFlags, EntityType, HealthKind, PlayerView};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::containers::PlayerMap;
use crate::dispatch::CallbackId;
use crate::error::RegistryError;
use crate::events::{FatalDamage, FatalDecision};
use crate::player_index::player_index;
use crate::save::{SaveData, SaveDataManager, Scope};

use super::DetectorContext;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct FatalRun {
    last_damage_frames: PlayerMap<u64>,
}

type FatalState = SaveData<FatalRun>;

const SCOPE: &str = "fatal_damage_detection";

pub struct FatalDamageDetection {
    state: Scope<FatalState>,
}

impl FatalDamageDetection {
    pub(crate) fn new(
        save: &mut SaveDataManager,
        callbacks: &crate::dispatch::CallbackRegistry,
    ) -> Result<Self, RegistryError> {
        let state = save.register(
            SCOPE,
            FatalState::default(),
            Some(callbacks.active_when(&[CallbackId::FatalDamage])),
        )?;
        Ok(Self { state })
    }

    /// Damage hook. Returns `Some(Veto)` when a subscriber cancelled the
    /// hit, `Some(Allow)` when one explicitly let it through, and `None`
    /// when the hit was not fatal or nobody claimed it.
    pub(crate) fn entity_take_damage(
        &mut self,
        ctx: &mut DetectorContext<'_>,
        player: &dyn PlayerView,
        amount: f64,
        flags: DamageFlags,
        source: EntityType,
    ) -> Option<FatalDecision> {
        if flags.contains(DamageFlags::FAKE) {
            return None;
        }

        let frame = ctx.game.frame_count();
        let last_damage_frame = self.state.borrow().run.last_damage_frames.get(player).copied();
        // Record before any early return so the same-frame heuristic sees
        // every real hit, including non-fatal ones.
        self.state
            .borrow_mut()
            .run
            .last_damage_frames
            .insert(player, frame);

        if !ctx.callbacks.has_subscriptions(CallbackId::FatalDamage) {
            return None;
        }
        if !is_damage_fatal(player, amount, last_damage_frame, frame) {
            return None;
        }

        let event = FatalDamage {
            player: player_index(player),
            amount,
            flags,
            source,
            frame,
        };
        let decision = ctx.callbacks.fatal_damage.intercept(&event);
        if decision == Some(FatalDecision::Veto) {
            debug!(player = %event.player, frame, "fatal hit vetoed");
        }
        decision
    }

    /// Scripted deaths bypass the damage pipeline entirely, so there is no
    /// amount or source to reason about: the hit is unconditionally fatal
    /// and goes straight to the subscribers.
    pub(crate) fn pre_scripted_death(
        &mut self,
        ctx: &mut DetectorContext<'_>,
        player: &dyn PlayerView,
    ) -> Option<FatalDecision> {
        if !ctx.callbacks.has_subscriptions(CallbackId::FatalDamage) {
            return None;
        }

        let event = FatalDamage {
            player: player_index(player),
            amount: 0.0,
            flags: DamageFlags::empty(),
            source: EntityType::NONE,
            frame: ctx.game.frame_count(),
        };
        ctx.callbacks.fatal_damage.intercept(&event)
    }
}

/// Predicts whether a hit of `amount` would kill the player.
///
/// `last_damage_frame` is the frame of the player's previous real hit, used
/// for the Broken Glass Cannon same-frame exemption. That exemption is a
/// heuristic: the self-damage from the cannon shattering arrives on the same
/// frame as the triggering hit, and a same-frame pair is assumed to be that
/// case rather than two independent lethal hits.
pub fn is_damage_fatal(
    player: &dyn PlayerView,
    amount: f64,
    last_damage_frame: Option<u64>,
    frame: u64,
) -> bool {
    // Berserk makes the player invincible for its duration.
    if player.has_temporary_effect(CollectibleType::BERSERK) {
        return false;
    }

    // A pending revival effect turns the death into a respawn.
    if player.will_revive() {
        return false;
    }

    if amount < f64::from(player.num_hits_remaining()) {
        return false;
    }

    if player.has_collectible(CollectibleType::BROKEN_GLASS_CANNON)
        && last_damage_frame == Some(frame)
    {
        return false;
    }

    // A single hit can only drain one heart category to zero; a reserve in
    // another category absorbs the overflow.
    let red = player.hearts(HealthKind::Red);
    let soul = player.hearts(HealthKind::Soul);
    let bone = player.hearts(HealthKind::Bone);
    let eternal = player.hearts(HealthKind::Eternal);
    let mixed = (red > 0 && soul > 0)
        || (red > 0 && bone > 0)
        || (soul > 0 && bone > 0)
        || (soul > 0 && eternal > 0)
        || bone >= 2;
    if mixed {
        return false;
    }

    true
}
