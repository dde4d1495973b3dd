//! Facade wiring native engine hooks into the detectors.
//!
//! The engine binding constructs one [`ModHooks`] and forwards every native
//! hook invocation to the matching method here. The facade owns the save
//! registry, the dispatch registry, and every detector; it is the only
//! place that knows the per-frame detector ordering (see
//! [`detectors`](crate::detectors) for the ordering rules).
//!
//! Inbound methods mirror the native hook surface: lifecycle hooks
//! (`post_game_started`, `post_new_room`), the per-player update tick
//! (`post_effect_update`), and the event hooks that deliver mid-frame
//! (`entity_take_damage`, `pre_npc_collision`, `post_use_item`,
//! `pre_scripted_death`). Methods returning `Option<bool>` follow the native
//! override convention: `None` leaves engine behavior untouched.

use modkit_api::{CollectibleType, DamageFlags, EntityType, GameView, NpcVariant, PlayerView};
use tracing::debug;

use crate::detectors::{
    CollectibleDetection, DetectorContext, FatalDamageDetection, HealthChangeDetection,
    ItemDischargeDetection, ItemPickupDetection, PonyDetection, StatChangeDetection,
    TransformationDetection, TrinketBreakDetection,
};
use crate::dispatch::CallbackRegistry;
use crate::error::{RegistryError, SaveError};
use crate::events::FatalDecision;
use crate::save::SaveDataManager;

pub struct ModHooks {
    save: SaveDataManager,
    callbacks: CallbackRegistry,
    pickup: ItemPickupDetection,
    collectible: CollectibleDetection,
    stat: StatChangeDetection,
    health: HealthChangeDetection,
    transformation: TransformationDetection,
    pony: PonyDetection,
    discharge: ItemDischargeDetection,
    trinket: TrinketBreakDetection,
    fatal: FatalDamageDetection,
}

impl ModHooks {
    /// Builds the full detector set. Fails only on a duplicate scope name,
    /// which indicates a wiring bug rather than a runtime condition.
    pub fn new() -> Result<Self, RegistryError> {
        let mut save = SaveDataManager::new();
        let callbacks = CallbackRegistry::new();

        let pickup = ItemPickupDetection::new(&mut save, &callbacks)?;
        let collectible = CollectibleDetection::new(&mut save, &callbacks)?;
        let stat = StatChangeDetection::new(&mut save, &callbacks)?;
        let health = HealthChangeDetection::new(&mut save, &callbacks)?;
        let transformation = TransformationDetection::new(&mut save, &callbacks)?;
        let pony = PonyDetection::new(&mut save, &callbacks)?;
        let discharge = ItemDischargeDetection::new(&mut save, &callbacks)?;
        let trinket = TrinketBreakDetection::new(&mut save, &callbacks)?;
        let fatal = FatalDamageDetection::new(&mut save, &callbacks)?;

        Ok(Self {
            save,
            callbacks,
            pickup,
            collectible,
            stat,
            health,
            transformation,
            pony,
            discharge,
            trinket,
            fatal,
        })
    }

    /// Subscription surface handed to mods.
    pub fn callbacks(&mut self) -> &mut CallbackRegistry {
        &mut self.callbacks
    }

    /// A run started. `continued` distinguishes resuming a saved run (state
    /// was restored beforehand and must survive) from a fresh run (all
    /// run-scoped state is discarded).
    pub fn post_game_started(&mut self, continued: bool) {
        debug!(continued, "game started");
        if !continued {
            self.save.reset_run();
        }
    }

    /// A room transition completed; room-tier state is discarded.
    pub fn post_new_room(&mut self) {
        self.save.reset_room();
    }

    /// The per-player update tick. Runs every diffing detector against the
    /// player, in the fixed documented order.
    pub fn post_effect_update(&mut self, game: &dyn GameView, player: &dyn PlayerView) {
        let mut ctx = DetectorContext {
            game,
            callbacks: &mut self.callbacks,
        };

        // Pickup runs first: the dequeue edge it detects attributes the
        // collectible diff of the same tick.
        if self.pickup.post_effect_update(&mut ctx, player).is_some() {
            self.collectible.on_item_pickup(&mut ctx, player);
        }
        self.collectible.post_effect_update(&mut ctx, player);
        self.stat.post_effect_update(&mut ctx, player);
        self.health.post_effect_update(&mut ctx, player);
        self.transformation.post_effect_update(&mut ctx, player);
        self.pony.post_effect_update(&mut ctx, player);
        self.discharge.post_effect_update(&mut ctx, player);
        self.trinket.post_effect_update(&mut ctx, player);
    }

    /// An NPC collided with a player. Never overrides the collision; only
    /// feeds the discharge detector's drain suppression.
    pub fn pre_npc_collision(
        &mut self,
        game: &dyn GameView,
        npc_type: EntityType,
        variant: NpcVariant,
        collider: &dyn PlayerView,
    ) -> Option<bool> {
        let mut ctx = DetectorContext {
            game,
            callbacks: &mut self.callbacks,
        };
        self.discharge
            .record_bulb_collision(&mut ctx, npc_type, variant, collider);
        None
    }

    /// A player is about to take damage. Returns `Some(false)` to cancel the
    /// hit when a fatal-damage subscriber vetoed it.
    pub fn entity_take_damage(
        &mut self,
        game: &dyn GameView,
        player: &dyn PlayerView,
        amount: f64,
        flags: DamageFlags,
        source: EntityType,
    ) -> Option<bool> {
        let mut ctx = DetectorContext {
            game,
            callbacks: &mut self.callbacks,
        };
        self.trinket.record_damage(&mut ctx, player);

        match self
            .fatal
            .entity_take_damage(&mut ctx, player, amount, flags, source)
        {
            Some(FatalDecision::Veto) => Some(false),
            Some(FatalDecision::Allow) | None => None,
        }
    }

    /// A scripted death is about to finalize, bypassing the damage pipeline.
    /// Returns `Some(false)` on veto.
    pub fn pre_scripted_death(
        &mut self,
        game: &dyn GameView,
        player: &dyn PlayerView,
    ) -> Option<bool> {
        let mut ctx = DetectorContext {
            game,
            callbacks: &mut self.callbacks,
        };
        match self.fatal.pre_scripted_death(&mut ctx, player) {
            Some(FatalDecision::Veto) => Some(false),
            Some(FatalDecision::Allow) | None => None,
        }
    }

    /// An active item was used. Build-rerolling items force a full
    /// collectible reconciliation.
    pub fn post_use_item(
        &mut self,
        game: &dyn GameView,
        player: &dyn PlayerView,
        collectible: CollectibleType,
    ) {
        let mut ctx = DetectorContext {
            game,
            callbacks: &mut self.callbacks,
        };
        self.collectible.on_use_item(&mut ctx, player, collectible);
    }

    /// Whether the player currently counts as mounted (see
    /// [`PonyDetection::is_active_for`]).
    pub fn is_pony_active(&self, player: &dyn PlayerView) -> bool {
        self.pony.is_active_for(player)
    }

    /// Serializes all active detector state for save-and-quit.
    pub fn snapshot(&self) -> Result<serde_json::Value, SaveError> {
        self.save.snapshot()
    }

    /// Restores detector state on continue. Call before the continued
    /// `post_game_started`.
    pub fn restore(&mut self, payload: &serde_json::Value) -> Result<(), SaveError> {
        self.save.restore(payload)
    }
}
