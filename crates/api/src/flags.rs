//! Flag sets mirroring the host engine's bitmask ABI.

use bitflags::bitflags;

bitflags! {
    /// Flags attached to an incoming damage event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DamageFlags: u64 {
        const NO_KILL        = 1 << 0;
        const FIRE           = 1 << 1;
        const EXPLOSION      = 1 << 2;
        const LASER          = 1 << 3;
        const ACID           = 1 << 4;
        const RED_HEARTS     = 1 << 5;
        const COUNTDOWN      = 1 << 6;
        const SPIKES         = 1 << 7;
        const CLONES         = 1 << 8;
        const POOP           = 1 << 9;
        const DEVIL          = 1 << 10;
        const ISSAC_HEART    = 1 << 11;
        const TNT            = 1 << 12;
        const INVINCIBLE     = 1 << 13;
        const SPAWN_FLY      = 1 << 14;
        const POISON_BURN    = 1 << 15;
        const CURSED_DOOR    = 1 << 16;
        const TIMER          = 1 << 17;
        const IV_BAG         = 1 << 18;
        const PITFALL        = 1 << 19;
        /// Damage that is cosmetic only and never applied to health.
        const FAKE           = 1 << 20;
        const BOSS           = 1 << 21;
        const CHEST          = 1 << 22;
        const NO_MODIFIERS   = 1 << 24;
        const NO_PENALTIES   = 1 << 26;
    }
}

bitflags! {
    /// Persistent flags set on an entity by the engine.
    ///
    /// Unlike temporary collectible effects, these survive a room transition
    /// as long as the underlying condition holds, which is what makes them
    /// usable for bridging the engine's unreliable transient signals.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct EntityFlags: u64 {
        const NO_STATUS_EFFECTS      = 1 << 0;
        const NO_INTERPOLATE         = 1 << 1;
        const APPEAR                 = 1 << 2;
        const RENDER_FLOOR           = 1 << 3;
        const NO_TARGET              = 1 << 4;
        const FREEZE                 = 1 << 5;
        const POISON                 = 1 << 6;
        const SLOW                   = 1 << 7;
        const CHARM                  = 1 << 8;
        const CONFUSION              = 1 << 9;
        const MIDAS_FREEZE           = 1 << 10;
        const FEAR                   = 1 << 11;
        const BURN                   = 1 << 12;
        const RENDER_WALL            = 1 << 13;
        const INTERPOLATION_UPDATE   = 1 << 14;
        const APPLY_GRAVITY          = 1 << 15;
        const NO_BLOOD_SPLASH        = 1 << 16;
        const NO_REMOVE_ON_TEX_RENDER = 1 << 17;
        const NO_DEATH_TRIGGER       = 1 << 18;
        const NO_SPIKE_DAMAGE        = 1 << 19;
        const NO_KNOCKBACK           = 1 << 26;
        const NO_PHYSICS_KNOCKBACK   = 1 << 30;
    }

}

impl EntityFlags {
    /// The flags the engine keeps set on a player for as long as they are
    /// riding a mount, even after the transient collectible effect is lost.
    pub const fn riding() -> Self {
        Self::NO_KNOCKBACK
            .union(Self::NO_PHYSICS_KNOCKBACK)
            .union(Self::NO_BLOOD_SPLASH)
    }
}

bitflags! {
    /// Behavior flags attached to a player's tears.
    ///
    /// Unlike the other flag sets, tear flags are persisted: they appear in
    /// stat snapshots via [`StatValue::Flags`](crate::enums::StatValue).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
    pub struct TearFlags: u64 {
        const SPECTRAL      = 1 << 0;
        const PIERCING      = 1 << 1;
        const HOMING        = 1 << 2;
        const SLOWING       = 1 << 3;
        const POISONING     = 1 << 4;
        const FREEZING      = 1 << 5;
        const SPLITTING     = 1 << 6;
        const GROWING       = 1 << 7;
        const BOOMERANG     = 1 << 8;
        const PERSISTENT    = 1 << 9;
    }
}
