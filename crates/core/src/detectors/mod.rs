//! Differential event detectors.
//!
//! Each detector samples engine state through the view traits once per tick,
//! compares against its previous sample, and forwards semantic events to the
//! dispatch registry. All per-player state is exclusively owned by its
//! declaring detector inside a registered save scope; cross-detector reads
//! go through the owning detector's accessor (see
//! [`PonyDetection::is_active_for`]).
//!
//! # Ordering
//!
//! Within one simulated frame the facade invokes detectors in a fixed order:
//!
//! 1. Collision and damage recorders ([`ItemDischargeDetection::record_bulb_collision`],
//!    [`TrinketBreakDetection::record_damage`], [`FatalDamageDetection`]) run
//!    inside their own native hooks, which the engine delivers before the
//!    per-player update tick of the same frame.
//! 2. On the per-player update tick, detectors run in declaration order:
//!    pickup, collectible, stat, health, transformation, pony, discharge,
//!    trinket break. Pickup runs first because collectible detection
//!    consumes its output within the same tick.
//!
//! All bookkeeping for one player completes before the next player's tick is
//! processed; the engine delivers per-player ticks in a stable order.

mod collectible;
mod discharge;
mod fatal_damage;
mod health;
mod pickup;
mod pony;
mod stat;
mod transformation;
mod trinket;

pub use collectible::CollectibleDetection;
pub use discharge::ItemDischargeDetection;
pub use fatal_damage::{FatalDamageDetection, is_damage_fatal};
pub use health::HealthChangeDetection;
pub use pickup::ItemPickupDetection;
pub use pony::PonyDetection;
pub use stat::StatChangeDetection;
pub use transformation::TransformationDetection;
pub use trinket::TrinketBreakDetection;

use modkit_api::GameView;

use crate::dispatch::CallbackRegistry;

/// Read-only engine access plus the dispatch registry, handed to detectors
/// on every hook invocation.
pub struct DetectorContext<'a> {
    pub game: &'a dyn GameView,
    pub callbacks: &'a mut CallbackRegistry,
}
