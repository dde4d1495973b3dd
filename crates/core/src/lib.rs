//! Differential event detection on top of the host engine's native hooks.
//!
//! The engine only reports raw lifecycle ticks; the semantic events mods
//! actually care about (collectible gained, stat changed, item discharged,
//! fatal damage incoming, ...) have to be recovered by sampling per-player
//! state once per tick and diffing it against the previous sample. This
//! crate owns that machinery end to end:
//!
//! - [`player_index`]: stable identity for a logical player, derived from a
//!   save-persistent seed rather than any transient handle.
//! - [`containers`]: player-keyed maps with get-or-create-default semantics.
//! - [`save`]: the lifecycle-scoped state registry. Every detector's state
//!   lives in a named scope with `run`/`room`/`persistent` tiers, reset at
//!   the matching lifecycle boundary, persisted as an opaque chunk.
//! - [`dispatch`]: typed callback lists with optional filter arguments,
//!   notification and interception firing, and O(1) subscription queries.
//! - [`detectors`]: one detector per semantic event stream.
//! - [`hooks`]: the [`ModHooks`] facade that the engine binding feeds native
//!   hook invocations into, in a fixed documented order.
pub mod containers;
pub mod detectors;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod hooks;
pub mod player_index;
pub mod save;

pub use containers::{DefaultPlayerMap, PlayerMap};
pub use dispatch::{CallbackId, CallbackList, CallbackRegistry, FilteredEvent};
pub use error::{RegistryError, SaveError};
pub use events::{
    CollectibleAdded, CollectibleRemoved, FatalDamage, FatalDecision, HealthChanged,
    ItemDischarged, ItemPickedUp, PickupFilter, PonyActiveChanged, StatChanged, TransformationChanged,
    TrinketBroken,
};
pub use hooks::ModHooks;
pub use player_index::{PlayerIndex, player_index, player_index_differentiated};
pub use save::{FeatureState, SaveData, SaveDataManager, Scope};
