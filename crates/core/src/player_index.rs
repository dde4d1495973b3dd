//! Stable identity for a logical player.
//!
//! Tracking per-player data requires a map key that survives everything the
//! engine does to its handles: players can leave mid-run (shifting array
//! positions), swap controllers, and handle identity does not survive
//! relaunching the game. The one property that is stable for the lifetime of
//! a run — including across save/continue — is the seed of a player's
//! per-collectible RNG stream, so identity is derived from the seed of an
//! arbitrary designated collectible.

use std::fmt;

use modkit_api::{CollectibleType, PlayerType, PlayerView, Seed};
use serde::{Deserialize, Serialize};

/// The collectible whose RNG stream seeds the index. Any fixed choice works;
/// the player does not need to own it.
const INDEX_COLLECTIBLE: CollectibleType = CollectibleType::SAD_ONION;

/// Used instead of [`INDEX_COLLECTIBLE`] for the alternate twin face when
/// the caller asks for differentiated indices.
const TWIN_INDEX_COLLECTIBLE: CollectibleType = CollectibleType::INNER_EYE;

/// Opaque, comparable, hashable identity of one logical player.
///
/// Two distinct logical players never share an index within a run; the same
/// logical player always produces the same index across frames and across a
/// save/load cycle.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PlayerIndex(pub Seed);

impl fmt::Display for PlayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player[{}]", self.0)
    }
}

/// Derives the index of a logical player.
///
/// The two faces of a shared-save-slot twin character collapse to one index;
/// use [`player_index_differentiated`] to keep them apart. Sub-players
/// resolve to their owning parent's index. When a sub-player's parent cannot
/// be resolved (a short early-initialization window), the sub-entity is
/// keyed by its own seed for that call only — a documented limitation, not a
/// silent misattribution.
pub fn player_index(player: &dyn PlayerView) -> PlayerIndex {
    derive(player, false)
}

/// Like [`player_index`], but the alternate face of a twin character yields
/// a distinct index from the main face.
pub fn player_index_differentiated(player: &dyn PlayerView) -> PlayerIndex {
    derive(player, true)
}

fn derive(player: &dyn PlayerView, differentiate_twin: bool) -> PlayerIndex {
    // Sub-players keep separate RNG streams from their parent, so the seed
    // must always be read from the owning parent.
    let seed_source = if player.is_sub_player() {
        player.parent().unwrap_or(player)
    } else {
        player
    };

    let collectible = if differentiate_twin && player.player_type() == PlayerType::SOUL {
        TWIN_INDEX_COLLECTIBLE
    } else {
        INDEX_COLLECTIBLE
    };

    PlayerIndex(seed_source.collectible_rng_seed(collectible))
}
