//! Player-keyed containers.
//!
//! Detectors keep their per-player snapshots in maps keyed by
//! [`PlayerIndex`]. The plain [`PlayerMap`] resolves a player view to its
//! index on every access; [`DefaultPlayerMap`] adds get-or-create-default
//! semantics so that detector code never sees an absence signal once a
//! default exists for the value type.
//!
//! Both are thin wrappers over `BTreeMap`: the ordered map gives
//! deterministic iteration, which the collectible reconciliation relies on
//! for its tie-breaking order.

use std::collections::BTreeMap;
use std::collections::btree_map;

use modkit_api::PlayerView;
use serde::{Deserialize, Serialize};

use crate::player_index::{PlayerIndex, player_index};

/// A mapping from player identity to an arbitrary value.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerMap<V> {
    entries: BTreeMap<PlayerIndex, V>,
}

impl<V> Default for PlayerMap<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V> PlayerMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player: &dyn PlayerView) -> Option<&V> {
        self.entries.get(&player_index(player))
    }

    pub fn get_mut(&mut self, player: &dyn PlayerView) -> Option<&mut V> {
        self.entries.get_mut(&player_index(player))
    }

    /// Looks up by an already-derived index.
    pub fn get_index(&self, index: PlayerIndex) -> Option<&V> {
        self.entries.get(&index)
    }

    pub fn insert(&mut self, player: &dyn PlayerView, value: V) -> Option<V> {
        self.entries.insert(player_index(player), value)
    }

    pub fn remove(&mut self, player: &dyn PlayerView) -> Option<V> {
        self.entries.remove(&player_index(player))
    }

    pub fn contains(&self, player: &dyn PlayerView) -> bool {
        self.entries.contains_key(&player_index(player))
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PlayerIndex, V> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A [`PlayerMap`] whose reads lazily materialize a default value.
///
/// The default is always produced by `V::default()` at the moment of first
/// access and committed to the map, so every player gets an independent
/// value — the shared-instance aliasing hazard of handing out one constant
/// cannot arise.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultPlayerMap<V> {
    entries: BTreeMap<PlayerIndex, V>,
}

impl<V> Default for DefaultPlayerMap<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V: Default> DefaultPlayerMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the player's value, creating and committing a fresh default
    /// on first access. Never returns an absence signal.
    pub fn get_or_default(&mut self, player: &dyn PlayerView) -> &mut V {
        self.entries.entry(player_index(player)).or_default()
    }

    /// Read-only lookup that does not materialize a default.
    pub fn get(&self, player: &dyn PlayerView) -> Option<&V> {
        self.entries.get(&player_index(player))
    }

    /// Looks up by an already-derived index, without materializing.
    pub fn get_index(&self, index: PlayerIndex) -> Option<&V> {
        self.entries.get(&index)
    }

    pub fn insert(&mut self, player: &dyn PlayerView, value: V) -> Option<V> {
        self.entries.insert(player_index(player), value)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, PlayerIndex, V> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_api::TestPlayer;

    #[test]
    fn get_or_default_commits_the_materialized_value() {
        let player = TestPlayer::new(1);
        let mut map: DefaultPlayerMap<Vec<u32>> = DefaultPlayerMap::new();

        map.get_or_default(&player).push(3);
        // The default was committed on first access; the second access sees
        // the same value, not a fresh default.
        assert_eq!(map.get_or_default(&player).as_slice(), &[3]);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn defaults_are_independent_per_player() {
        let first = TestPlayer::new(1);
        let second = TestPlayer::new(2);
        let mut map: DefaultPlayerMap<Vec<u32>> = DefaultPlayerMap::new();

        map.get_or_default(&first).push(1);
        assert!(map.get_or_default(&second).is_empty());
    }

    #[test]
    fn player_map_resolves_through_sub_player_parent() {
        let parent = TestPlayer::new(5);
        let sub = TestPlayer::sub_player_of(&parent);
        let mut map = PlayerMap::new();

        map.insert(&parent, 11);
        assert_eq!(map.get(&sub), Some(&11));
    }

    // Events carry a PlayerIndex rather than a player handle, so subscribers
    // holding a map look entries up by the already-derived index.
    #[test]
    fn lookup_by_derived_index_matches_lookup_by_player() {
        let player = TestPlayer::new(5);
        let index = player_index(&player);

        let mut map = PlayerMap::new();
        map.insert(&player, 11);
        *map.get_mut(&player).unwrap() += 1;
        assert_eq!(map.get_index(index), Some(&12));

        let mut defaults: DefaultPlayerMap<u32> = DefaultPlayerMap::new();
        *defaults.get_or_default(&player) = 7;
        assert_eq!(defaults.get_index(index), Some(&7));
    }
}
