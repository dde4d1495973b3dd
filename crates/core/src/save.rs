//! Lifecycle-scoped state registry.
//!
//! Every detector owns exactly one named scope of mutable state, registered
//! here. The registry is the single place that knows when a tier of state
//! stops being meaningful: `run` state is discarded when a new run begins,
//! `room` state when a new room is entered, `persistent` state never. It is
//! also the sole persistence mechanism — scopes are snapshotted to opaque
//! JSON chunks keyed by name on save-and-quit and restored verbatim on
//! continue; no feature persists anything on its own.
//!
//! Registration hands back a [`Scope`] handle that the owning detector keeps;
//! the registry retains a type-erased view of the same state for resets and
//! persistence.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeSet;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::{RegistryError, SaveError};

/// State that knows how to return its lifecycle tiers to their defaults.
pub trait FeatureState: 'static {
    /// Discards everything scoped to the current run.
    fn reset_run(&mut self);

    /// Discards everything scoped to the current room.
    fn reset_room(&mut self);
}

/// The standard three-tier state block owned by a detector.
///
/// Tier resets replace the whole tier with `Default::default()`, so every
/// reset yields a fresh factory-produced value rather than a shared one.
#[derive(Clone, Debug, Default, Serialize, serde::Deserialize)]
pub struct SaveData<Run, Room = (), Persistent = ()> {
    pub run: Run,
    pub room: Room,
    pub persistent: Persistent,
}

impl<Run, Room, Persistent> FeatureState for SaveData<Run, Room, Persistent>
where
    Run: Default + 'static,
    Room: Default + 'static,
    Persistent: 'static,
{
    fn reset_run(&mut self) {
        self.run = Run::default();
    }

    fn reset_room(&mut self) {
        self.room = Room::default();
    }
}

/// Handle to a registered scope's state, held by the owning detector.
///
/// The subsystem is single-threaded and tick-driven, so shared access uses
/// `Rc<RefCell<_>>`; borrows never cross a hook invocation.
#[derive(Debug)]
pub struct Scope<S> {
    inner: Rc<RefCell<S>>,
}

impl<S> Clone for Scope<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> Scope<S> {
    pub fn borrow(&self) -> Ref<'_, S> {
        self.inner.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, S> {
        self.inner.borrow_mut()
    }
}

/// Predicate reporting whether anything still cares about a scope's state.
///
/// Consulted when snapshotting: an inactive scope is skipped. This is purely
/// a size/performance gate — correctness never depends on it.
pub type ActivePredicate = Rc<dyn Fn() -> bool>;

/// Type-erased view of one registered scope, kept by the registry.
trait ManagedScope {
    fn name(&self) -> &'static str;
    fn reset_run(&self);
    fn reset_room(&self);
    fn is_active(&self) -> bool;
    fn snapshot(&self) -> Result<serde_json::Value, SaveError>;
    fn restore(&self, chunk: serde_json::Value) -> Result<(), SaveError>;
}

struct ScopeEntry<S> {
    name: &'static str,
    state: Rc<RefCell<S>>,
    is_active: Option<ActivePredicate>,
}

impl<S> ManagedScope for ScopeEntry<S>
where
    S: FeatureState + Serialize + DeserializeOwned,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn reset_run(&self) {
        self.state.borrow_mut().reset_run();
    }

    fn reset_room(&self) {
        self.state.borrow_mut().reset_room();
    }

    fn is_active(&self) -> bool {
        match &self.is_active {
            Some(predicate) => predicate(),
            None => true,
        }
    }

    fn snapshot(&self) -> Result<serde_json::Value, SaveError> {
        serde_json::to_value(&*self.state.borrow()).map_err(|source| SaveError::Serialize {
            name: self.name,
            source,
        })
    }

    fn restore(&self, chunk: serde_json::Value) -> Result<(), SaveError> {
        *self.state.borrow_mut() =
            serde_json::from_value(chunk).map_err(|source| SaveError::Deserialize {
                name: self.name,
                source,
            })?;
        Ok(())
    }
}

/// Registry owning every feature's named state scope.
#[derive(Default)]
pub struct SaveDataManager {
    scopes: Vec<Box<dyn ManagedScope>>,
    names: BTreeSet<&'static str>,
}

impl SaveDataManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named scope with the given initial state, returning the
    /// owner's handle.
    ///
    /// Registering the same name twice is a programmer error and fails
    /// loudly; it never silently overwrites the earlier scope.
    pub fn register<S>(
        &mut self,
        name: &'static str,
        initial: S,
        is_active: Option<ActivePredicate>,
    ) -> Result<Scope<S>, RegistryError>
    where
        S: FeatureState + Serialize + DeserializeOwned,
    {
        if !self.names.insert(name) {
            return Err(RegistryError::DuplicateScope(name));
        }

        let state = Rc::new(RefCell::new(initial));
        self.scopes.push(Box::new(ScopeEntry {
            name,
            state: Rc::clone(&state),
            is_active,
        }));
        trace!(scope = name, "registered save data scope");
        Ok(Scope { inner: state })
    }

    /// Resets every scope's run tier (and room tier, which cannot outlive
    /// the run). Invoked when a new run begins, including debug-console
    /// restarts the engine reports as a new run.
    pub fn reset_run(&mut self) {
        debug!(scopes = self.scopes.len(), "resetting run-scoped state");
        for scope in &self.scopes {
            scope.reset_run();
            scope.reset_room();
        }
    }

    /// Resets every scope's room tier. Invoked on every room transition.
    pub fn reset_room(&mut self) {
        trace!(scopes = self.scopes.len(), "resetting room-scoped state");
        for scope in &self.scopes {
            scope.reset_room();
        }
    }

    /// Serializes every active scope into an opaque chunk map.
    ///
    /// The layout is `{ scope name: chunk }` and is meaningful only to
    /// [`restore`](Self::restore); the surrounding save-file format belongs
    /// to the engine binding.
    pub fn snapshot(&self) -> Result<serde_json::Value, SaveError> {
        let mut chunks = serde_json::Map::new();
        for scope in &self.scopes {
            if !scope.is_active() {
                trace!(scope = scope.name(), "skipping inactive scope");
                continue;
            }
            chunks.insert(scope.name().to_owned(), scope.snapshot()?);
        }
        debug!(scopes = chunks.len(), "snapshotted save data");
        Ok(serde_json::Value::Object(chunks))
    }

    /// Restores scopes from a chunk map produced by [`snapshot`](Self::snapshot).
    ///
    /// Scopes absent from the payload keep their current (default) state;
    /// chunks for unknown scope names are ignored, so save data written by a
    /// newer feature set loads cleanly.
    pub fn restore(&mut self, payload: &serde_json::Value) -> Result<(), SaveError> {
        let chunks = payload.as_object().ok_or(SaveError::MalformedPayload)?;
        let mut restored = 0usize;
        for scope in &self.scopes {
            if let Some(chunk) = chunks.get(scope.name()) {
                scope.restore(chunk.clone())?;
                restored += 1;
            }
        }
        debug!(restored, "restored save data");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestState = SaveData<u32, u32, u32>;

    #[test]
    fn duplicate_scope_names_are_rejected() {
        let mut manager = SaveDataManager::new();
        manager
            .register::<TestState>("feature", TestState::default(), None)
            .unwrap();
        let error = manager
            .register::<TestState>("feature", TestState::default(), None)
            .unwrap_err();
        assert!(matches!(error, RegistryError::DuplicateScope("feature")));
    }

    #[test]
    fn room_reset_restores_room_tier_only() {
        let mut manager = SaveDataManager::new();
        let scope = manager
            .register::<TestState>("feature", TestState::default(), None)
            .unwrap();

        {
            let mut state = scope.borrow_mut();
            state.run = 1;
            state.room = 2;
            state.persistent = 3;
        }
        manager.reset_room();

        let state = scope.borrow();
        assert_eq!((state.run, state.room, state.persistent), (1, 0, 3));
    }

    #[test]
    fn run_reset_clears_run_and_room_tiers() {
        let mut manager = SaveDataManager::new();
        let scope = manager
            .register::<TestState>("feature", TestState::default(), None)
            .unwrap();

        {
            let mut state = scope.borrow_mut();
            state.run = 1;
            state.room = 2;
            state.persistent = 3;
        }
        manager.reset_run();

        let state = scope.borrow();
        assert_eq!((state.run, state.room, state.persistent), (0, 0, 3));
    }

    #[test]
    fn snapshot_and_restore_round_trip() {
        let mut manager = SaveDataManager::new();
        let scope = manager
            .register::<TestState>("feature", TestState::default(), None)
            .unwrap();
        scope.borrow_mut().run = 42;

        let payload = manager.snapshot().unwrap();

        let mut fresh = SaveDataManager::new();
        let fresh_scope = fresh
            .register::<TestState>("feature", TestState::default(), None)
            .unwrap();
        fresh.restore(&payload).unwrap();
        assert_eq!(fresh_scope.borrow().run, 42);
    }

    #[test]
    fn inactive_scopes_are_skipped_when_snapshotting() {
        let mut manager = SaveDataManager::new();
        let scope = manager
            .register::<TestState>(
                "inactive",
                TestState::default(),
                Some(Rc::new(|| false)),
            )
            .unwrap();
        scope.borrow_mut().run = 42;

        let payload = manager.snapshot().unwrap();
        assert!(payload.as_object().unwrap().is_empty());
    }

    #[test]
    fn unknown_chunks_are_ignored_on_restore() {
        let mut manager = SaveDataManager::new();
        manager
            .register::<TestState>("known", TestState::default(), None)
            .unwrap();

        let payload = serde_json::json!({ "unknown": { "whatever": 1 } });
        manager.restore(&payload).unwrap();
    }
}
