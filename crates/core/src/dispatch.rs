//! Callback subscription and dispatch.
//!
//! Each semantic event stream has a typed [`CallbackList`]. Subscribers can
//! attach optional filter arguments at subscription time; a subscriber fires
//! iff every filter value it registered is either unset or exactly equal to
//! the corresponding event argument. Notification streams invoke every
//! matching subscriber; interception streams stop at the first subscriber
//! returning a definite result.
//!
//! Detectors gate their per-frame work on
//! [`CallbackRegistry::has_subscriptions`], which must stay O(1): it reads a
//! shared per-id counter rather than walking the lists.

use std::cell::Cell;
use std::rc::Rc;

use strum::EnumCount;

use crate::events::{
    CollectibleAdded, CollectibleRemoved, FatalDamage, FatalDecision, HealthChanged,
    ItemDischarged, ItemPickedUp, PonyActiveChanged, StatChanged, TransformationChanged,
    TrinketBroken,
};
use crate::save::ActivePredicate;

/// Identifier of one semantic event stream.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumCount,
)]
#[strum(serialize_all = "snake_case")]
pub enum CallbackId {
    CollectibleAdded,
    CollectibleRemoved,
    StatChanged,
    HealthChanged,
    TransformationChanged,
    ItemDischarged,
    TrinketBroken,
    PonyActiveChanged,
    ItemPickedUp,
    FatalDamage,
}

/// Per-stream subscriber counters, shared between the registry and the
/// save-scope `is_active` predicates.
pub struct SubscriberCounts {
    counts: [Cell<usize>; CallbackId::COUNT],
}

impl SubscriberCounts {
    fn new() -> Self {
        Self {
            counts: std::array::from_fn(|_| Cell::new(0)),
        }
    }

    fn increment(&self, id: CallbackId) {
        let cell = &self.counts[id as usize];
        cell.set(cell.get() + 1);
    }

    /// True if the stream has at least one subscriber.
    pub fn any(&self, id: CallbackId) -> bool {
        self.counts[id as usize].get() > 0
    }
}

/// An event that supports optional filter arguments at subscription time.
pub trait FilteredEvent {
    /// The filter value(s) a subscriber may attach.
    type Filter;

    /// True if the event matches the filter (every set filter value equals
    /// the corresponding event argument).
    fn matches(&self, filter: &Self::Filter) -> bool;
}

struct Handler<E: FilteredEvent, R> {
    filter: Option<E::Filter>,
    func: Box<dyn FnMut(&E) -> Option<R>>,
}

/// Ordered list of subscribers for one event stream.
///
/// `R` is the interception result type; pure notification streams use the
/// default `()` and ignore handler results.
pub struct CallbackList<E: FilteredEvent, R = ()> {
    id: CallbackId,
    counts: Rc<SubscriberCounts>,
    handlers: Vec<Handler<E, R>>,
}

impl<E: FilteredEvent, R> CallbackList<E, R> {
    fn new(id: CallbackId, counts: Rc<SubscriberCounts>) -> Self {
        Self {
            id,
            counts,
            handlers: Vec::new(),
        }
    }

    /// Subscribes an unfiltered notification handler.
    pub fn subscribe(&mut self, mut handler: impl FnMut(&E) + 'static) {
        self.push(None, Box::new(move |event| {
            handler(event);
            None
        }));
    }

    /// Subscribes a notification handler that only fires when the event
    /// matches `filter`.
    pub fn subscribe_with(&mut self, filter: E::Filter, mut handler: impl FnMut(&E) + 'static)
    where
        E::Filter: 'static,
    {
        self.push(Some(filter), Box::new(move |event| {
            handler(event);
            None
        }));
    }

    /// Subscribes an interception handler; returning `Some` claims the event
    /// and short-circuits the remaining handlers.
    pub fn subscribe_intercept(&mut self, handler: impl FnMut(&E) -> Option<R> + 'static) {
        self.push(None, Box::new(handler));
    }

    /// Filtered variant of [`subscribe_intercept`](Self::subscribe_intercept).
    pub fn subscribe_intercept_with(
        &mut self,
        filter: E::Filter,
        handler: impl FnMut(&E) -> Option<R> + 'static,
    ) where
        E::Filter: 'static,
    {
        self.push(Some(filter), Box::new(handler));
    }

    fn push(&mut self, filter: Option<E::Filter>, func: Box<dyn FnMut(&E) -> Option<R>>) {
        self.handlers.push(Handler { filter, func });
        self.counts.increment(self.id);
    }

    /// Invokes every matching subscriber; results are ignored.
    pub fn notify(&mut self, event: &E) {
        for handler in &mut self.handlers {
            if let Some(filter) = &handler.filter
                && !event.matches(filter)
            {
                continue;
            }
            (handler.func)(event);
        }
    }

    /// Invokes matching subscribers until one returns a definite result,
    /// which is honored and short-circuits the rest.
    pub fn intercept(&mut self, event: &E) -> Option<R> {
        for handler in &mut self.handlers {
            if let Some(filter) = &handler.filter
                && !event.matches(filter)
            {
                continue;
            }
            if let Some(result) = (handler.func)(event) {
                return Some(result);
            }
        }
        None
    }
}

/// All event streams, one typed list per [`CallbackId`].
pub struct CallbackRegistry {
    counts: Rc<SubscriberCounts>,
    pub collectible_added: CallbackList<CollectibleAdded>,
    pub collectible_removed: CallbackList<CollectibleRemoved>,
    pub stat_changed: CallbackList<StatChanged>,
    pub health_changed: CallbackList<HealthChanged>,
    pub transformation_changed: CallbackList<TransformationChanged>,
    pub item_discharged: CallbackList<ItemDischarged>,
    pub trinket_broken: CallbackList<TrinketBroken>,
    pub pony_active_changed: CallbackList<PonyActiveChanged>,
    pub item_picked_up: CallbackList<ItemPickedUp>,
    pub fatal_damage: CallbackList<FatalDamage, FatalDecision>,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    pub fn new() -> Self {
        let counts = Rc::new(SubscriberCounts::new());
        Self {
            collectible_added: CallbackList::new(CallbackId::CollectibleAdded, Rc::clone(&counts)),
            collectible_removed: CallbackList::new(
                CallbackId::CollectibleRemoved,
                Rc::clone(&counts),
            ),
            stat_changed: CallbackList::new(CallbackId::StatChanged, Rc::clone(&counts)),
            health_changed: CallbackList::new(CallbackId::HealthChanged, Rc::clone(&counts)),
            transformation_changed: CallbackList::new(
                CallbackId::TransformationChanged,
                Rc::clone(&counts),
            ),
            item_discharged: CallbackList::new(CallbackId::ItemDischarged, Rc::clone(&counts)),
            trinket_broken: CallbackList::new(CallbackId::TrinketBroken, Rc::clone(&counts)),
            pony_active_changed: CallbackList::new(
                CallbackId::PonyActiveChanged,
                Rc::clone(&counts),
            ),
            item_picked_up: CallbackList::new(CallbackId::ItemPickedUp, Rc::clone(&counts)),
            fatal_damage: CallbackList::new(CallbackId::FatalDamage, Rc::clone(&counts)),
            counts,
        }
    }

    /// O(1) capability query consulted by detectors every frame.
    pub fn has_subscriptions(&self, id: CallbackId) -> bool {
        self.counts.any(id)
    }

    /// Builds a save-scope activity predicate that is true while any of the
    /// given streams has a subscriber.
    pub fn active_when(&self, ids: &'static [CallbackId]) -> ActivePredicate {
        let counts = Rc::clone(&self.counts);
        Rc::new(move || ids.iter().any(|&id| counts.any(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::FatalDecision;
    use crate::player_index::PlayerIndex;
    use modkit_api::{CollectibleType, DamageFlags, EntityType, Seed};
    use std::cell::RefCell;

    fn added(collectible: CollectibleType) -> CollectibleAdded {
        CollectibleAdded {
            player: PlayerIndex(Seed(1)),
            collectible,
        }
    }

    #[test]
    fn unfiltered_subscribers_see_every_event() {
        let mut registry = CallbackRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        registry
            .collectible_added
            .subscribe(move |event| sink.borrow_mut().push(event.collectible));

        registry.collectible_added.notify(&added(CollectibleType::SAD_ONION));
        registry.collectible_added.notify(&added(CollectibleType::INNER_EYE));
        assert_eq!(
            *seen.borrow(),
            vec![CollectibleType::SAD_ONION, CollectibleType::INNER_EYE],
        );
    }

    #[test]
    fn filtered_subscribers_fire_only_on_exact_match() {
        let mut registry = CallbackRegistry::new();
        let seen = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&seen);
        registry
            .collectible_added
            .subscribe_with(CollectibleType::SAD_ONION, move |_| {
                *sink.borrow_mut() += 1;
            });

        registry.collectible_added.notify(&added(CollectibleType::INNER_EYE));
        assert_eq!(*seen.borrow(), 0);
        registry.collectible_added.notify(&added(CollectibleType::SAD_ONION));
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn all_matching_subscribers_fire_independently() {
        let mut registry = CallbackRegistry::new();
        let seen = Rc::new(RefCell::new(0u32));
        for _ in 0..3 {
            let sink = Rc::clone(&seen);
            registry.collectible_added.subscribe(move |_| {
                *sink.borrow_mut() += 1;
            });
        }

        registry.collectible_added.notify(&added(CollectibleType::SAD_ONION));
        assert_eq!(*seen.borrow(), 3);
    }

    #[test]
    fn interception_stops_at_first_definite_result() {
        let mut registry = CallbackRegistry::new();
        let later_calls = Rc::new(RefCell::new(0u32));

        registry.fatal_damage.subscribe_intercept(|_| None);
        registry
            .fatal_damage
            .subscribe_intercept(|_| Some(FatalDecision::Veto));
        let sink = Rc::clone(&later_calls);
        registry.fatal_damage.subscribe_intercept(move |_| {
            *sink.borrow_mut() += 1;
            Some(FatalDecision::Allow)
        });

        let event = FatalDamage {
            player: PlayerIndex(Seed(1)),
            amount: 99.0,
            flags: DamageFlags::empty(),
            source: EntityType::NONE,
            frame: 0,
        };
        assert_eq!(
            registry.fatal_damage.intercept(&event),
            Some(FatalDecision::Veto),
        );
        assert_eq!(*later_calls.borrow(), 0);
    }

    #[test]
    fn has_subscriptions_tracks_every_stream_independently() {
        let mut registry = CallbackRegistry::new();
        assert!(!registry.has_subscriptions(CallbackId::CollectibleAdded));

        registry.collectible_added.subscribe(|_| {});
        assert!(registry.has_subscriptions(CallbackId::CollectibleAdded));
        assert!(!registry.has_subscriptions(CallbackId::CollectibleRemoved));
    }

    #[test]
    fn active_when_reflects_later_subscriptions() {
        let mut registry = CallbackRegistry::new();
        let predicate = registry.active_when(&[CallbackId::ItemDischarged]);
        assert!(!predicate());

        registry.item_discharged.subscribe(|_| {});
        assert!(predicate());
    }
}
