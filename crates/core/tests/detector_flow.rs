//! End-to-end detector behavior through the [`ModHooks`] facade, driving a
//! scripted engine harness frame by frame.

use std::cell::RefCell;
use std::rc::Rc;

use modkit_api::{
    ActiveSlot, CollectibleType, DamageFlags, EntityFlags, EntityType, HealthKind, NpcVariant,
    PickingUpItem, PlayerStat, StatValue, TearFlags, TestGame, TestPlayer, TrinketType,
};
use modkit_core::events::{FatalDecision, PickupFilter};
use modkit_core::hooks::ModHooks;

fn recorder<T: 'static>() -> (Rc<RefCell<Vec<T>>>, Rc<RefCell<Vec<T>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    (Rc::clone(&seen), seen)
}

#[test]
fn collectible_added_fires_once_per_new_copy() {
    let mut hooks = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    hooks
        .callbacks()
        .collectible_added
        .subscribe(move |event| sink.borrow_mut().push(event.collectible));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);

    player.add_collectible(CollectibleType::SAD_ONION);
    hooks.post_effect_update(&game, &player);
    assert_eq!(*seen.borrow(), vec![CollectibleType::SAD_ONION]);

    // Unchanged inventory stays silent.
    game.advance();
    hooks.post_effect_update(&game, &player);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn reconciliation_attributes_the_measured_delta() {
    let mut hooks = ModHooks::new().unwrap();
    let (added_sink, added) = recorder();
    let (removed_sink, removed) = recorder();
    hooks
        .callbacks()
        .collectible_added
        .subscribe(move |event| added_sink.borrow_mut().push(event.collectible));
    hooks
        .callbacks()
        .collectible_removed
        .subscribe(move |event| removed_sink.borrow_mut().push(event.collectible));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.add_collectible(CollectibleType::SAD_ONION);
    hooks.post_effect_update(&game, &player);

    // {SAD_ONION: 1} -> {SAD_ONION: 1, INNER_EYE: 1}: exactly one added
    // event, zero removed events.
    game.advance();
    player.add_collectible(CollectibleType::INNER_EYE);
    hooks.post_effect_update(&game, &player);
    assert_eq!(
        *added.borrow(),
        vec![CollectibleType::SAD_ONION, CollectibleType::INNER_EYE],
    );
    assert!(removed.borrow().is_empty());
}

#[test]
fn active_item_swap_fires_a_balanced_pair() {
    let mut hooks = ModHooks::new().unwrap();
    let (added_sink, added) = recorder();
    let (removed_sink, removed) = recorder();
    hooks
        .callbacks()
        .collectible_added
        .subscribe(move |event| added_sink.borrow_mut().push(event.collectible));
    hooks
        .callbacks()
        .collectible_removed
        .subscribe(move |event| removed_sink.borrow_mut().push(event.collectible));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_active_item(ActiveSlot::Primary, CollectibleType::D4, 6);
    hooks.post_effect_update(&game, &player);
    assert_eq!(*added.borrow(), vec![CollectibleType::D4]);

    // Swapping one active for another keeps the total flat; the slot
    // comparison catches it anyway.
    game.advance();
    player.set_active_item(ActiveSlot::Primary, CollectibleType::D100, 4);
    hooks.post_effect_update(&game, &player);
    assert_eq!(*added.borrow(), vec![CollectibleType::D4, CollectibleType::D100]);
    assert_eq!(*removed.borrow(), vec![CollectibleType::D4]);
}

#[test]
fn stat_change_seeds_silently_then_reports_deltas() {
    let mut hooks = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    hooks
        .callbacks()
        .stat_changed
        .subscribe(move |event| sink.borrow_mut().push((event.stat, event.delta)));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_stat(PlayerStat::Damage, StatValue::Float(3.5));

    // First observation seeds, even though 3.5 differs from the default.
    hooks.post_effect_update(&game, &player);
    assert!(seen.borrow().is_empty());

    game.advance();
    player.set_stat(PlayerStat::Damage, StatValue::Float(4.0));
    hooks.post_effect_update(&game, &player);
    assert_eq!(*seen.borrow(), vec![(PlayerStat::Damage, 0.5)]);
}

#[test]
fn filtered_subscription_requires_exact_match() {
    let mut hooks = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    hooks
        .callbacks()
        .health_changed
        .subscribe_with(HealthKind::Soul, move |event| {
            sink.borrow_mut().push(event.delta)
        });

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_hearts(HealthKind::Red, 6);
    player.set_hearts(HealthKind::Soul, 2);
    hooks.post_effect_update(&game, &player);

    game.advance();
    player.set_hearts(HealthKind::Red, 4);
    player.set_hearts(HealthKind::Soul, 1);
    hooks.post_effect_update(&game, &player);

    // Only the soul-heart change passes the filter.
    assert_eq!(*seen.borrow(), vec![-1]);
}

#[test]
fn discharge_fires_on_charge_drop_without_drain() {
    let mut hooks = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    hooks
        .callbacks()
        .item_discharged
        .subscribe(move |event| {
            sink.borrow_mut()
                .push((event.previous_charge, event.current_charge))
        });

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_active_item(ActiveSlot::Primary, CollectibleType::SPOON_BENDER, 10);
    hooks.post_effect_update(&game, &player);

    game.advance();
    hooks.post_effect_update(&game, &player);
    assert!(seen.borrow().is_empty());

    game.advance();
    player.set_charge(ActiveSlot::Primary, 4);
    hooks.post_effect_update(&game, &player);
    assert_eq!(*seen.borrow(), vec![(10, 4)]);
}

#[test]
fn discharge_is_suppressed_after_a_bulb_collision() {
    let mut hooks = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    hooks
        .callbacks()
        .item_discharged
        .subscribe(move |event| sink.borrow_mut().push(event.collectible));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_active_item(ActiveSlot::Primary, CollectibleType::SPOON_BENDER, 10);
    hooks.post_effect_update(&game, &player);

    // Bulb collision on frame n+1; the drop lands on frame n+2, inside the
    // two-frame suppression window.
    game.advance();
    assert_eq!(
        hooks.pre_npc_collision(&game, EntityType::SUCKER, NpcVariant::BULB, &player),
        None,
    );
    hooks.post_effect_update(&game, &player);

    game.advance();
    player.set_charge(ActiveSlot::Primary, 4);
    hooks.post_effect_update(&game, &player);
    assert!(seen.borrow().is_empty());
}

#[test]
fn bulb_suppression_does_not_survive_a_room_transition() {
    let mut hooks = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    hooks
        .callbacks()
        .item_discharged
        .subscribe(move |event| sink.borrow_mut().push(event.collectible));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_active_item(ActiveSlot::Primary, CollectibleType::SPOON_BENDER, 10);
    hooks.post_effect_update(&game, &player);

    game.advance();
    hooks.pre_npc_collision(&game, EntityType::SUCKER, NpcVariant::BULB, &player);
    hooks.post_new_room();
    player.set_charge(ActiveSlot::Primary, 4);
    hooks.post_effect_update(&game, &player);
    assert_eq!(*seen.borrow(), vec![CollectibleType::SPOON_BENDER]);
}

#[test]
fn discharge_is_suppressed_when_the_slot_item_changed() {
    let mut hooks = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    hooks
        .callbacks()
        .item_discharged
        .subscribe(move |event| sink.borrow_mut().push(event.collectible));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_active_item(ActiveSlot::Primary, CollectibleType::SPOON_BENDER, 10);
    hooks.post_effect_update(&game, &player);

    // Swapping to a lower-charge item moves the meter but is not a use.
    game.advance();
    player.set_active_item(ActiveSlot::Primary, CollectibleType::D4, 2);
    hooks.post_effect_update(&game, &player);
    assert!(seen.borrow().is_empty());
}

#[test]
fn pony_state_machine_bridges_the_transient_gap() {
    let mut hooks = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    hooks
        .callbacks()
        .pony_active_changed
        .subscribe(move |event| sink.borrow_mut().push(event.active));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);

    // Transient [true, false, false], flags [true, true, false]: the active
    // sequence must be [true, true, false].
    player.temporary_effects.insert(CollectibleType::PONY);
    player.entity_flags = EntityFlags::riding();
    hooks.post_effect_update(&game, &player);
    assert!(hooks.is_pony_active(&player));

    game.advance();
    player.temporary_effects.clear();
    hooks.post_effect_update(&game, &player);
    assert!(hooks.is_pony_active(&player));

    game.advance();
    player.entity_flags = EntityFlags::empty();
    hooks.post_effect_update(&game, &player);
    assert!(!hooks.is_pony_active(&player));

    assert_eq!(*seen.borrow(), vec![true, false]);
}

#[test]
fn riding_flags_alone_never_activate_the_pony_state() {
    let mut hooks = ModHooks::new().unwrap();

    let game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.entity_flags = EntityFlags::riding();
    hooks.post_effect_update(&game, &player);
    assert!(!hooks.is_pony_active(&player));
}

#[test]
fn trinket_break_requires_a_recent_damage_frame() {
    let mut hooks = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    hooks
        .callbacks()
        .trinket_broken
        .subscribe(move |event| sink.borrow_mut().push(event.trinket));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_trinket_count(TrinketType::WISH_BONE, 1);
    hooks.post_effect_update(&game, &player);

    // Count drops without damage: a drop or smelt, not a break.
    game.advance();
    player.set_trinket_count(TrinketType::WISH_BONE, 0);
    hooks.post_effect_update(&game, &player);
    assert!(seen.borrow().is_empty());

    // Re-acquire, then lose the trinket to a hit.
    game.advance();
    player.set_trinket_count(TrinketType::WISH_BONE, 1);
    hooks.post_effect_update(&game, &player);

    game.advance();
    hooks.entity_take_damage(&game, &player, 1.0, DamageFlags::empty(), EntityType::NONE);
    player.set_trinket_count(TrinketType::WISH_BONE, 0);
    hooks.post_effect_update(&game, &player);
    assert_eq!(*seen.borrow(), vec![TrinketType::WISH_BONE]);
}

#[test]
fn pickup_fires_on_dequeue_and_feeds_collectible_detection() {
    let mut hooks = ModHooks::new().unwrap();
    let (pickup_sink, picked_up) = recorder();
    let (added_sink, added) = recorder();
    hooks
        .callbacks()
        .item_picked_up
        .subscribe_with(
            PickupFilter {
                kind: None,
                id: Some(CollectibleType::SAD_ONION.0),
            },
            move |event| pickup_sink.borrow_mut().push(event.item),
        );
    hooks
        .callbacks()
        .collectible_added
        .subscribe(move |event| added_sink.borrow_mut().push(event.collectible));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);

    // Holding the item above the head fires nothing.
    player.queued_item = Some(PickingUpItem::Collectible(CollectibleType::SAD_ONION));
    hooks.post_effect_update(&game, &player);
    assert!(picked_up.borrow().is_empty());

    // Dequeue: the item lands in the inventory on this frame.
    game.advance();
    player.queued_item = None;
    player.add_collectible(CollectibleType::SAD_ONION);
    hooks.post_effect_update(&game, &player);
    assert_eq!(
        *picked_up.borrow(),
        vec![PickingUpItem::Collectible(CollectibleType::SAD_ONION)],
    );
    // Exactly one added event despite both the pickup chain and the count
    // diff observing the same acquisition.
    assert_eq!(*added.borrow(), vec![CollectibleType::SAD_ONION]);
}

#[test]
fn fatal_damage_veto_cancels_the_hit() {
    let mut hooks = ModHooks::new().unwrap();
    hooks
        .callbacks()
        .fatal_damage
        .subscribe_intercept(|_| Some(FatalDecision::Veto));

    let game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_hearts(HealthKind::Red, 1);
    player.num_hits_remaining = 1;

    assert_eq!(
        hooks.entity_take_damage(&game, &player, 1.0, DamageFlags::empty(), EntityType::NONE),
        Some(false),
    );
}

#[test]
fn fatal_damage_without_subscribers_proceeds_unvetoed() {
    let mut hooks = ModHooks::new().unwrap();

    let game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_hearts(HealthKind::Red, 1);
    player.num_hits_remaining = 1;

    assert_eq!(
        hooks.entity_take_damage(&game, &player, 1.0, DamageFlags::empty(), EntityType::NONE),
        None,
    );
}

#[test]
fn non_fatal_damage_never_reaches_the_interceptors() {
    let mut hooks = ModHooks::new().unwrap();
    hooks
        .callbacks()
        .fatal_damage
        .subscribe_intercept(|_| Some(FatalDecision::Veto));

    let game = TestGame::new();
    let player = TestPlayer::new(1);

    assert_eq!(
        hooks.entity_take_damage(&game, &player, 1.0, DamageFlags::empty(), EntityType::NONE),
        None,
    );
}

#[test]
fn scripted_death_bypasses_the_fatality_computation() {
    let mut hooks = ModHooks::new().unwrap();
    hooks
        .callbacks()
        .fatal_damage
        .subscribe_intercept(|_| Some(FatalDecision::Veto));

    let game = TestGame::new();
    // A perfectly healthy player still dies to a scripted death.
    let player = TestPlayer::new(1);
    assert_eq!(hooks.pre_scripted_death(&game, &player), Some(false));
}

#[test]
fn snapshot_survives_a_continued_run() {
    let mut hooks = ModHooks::new().unwrap();
    hooks.callbacks().stat_changed.subscribe(|_| {});

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_stat(PlayerStat::Damage, StatValue::Float(3.5));
    hooks.post_effect_update(&game, &player);

    let payload = hooks.snapshot().unwrap();

    // Continue: the restored snapshot must diff against the pre-quit value,
    // not re-seed.
    let mut resumed = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    resumed
        .callbacks()
        .stat_changed
        .subscribe(move |event| sink.borrow_mut().push((event.previous, event.current)));
    resumed.restore(&payload).unwrap();
    resumed.post_game_started(true);

    game.advance();
    player.set_stat(PlayerStat::Damage, StatValue::Float(4.0));
    resumed.post_effect_update(&game, &player);
    assert_eq!(
        *seen.borrow(),
        vec![(StatValue::Float(3.5), StatValue::Float(4.0))],
    );
}

#[test]
fn snapshot_round_trips_through_json_text() {
    let mut hooks = ModHooks::new().unwrap();
    hooks.callbacks().stat_changed.subscribe(|_| {});

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_stat(
        PlayerStat::TearFlags,
        StatValue::Flags(TearFlags::SPECTRAL | TearFlags::HOMING),
    );
    hooks.post_effect_update(&game, &player);

    // Through the textual form the save-file collaborator would store.
    let text = serde_json::to_string(&hooks.snapshot().unwrap()).unwrap();
    let payload: serde_json::Value = serde_json::from_str(&text).unwrap();

    let mut resumed = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    resumed
        .callbacks()
        .stat_changed
        .subscribe(move |event| sink.borrow_mut().push(event.previous));
    resumed.restore(&payload).unwrap();
    resumed.post_game_started(true);

    game.advance();
    player.set_stat(PlayerStat::TearFlags, StatValue::Flags(TearFlags::SPECTRAL));
    resumed.post_effect_update(&game, &player);
    assert_eq!(
        *seen.borrow(),
        vec![StatValue::Flags(TearFlags::SPECTRAL | TearFlags::HOMING)],
    );
}

#[test]
fn a_fresh_run_discards_restored_state() {
    let mut hooks = ModHooks::new().unwrap();
    hooks.callbacks().stat_changed.subscribe(|_| {});

    let game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.set_stat(PlayerStat::Damage, StatValue::Float(3.5));
    hooks.post_effect_update(&game, &player);
    let payload = hooks.snapshot().unwrap();

    let mut fresh = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    fresh
        .callbacks()
        .stat_changed
        .subscribe(move |event| sink.borrow_mut().push(event.delta));
    fresh.restore(&payload).unwrap();
    fresh.post_game_started(false);

    // With run state discarded, the first observation seeds silently.
    player.set_stat(PlayerStat::Damage, StatValue::Float(4.0));
    fresh.post_effect_update(&game, &player);
    assert!(seen.borrow().is_empty());
}

#[test]
fn build_reroll_reconciles_the_whole_inventory() {
    let mut hooks = ModHooks::new().unwrap();
    let (added_sink, added) = recorder();
    let (removed_sink, removed) = recorder();
    hooks
        .callbacks()
        .collectible_added
        .subscribe(move |event| added_sink.borrow_mut().push(event.collectible));
    hooks
        .callbacks()
        .collectible_removed
        .subscribe(move |event| removed_sink.borrow_mut().push(event.collectible));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    player.add_collectible(CollectibleType::SAD_ONION);
    player.add_collectible(CollectibleType::SPOON_BENDER);
    hooks.post_effect_update(&game, &player);
    added.borrow_mut().clear();

    // A reroll replaces both passives at once while keeping the total flat.
    game.advance();
    player.remove_collectible(CollectibleType::SAD_ONION);
    player.remove_collectible(CollectibleType::SPOON_BENDER);
    player.add_collectible(CollectibleType::INNER_EYE);
    player.add_collectible(CollectibleType::BERSERK);
    hooks.post_use_item(&game, &player, CollectibleType::D100);
    assert_eq!(
        *added.borrow(),
        vec![CollectibleType::INNER_EYE, CollectibleType::BERSERK],
    );
    assert_eq!(
        *removed.borrow(),
        vec![CollectibleType::SAD_ONION, CollectibleType::SPOON_BENDER],
    );
}

#[test]
fn transformation_toggle_fires_in_both_directions() {
    let mut hooks = ModHooks::new().unwrap();
    let (sink, seen) = recorder();
    hooks
        .callbacks()
        .transformation_changed
        .subscribe(move |event| sink.borrow_mut().push((event.form, event.active)));

    let mut game = TestGame::new();
    let mut player = TestPlayer::new(1);
    hooks.post_effect_update(&game, &player);

    game.advance();
    player.forms.insert(modkit_api::PlayerForm::Guppy);
    hooks.post_effect_update(&game, &player);

    game.advance();
    player.forms.clear();
    hooks.post_effect_update(&game, &player);

    assert_eq!(
        *seen.borrow(),
        vec![
            (modkit_api::PlayerForm::Guppy, true),
            (modkit_api::PlayerForm::Guppy, false),
        ],
    );
}
