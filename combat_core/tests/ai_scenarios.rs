mod common;

use combat_core::prelude::*;

#[test]
fn test_aggro_radius() {
    let mut world = common::world();
    let wolf = world.spawn_from_template("wolf", Team(0), DVec2::ZERO).unwrap();
    let dummy = world
        .spawn_from_template("dummy", Team(1), DVec2::new(15.0, 0.0))
        .unwrap();
    let ai_events = EventRecorder::attach_topic(world.bus(), Topic::Ai);

    for _ in 0..5 {
        world.tick(0.1);
    }
    assert_eq!(world.get(wolf).unwrap().ai_state(), Some(AiState::Idle));
    assert!(ai_events.events().is_empty());

    world.set_position(dummy, DVec2::new(8.0, 0.0));
    world.tick(0.3);

    let unit = world.get(wolf).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::Chase));
    assert_eq!(unit.ai().unwrap().target(), Some(dummy));
    assert_eq!(unit.intent(), MovementIntent::MoveToward(DVec2::new(8.0, 0.0)));
    assert_eq!(
        ai_events.events(),
        vec![CombatEvent::AiStateChanged {
            unit: wolf,
            from: AiState::Idle,
            to: AiState::Chase,
        }]
    );
}

#[test]
fn test_chase_then_attack_with_default_skill() {
    let mut world = common::world();
    let wolf = world.spawn_from_template("wolf", Team(0), DVec2::ZERO).unwrap();
    let dummy = world
        .spawn_from_template("dummy", Team(1), DVec2::new(6.0, 0.0))
        .unwrap();
    world.tick(0.1);
    assert_eq!(world.get(wolf).unwrap().ai_state(), Some(AiState::Chase));

    let casts = EventRecorder::attach_topic(world.bus(), Topic::Cast);
    world.set_position(dummy, DVec2::new(1.0, 0.0));
    world.tick(0.1);

    let unit = world.get(wolf).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::Attack));
    assert_eq!(unit.intent(), MovementIntent::Halt);
    assert!(!unit.cooldowns().is_ready("claw", world.now()));
    let events = casts.take();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], CombatEvent::CastStarted { skill, .. } if skill == "claw"));
    assert!(matches!(&events[1], CombatEvent::CastCompleted { skill, .. } if skill == "claw"));
}

#[test]
fn test_dead_target_returns_to_idle() {
    let mut world = common::world();
    let wolf = world.spawn_from_template("wolf", Team(0), DVec2::ZERO).unwrap();
    let dummy = world
        .spawn_from_template("dummy", Team(1), DVec2::new(5.0, 0.0))
        .unwrap();
    world.tick(0.1);
    assert_eq!(world.get(wolf).unwrap().ai_state(), Some(AiState::Chase));

    world.apply_damage(dummy, 1000.0, Some(wolf));
    world.tick(0.3);
    let unit = world.get(wolf).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::Idle));
    assert_eq!(unit.ai().unwrap().target(), None);
    assert_eq!(unit.intent(), MovementIntent::Halt);
}

#[test]
fn test_friendly_units_are_ignored() {
    let mut world = common::world();
    let wolf = world.spawn_from_template("wolf", Team(0), DVec2::ZERO).unwrap();
    world
        .spawn_from_template("dummy", Team(0), DVec2::new(3.0, 0.0))
        .unwrap();
    world.tick(0.1);
    assert_eq!(world.get(wolf).unwrap().ai_state(), Some(AiState::Idle));
}

#[test]
fn test_skill_rule_cast_and_interrupt() {
    let mut world = common::world();
    let acolyte = world.spawn_from_template("acolyte", Team(0), DVec2::ZERO).unwrap();
    world
        .spawn_from_template("dummy", Team(1), DVec2::new(5.0, 0.0))
        .unwrap();
    let ai_events = EventRecorder::attach_topic(world.bus(), Topic::Ai);

    world.tick(0.1);
    let unit = world.get(acolyte).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::CastSkill));
    assert_eq!(unit.cast().map(|c| c.skill_id()), Some("bolt"));
    assert!((unit.resource(ResourceKind::Mana).unwrap().current() - 30.0).abs() < 1e-9);
    assert_eq!(ai_events.take().len(), 2);

    assert!(world.interrupt_cast(acolyte));
    let unit = world.get(acolyte).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::Attack));
    assert!(!unit.is_casting());

    // Bolt is cooling down and there is no basic skill, so the acolyte closes in
    world.tick(0.1);
    let unit = world.get(acolyte).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::Chase));
    assert_eq!(unit.intent(), MovementIntent::MoveToward(DVec2::new(5.0, 0.0)));
}

#[test]
fn test_cast_completes_then_attack() {
    let mut world = common::world();
    let acolyte = world.spawn_from_template("acolyte", Team(0), DVec2::ZERO).unwrap();
    world
        .spawn_from_template("dummy", Team(1), DVec2::new(5.0, 0.0))
        .unwrap();
    let casts = EventRecorder::attach_topic(world.bus(), Topic::Cast);

    world.tick(0.1);
    assert_eq!(world.get(acolyte).unwrap().ai_state(), Some(AiState::CastSkill));
    for _ in 0..5 {
        world.tick(0.5);
    }

    assert_eq!(
        casts.count(|e| matches!(e, CombatEvent::CastCompleted { .. })),
        1
    );
    let unit = world.get(acolyte).unwrap();
    assert!(!unit.is_casting());
    assert_ne!(unit.ai_state(), Some(AiState::CastSkill));
}

#[test]
fn test_retreat_until_recovered() {
    let mut world = common::world();
    let acolyte = world.spawn_from_template("acolyte", Team(0), DVec2::ZERO).unwrap();
    world
        .spawn_from_template("dummy", Team(1), DVec2::new(5.0, 0.0))
        .unwrap();

    world.apply_damage(acolyte, 60.0, None);
    world.tick(0.1);
    let unit = world.get(acolyte).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::Retreat));
    assert_eq!(unit.intent(), MovementIntent::MoveAway(DVec2::new(5.0, 0.0)));

    world.heal(acolyte, 100.0);
    world.tick(0.1);
    assert_eq!(world.get(acolyte).unwrap().ai_state(), Some(AiState::Chase));
}

#[test]
fn test_clear_ai_returns_control() {
    let mut world = common::world();
    let wolf = world.spawn_from_template("wolf", Team(0), DVec2::ZERO).unwrap();
    assert!(world.clear_ai(wolf));
    assert!(!world.clear_ai(wolf));
    assert!(world.get(wolf).unwrap().ai().is_none());

    world.set_ai_profile(wolf, "caster").unwrap();
    let unit = world.get(wolf).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::Idle));
    assert!(unit.knows_skill("bolt"));
    assert!(world.set_ai_profile(wolf, "nope").is_err());
}

fn snipe_casts(events: &[CombatEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, CombatEvent::CastStarted { skill, .. } if skill == "snipe"))
        .count()
}

#[test]
fn test_target_inside_min_range_forces_new_decision() {
    let mut world = common::world();
    let archer = world.spawn_from_template("archer", Team(0), DVec2::ZERO).unwrap();
    let dummy = world
        .spawn_from_template("dummy", Team(1), DVec2::new(8.0, 0.0))
        .unwrap();
    let casts = EventRecorder::attach_topic(world.bus(), Topic::Cast);

    world.tick(0.1);
    let unit = world.get(archer).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::Attack));
    let selected = unit.ai().unwrap().selected().unwrap();
    assert_eq!(selected.skill.as_deref(), Some("snipe"));
    assert_eq!(snipe_casts(&casts.take()), 1);

    // Well before the next scheduled decision the target closes to melee
    world.set_position(dummy, DVec2::new(1.0, 0.0));
    world.tick(0.1);

    let unit = world.get(archer).unwrap();
    let events = casts.take();
    assert_eq!(snipe_casts(&events), 0);
    assert!(events
        .iter()
        .any(|e| matches!(e, CombatEvent::CastStarted { skill, .. } if skill == "claw")));
    assert_eq!(unit.ai_state(), Some(AiState::Attack));
    let selected = unit.ai().unwrap().selected().unwrap();
    assert_eq!(selected.skill.as_deref(), Some("claw"));
    assert!((selected.max_range - 2.0).abs() < 1e-9);
    assert!(unit.ai().unwrap().next_decision_at() > 10.15);
}

#[test]
fn test_target_leaving_window_between_decisions() {
    let mut world = common::world();
    let archer = world.spawn_from_template("archer", Team(0), DVec2::ZERO).unwrap();
    let dummy = world
        .spawn_from_template("dummy", Team(1), DVec2::new(8.0, 0.0))
        .unwrap();
    let casts = EventRecorder::attach_topic(world.bus(), Topic::Cast);
    world.tick(0.1);
    assert_eq!(snipe_casts(&casts.take()), 1);

    world.set_position(dummy, DVec2::new(15.0, 0.0));
    world.tick(0.1);
    let unit = world.get(archer).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::Chase));
    assert_eq!(unit.intent(), MovementIntent::MoveToward(DVec2::new(15.0, 0.0)));
    assert_eq!(snipe_casts(&casts.take()), 0);

    // Back inside the window: chase turns straight into another shot
    world.set_position(dummy, DVec2::new(10.0, 0.0));
    world.tick(0.1);
    let unit = world.get(archer).unwrap();
    assert_eq!(unit.ai_state(), Some(AiState::Attack));
    assert_eq!(unit.intent(), MovementIntent::Halt);
    assert_eq!(snipe_casts(&casts.take()), 1);
}
