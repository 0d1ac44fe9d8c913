mod common;

use combat_core::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config")
}

fn shipped_world() -> World {
    common::init_tracing();
    let content = ContentSet::load(&config_dir().join("content")).unwrap();
    let constants = CombatConstants::load_from_path(&config_dir().join("combat.toml")).unwrap();
    World::new(Arc::new(content), constants, 11)
}

#[test]
fn test_shipped_content_is_consistent() {
    let content = ContentSet::load(&config_dir().join("content")).unwrap();
    assert!(content.dangling_references().is_empty());
    for id in ["knight", "wolf", "warlock"] {
        assert!(content.unit(id).is_some(), "missing template {}", id);
    }
    assert!(content.buff("burning").is_some());
    assert!(content.ai_profile("warlock").is_some());
}

#[test]
fn test_shipped_units_fight() {
    let mut world = shipped_world();
    let knight = world.spawn_from_template("knight", Team(0), DVec2::ZERO).unwrap();
    let wolf = world
        .spawn_from_template("wolf", Team(1), DVec2::new(8.0, 0.0))
        .unwrap();
    assert!(world.get(knight).unwrap().buffs().has("second_wind"));

    world.tick(0.1);
    assert_eq!(world.get(wolf).unwrap().ai_state(), Some(AiState::Chase));

    assert!(matches!(
        world.begin_cast(knight, "cleave", Some(wolf)),
        Err(CastError::OutOfRange { .. })
    ));
    world.set_position(wolf, DVec2::new(2.0, 0.0));
    world.begin_cast(knight, "cleave", Some(wolf)).unwrap();
    let energy = world
        .get(knight)
        .unwrap()
        .resource(ResourceKind::Energy)
        .unwrap()
        .current();
    assert!((energy - 90.0).abs() < 1e-9);
}
