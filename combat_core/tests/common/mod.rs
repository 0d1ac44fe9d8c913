use combat_core::prelude::*;
use std::sync::{Arc, Once};

pub const CONTENT: &str = r#"
[[buffs]]
id = "poison"
name = "Poison"
stacking = "refresh"
duration = 3.0
tick_interval = 1.0
is_debuff = true

[[buffs.triggers]]
trigger = "tick"

[[buffs.triggers.effects]]
id = "damage"
magnitude = 4.0

[[buffs.triggers]]
trigger = "expire"

[[buffs.triggers.effects]]
id = "cleanse_fx"

[[buffs]]
id = "bloodlust"
stacking = "stack"
max_stacks = 3

[[buffs.triggers]]
trigger = "kill"

[[buffs.triggers.effects]]
id = "heal"
magnitude = 10.0

[[buffs]]
id = "silence"
stacking = "refresh"
duration = 2.0
blocks_casting = true

[[skills]]
id = "claw"
cooldown = 1.0
range = 1.5

[[skills]]
id = "bolt"
cost = 10.0
resource = "mana"
cooldown = 4.0
range = 8.0
cast_time = 2.0

[[skills]]
id = "snipe"
range = 12.0

[[ai_profiles]]
id = "archer"
aggro_range = 20.0
attack_range = 2.0
think_interval = 10.0
default_skill = "claw"

[[ai_profiles.skill_rules]]
skill = "snipe"
weight = 1.0
min_range = 4.0
max_range = 12.0

[[ai_profiles]]
id = "beast"
aggro_range = 10.0
attack_range = 2.0
think_interval = 0.25
default_skill = "claw"

[[ai_profiles]]
id = "caster"
aggro_range = 10.0
attack_range = 2.0
retreat_threshold = 0.3

[[ai_profiles.skill_rules]]
skill = "bolt"
weight = 1.0
min_range = 0.0
max_range = 8.0

[[units]]
id = "wolf"
name = "Wolf"
skills = ["claw"]
ai_profile = "beast"

[units.attributes]
max_health = 60.0

[[units]]
id = "acolyte"
name = "Acolyte"
ai_profile = "caster"

[units.attributes]
max_health = 80.0
max_mana = 40.0

[[units.resources]]
kind = "mana"
max_attribute = "max_mana"

[[units]]
id = "archer"
name = "Archer"
ai_profile = "archer"

[units.attributes]
max_health = 70.0

[[units]]
id = "dummy"
name = "Training Dummy"

[units.attributes]
max_health = 100.0
"#;

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub fn world() -> World {
    init_tracing();
    let content = ContentSet::parse_str(CONTENT).unwrap();
    World::new(Arc::new(content), CombatConstants::default(), 7)
}
