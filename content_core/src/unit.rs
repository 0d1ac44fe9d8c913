use crate::attribute::{AttributeCatalog, AttributeKey};
use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resource pool granted by a unit template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceTemplate {
    pub kind: ResourceKind,
    /// Attribute the pool's maximum is read from
    pub max_attribute: AttributeKey,
    /// Attribute holding per-second regeneration
    #[serde(default)]
    pub regen_attribute: Option<AttributeKey>,
    /// Start at full rather than empty
    #[serde(default = "default_start_full")]
    pub start_full: bool,
}

fn default_start_full() -> bool {
    true
}

/// Base data for spawning a combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitTemplate {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<AttributeKey, f64>,
    #[serde(default)]
    pub resources: Vec<ResourceTemplate>,
    /// Skill ids this unit can cast
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub ai_profile: Option<String>,
    /// Buffs applied on spawn (passives, auras)
    #[serde(default)]
    pub innate_buffs: Vec<String>,
}

impl UnitTemplate {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("unit template id is empty".to_string());
        }
        let mut seen = Vec::new();
        for resource in &self.resources {
            if seen.contains(&resource.kind) {
                return Err(format!(
                    "unit '{}' declares resource {} twice",
                    self.id, resource.kind
                ));
            }
            seen.push(resource.kind);
        }
        Ok(())
    }

    pub(crate) fn intern_keys(&mut self, catalog: &mut AttributeCatalog) {
        let attributes = std::mem::take(&mut self.attributes);
        self.attributes = attributes
            .into_iter()
            .map(|(key, value)| (catalog.intern(key.as_str()), value))
            .collect();
        for resource in &mut self.resources {
            catalog.canonicalize(&mut resource.max_attribute);
            if let Some(regen) = &mut resource.regen_attribute {
                catalog.canonicalize(regen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template() {
        let toml = r#"
id = "goblin"
name = "Goblin"
skills = ["claw"]
ai_profile = "goblin_melee"

[attributes]
max_health = 80.0
attack_power = 6.0
max_energy = 50.0

[[resources]]
kind = "energy"
max_attribute = "max_energy"
regen_attribute = "energy_regen"
"#;
        let template: UnitTemplate = toml::from_str(toml).unwrap();
        assert_eq!(template.attributes.len(), 3);
        assert_eq!(template.resources[0].kind, ResourceKind::Energy);
        assert!(template.resources[0].start_full);
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_duplicate_resource() {
        let resource = ResourceTemplate {
            kind: ResourceKind::Mana,
            max_attribute: AttributeKey::new("max_mana"),
            regen_attribute: None,
            start_full: true,
        };
        let template = UnitTemplate {
            id: "twin".to_string(),
            name: String::new(),
            attributes: BTreeMap::new(),
            resources: vec![resource.clone(), resource],
            skills: vec![],
            ai_profile: None,
            innate_buffs: vec![],
        };
        assert!(template.validate().is_err());
    }
}
