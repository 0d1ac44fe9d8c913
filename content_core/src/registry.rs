use crate::ai::AiProfile;
use crate::attribute::{AttributeCatalog, AttributeKey};
use crate::buff::BuffDefinition;
use crate::skill::SkillDefinition;
use crate::unit::UnitTemplate;
use crate::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// TOML layout of a content file; every section is optional
#[derive(Debug, Default, Deserialize)]
pub struct ContentFile {
    #[serde(default)]
    pub buffs: Vec<BuffDefinition>,
    #[serde(default)]
    pub skills: Vec<SkillDefinition>,
    #[serde(default)]
    pub ai_profiles: Vec<AiProfile>,
    #[serde(default)]
    pub units: Vec<UnitTemplate>,
}

/// Registry of all static combat content, loaded from TOML files
///
/// Definitions are handed out as `Arc`s so runtime state (buff instances,
/// AI runtimes) can reference them without owning them.
#[derive(Debug, Default)]
pub struct ContentSet {
    attributes: AttributeCatalog,
    buffs: HashMap<String, Arc<BuffDefinition>>,
    skills: HashMap<String, Arc<SkillDefinition>>,
    ai_profiles: HashMap<String, Arc<AiProfile>>,
    units: HashMap<String, Arc<UnitTemplate>>,
}

impl ContentSet {
    /// Create an empty content set
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all content files from a directory (recursively)
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut content = Self::new();
        content.load_dir(dir)?;
        tracing::debug!(
            buffs = content.buffs.len(),
            skills = content.skills.len(),
            ai_profiles = content.ai_profiles.len(),
            units = content.units.len(),
            "loaded combat content from {:?}",
            dir
        );
        Ok(content)
    }

    /// Parse a single content document (for tests and embedded content)
    pub fn parse_str(toml: &str) -> Result<Self, ConfigError> {
        let mut content = Self::new();
        content.merge_str(toml, Path::new("<inline>"))?;
        Ok(content)
    }

    /// Merge another content document into this set
    pub fn merge_str(&mut self, toml: &str, origin: &Path) -> Result<(), ConfigError> {
        let file: ContentFile = toml::from_str(toml).map_err(|e| ConfigError::Parse {
            error: e,
            path: origin.to_path_buf(),
        })?;
        self.merge(file, origin)
    }

    /// Load content files from a directory recursively
    fn load_dir(&mut self, dir: &Path) -> Result<(), ConfigError> {
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::Io {
                error: e,
                path: Some(dir.to_path_buf()),
            })?;
            paths.push(entry.path());
        }
        // Directory order is platform dependent; keep duplicate reporting stable
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.load_dir(&path)?;
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                self.load_file(&path)?;
            }
        }

        Ok(())
    }

    /// Load a single content file
    fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;
        self.merge_str(&content, path)
    }

    fn merge(&mut self, file: ContentFile, origin: &Path) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::Validation {
            message,
            path: origin.to_path_buf(),
        };

        for mut buff in file.buffs {
            buff.validate().map_err(invalid)?;
            if self.buffs.contains_key(&buff.id) {
                return Err(invalid(format!("duplicate buff id '{}'", buff.id)));
            }
            buff.intern_keys(&mut self.attributes);
            self.buffs.insert(buff.id.clone(), Arc::new(buff));
        }

        for skill in file.skills {
            skill.validate().map_err(invalid)?;
            if self.skills.contains_key(&skill.id) {
                return Err(invalid(format!("duplicate skill id '{}'", skill.id)));
            }
            self.skills.insert(skill.id.clone(), Arc::new(skill));
        }

        for mut profile in file.ai_profiles {
            profile.validate().map_err(invalid)?;
            if self.ai_profiles.contains_key(&profile.id) {
                return Err(invalid(format!("duplicate ai profile id '{}'", profile.id)));
            }
            profile.intern_keys(&mut self.attributes);
            self.ai_profiles.insert(profile.id.clone(), Arc::new(profile));
        }

        for mut unit in file.units {
            unit.validate().map_err(invalid)?;
            if self.units.contains_key(&unit.id) {
                return Err(invalid(format!("duplicate unit id '{}'", unit.id)));
            }
            unit.intern_keys(&mut self.attributes);
            self.units.insert(unit.id.clone(), Arc::new(unit));
        }

        Ok(())
    }

    /// Register a buff built in code; replaces any definition with the same id
    pub fn insert_buff(&mut self, mut buff: BuffDefinition) -> Arc<BuffDefinition> {
        buff.intern_keys(&mut self.attributes);
        let buff = Arc::new(buff);
        self.buffs.insert(buff.id.clone(), buff.clone());
        buff
    }

    /// Register a skill built in code; replaces any definition with the same id
    pub fn insert_skill(&mut self, skill: SkillDefinition) -> Arc<SkillDefinition> {
        let skill = Arc::new(skill);
        self.skills.insert(skill.id.clone(), skill.clone());
        skill
    }

    /// Register an AI profile built in code; replaces any profile with the same id
    pub fn insert_ai_profile(&mut self, mut profile: AiProfile) -> Arc<AiProfile> {
        profile.intern_keys(&mut self.attributes);
        let profile = Arc::new(profile);
        self.ai_profiles.insert(profile.id.clone(), profile.clone());
        profile
    }

    /// Register a unit template built in code; replaces any template with the same id
    pub fn insert_unit(&mut self, mut unit: UnitTemplate) -> Arc<UnitTemplate> {
        unit.intern_keys(&mut self.attributes);
        let unit = Arc::new(unit);
        self.units.insert(unit.id.clone(), unit.clone());
        unit
    }

    /// Canonical key for an attribute name
    pub fn attribute(&mut self, name: &str) -> AttributeKey {
        self.attributes.intern(name)
    }

    pub fn attributes(&self) -> &AttributeCatalog {
        &self.attributes
    }

    pub fn buff(&self, id: &str) -> Option<&Arc<BuffDefinition>> {
        self.buffs.get(id)
    }

    pub fn skill(&self, id: &str) -> Option<&Arc<SkillDefinition>> {
        self.skills.get(id)
    }

    pub fn ai_profile(&self, id: &str) -> Option<&Arc<AiProfile>> {
        self.ai_profiles.get(id)
    }

    pub fn unit(&self, id: &str) -> Option<&Arc<UnitTemplate>> {
        self.units.get(id)
    }

    /// List all buff IDs
    pub fn buff_ids(&self) -> impl Iterator<Item = &str> {
        self.buffs.keys().map(|s| s.as_str())
    }

    /// List all unit template IDs
    pub fn unit_ids(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(|s| s.as_str())
    }

    /// Report references to content that does not exist
    ///
    /// Dangling references are not fatal at runtime (lookups degrade to
    /// no-ops), so this is a separate pass rather than part of loading.
    pub fn dangling_references(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for profile in self.ai_profiles.values() {
            let skills = profile
                .skill_rules
                .iter()
                .map(|r| &r.skill)
                .chain(profile.default_skill.iter());
            for skill in skills {
                if !self.skills.contains_key(skill) {
                    missing.push(format!("ai profile '{}' -> skill '{}'", profile.id, skill));
                }
            }
        }
        for unit in self.units.values() {
            for skill in &unit.skills {
                if !self.skills.contains_key(skill) {
                    missing.push(format!("unit '{}' -> skill '{}'", unit.id, skill));
                }
            }
            for buff in &unit.innate_buffs {
                if !self.buffs.contains_key(buff) {
                    missing.push(format!("unit '{}' -> buff '{}'", unit.id, buff));
                }
            }
            if let Some(profile) = &unit.ai_profile {
                if !self.ai_profiles.contains_key(profile) {
                    missing.push(format!("unit '{}' -> ai profile '{}'", unit.id, profile));
                }
            }
        }
        missing.sort();
        missing
    }
}
