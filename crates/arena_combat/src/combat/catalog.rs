//! Каталог оружия (JSON) + экипировка бойцов.

use std::path::Path;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::weapon_profile::WeaponProfile;
use crate::error::CombatError;

/// Формат файла каталога: `{ "weapons": [ ... ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaponCatalogFile {
    pub weapons: Vec<WeaponProfile>,
}

/// Загруженный каталог. Порядок = индексы для `WeaponSelector::Index`.
#[derive(Resource, Debug, Clone, Default)]
pub struct WeaponCatalog {
    profiles: Vec<Arc<WeaponProfile>>,
}

impl WeaponCatalog {
    pub fn new(profiles: Vec<WeaponProfile>) -> Result<Self, CombatError> {
        for profile in &profiles {
            profile.validate()?;
        }
        Ok(Self {
            profiles: profiles.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CombatError> {
        let file: WeaponCatalogFile = serde_json::from_str(json)?;
        Self::new(file.weapons)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CombatError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Arc<WeaponProfile>, CombatError> {
        self.profiles
            .get(index)
            .cloned()
            .ok_or(CombatError::InvalidIndex { index, len: self.profiles.len() })
    }

    pub fn by_name(&self, name: &str) -> Result<Arc<WeaponProfile>, CombatError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| CombatError::configuration(format!("no weapon named '{}' in catalog", name)))
    }

    pub fn resolve(&self, selector: &WeaponSelector) -> Result<Arc<WeaponProfile>, CombatError> {
        match selector {
            WeaponSelector::Index(index) => self.get(*index),
            WeaponSelector::Name(name) => self.by_name(name),
        }
    }
}

/// Экипированное оружие бойца (разделяемый профиль).
#[derive(Component, Debug, Clone)]
pub struct EquippedWeapon(pub Arc<WeaponProfile>);

impl EquippedWeapon {
    pub fn new(profile: WeaponProfile) -> Self {
        Self(Arc::new(profile))
    }

    pub fn profile(&self) -> &Arc<WeaponProfile> {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeaponSelector {
    Index(usize),
    Name(String),
}

/// Событие: сменить оружие бойца (pickup, слот, UI)
#[derive(Event, Debug, Clone)]
pub struct EquipWeaponIntent {
    pub entity: Entity,
    pub selector: WeaponSelector,
}

/// System: обработка EquipWeaponIntent
///
/// Ошибка (нет каталога / индекс вне диапазона / нет имени) → лог,
/// прежнее оружие остаётся.
pub fn equip_weapons(
    mut commands: Commands,
    mut intents: EventReader<EquipWeaponIntent>,
    catalog: Option<Res<WeaponCatalog>>,
    combatants: Query<Option<&EquippedWeapon>>,
) {
    for intent in intents.read() {
        let Ok(current) = combatants.get(intent.entity) else {
            continue;
        };

        let resolved = match catalog.as_deref() {
            Some(catalog) => catalog.resolve(&intent.selector),
            None => Err(CombatError::configuration("weapon catalog is not loaded")),
        };

        match resolved {
            Ok(profile) => {
                crate::logger::log(&format!(
                    "🔫 {:?} equipped '{}' (was {:?})",
                    intent.entity,
                    profile.name,
                    current.map(|w| w.0.name.as_str())
                ));
                commands.entity(intent.entity).insert(EquippedWeapon(profile));
            }
            Err(err) => {
                crate::logger::log_error(&format!(
                    "Equip failed for {:?} ({:?}): {}",
                    intent.entity, intent.selector, err
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "weapons": [
            { "name": "pistol", "damage": 12.0 },
            { "name": "boomstick", "category": "shotgun", "shotgun": { "pellet_count": 7 } }
        ]
    }"#;

    #[test]
    fn test_catalog_from_json() {
        let catalog = WeaponCatalog::from_json_str(CATALOG_JSON).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().damage, 12.0);

        let shotgun = catalog.by_name("boomstick").unwrap();
        assert_eq!(shotgun.shotgun.pellet_count, 7);
        // Незаданные поля: дефолты
        assert_eq!(shotgun.shotgun.spread_angle, 15.0);
    }

    #[test]
    fn test_out_of_range_index() {
        let catalog = WeaponCatalog::from_json_str(CATALOG_JSON).unwrap();

        match catalog.get(5) {
            Err(CombatError::InvalidIndex { index, len }) => {
                assert_eq!(index, 5);
                assert_eq!(len, 2);
            }
            other => panic!("expected InvalidIndex, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_name_is_configuration_error() {
        let catalog = WeaponCatalog::from_json_str(CATALOG_JSON).unwrap();
        let result = catalog.resolve(&WeaponSelector::Name("railgun".into()));
        assert!(matches!(result, Err(CombatError::Configuration(_))));
    }

    #[test]
    fn test_invalid_profile_rejects_catalog() {
        let json = r#"{ "weapons": [ { "name": "broken", "range": 0.0 } ] }"#;
        assert!(WeaponCatalog::from_json_str(json).is_err());
    }

    #[test]
    fn test_equip_keeps_previous_on_bad_index() {
        let mut app = App::new();
        app.add_event::<EquipWeaponIntent>()
            .insert_resource(WeaponCatalog::from_json_str(CATALOG_JSON).unwrap())
            .add_systems(Update, equip_weapons);

        let entity = app
            .world_mut()
            .spawn(EquippedWeapon::new(WeaponProfile::rocket_launcher()))
            .id();

        app.world_mut().send_event(EquipWeaponIntent {
            entity,
            selector: WeaponSelector::Index(9),
        });
        app.update();

        let weapon = app.world().get::<EquippedWeapon>(entity).unwrap();
        assert_eq!(weapon.0.name, "rocket_launcher");

        app.world_mut().send_event(EquipWeaponIntent {
            entity,
            selector: WeaponSelector::Index(1),
        });
        app.update();

        let weapon = app.world().get::<EquippedWeapon>(entity).unwrap();
        assert_eq!(weapon.0.name, "boomstick");
    }
}
