//! Arena Combat Simulation Core
//!
//! ECS-симуляция дальнего боя на Bevy 0.16:
//! оружие, снаряды, гранаты, взрывы, прицеливание игрока и AI.
//!
//! Хост (рендер, ввод, звук) пишет AimInput / EquipWeaponIntent и
//! читает EffectRequest / AimPreview / DamageDealt.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod logger;
pub mod shooting;

// Re-export основных типов для удобства
pub use ai::{AIPlugin, AiGunner, AttackRequest};
pub use combat::{
    CombatPlugin, DamageDealt, Dead, EffectRequest, EntityDied, EquipWeaponIntent, EquippedWeapon, FireCategory,
    WeaponCatalog, WeaponProfile, WeaponSelector,
};
pub use components::*;
pub use config::CombatConfig;
pub use error::CombatError;
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use shooting::{AimInput, AimState, AimingController, GrenadeAimPoint};

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Частота fixed шага берётся из CombatConfig, если он вставлен до плагина.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app.world().get_resource::<CombatConfig>().cloned().unwrap_or_default();

        app.insert_resource(Time::<Fixed>::from_hz(config.fixed_hz))
            // Детерминистичный RNG (seed по умолчанию), если хост не вставил свой
            .init_resource::<DeterministicRng>()
            .insert_resource(config)
            .add_plugins((CombatPlugin, AIPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время идёт вручную: каждый `app.update()` = ровно один fixed тик (1/60),
/// независимо от реальных часов. Это и даёт детерминизм.
pub fn create_headless_app(seed: u64) -> App {
    init_logger();

    let config = CombatConfig::default();
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(config.fixed_timestep()))
        .insert_resource(config)
        .add_plugins(SimulationPlugin);

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
