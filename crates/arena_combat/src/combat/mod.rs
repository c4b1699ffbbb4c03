//! Combat module: дальний бой арены.
//!
//! ECS ответственность:
//! - WeaponProfile / каталог оружия (read-only, общий через Arc)
//! - Снаряды, ракеты, гранаты (fixed step, детерминированно)
//! - CollisionFilter: свой/союзник/цель
//! - ExplosiveResolver: урон по радиусу с falloff
//! - Events: DamageDealt, EntityDied, EffectRequest
//!
//! Хост (рендер, звук, VFX) только читает EffectRequest / AimPreview.

use bevy::prelude::*;

pub mod catalog;
pub mod collision_filter;
pub mod damage;
pub mod effects;
pub mod explosion;
pub mod fire_mode;
pub mod grenade;
pub mod projectile;
pub mod scheduler;
pub mod systems;
pub mod targeting;
pub mod weapon_profile;

#[cfg(test)]
mod fire_mode_tests;

// Re-export основных типов
pub use catalog::{equip_weapons, EquipWeaponIntent, EquippedWeapon, WeaponCatalog, WeaponSelector};
pub use collision_filter::{is_valid_hit, Candidate, CandidateLookup, ContactVerdict};
pub use damage::{mark_dead, tick_movement_modifiers, DamageDealt, DamageSource, Dead, EntityDied};
pub use effects::{AimPreview, AimPreviewShape, EffectRequest};
pub use explosion::{ExclusionPolicy, ExplosionEvent, ExplosionLedger};
pub use fire_mode::{apply_plan, plan_fire, FireOrder, FirePlan, ShooterRole};
pub use grenade::{GrenadeFlight, ThrowPolicy};
pub use projectile::{Projectile, ProjectileMotion};
pub use scheduler::{ActionScheduler, ScheduledAction};
pub use weapon_profile::{FireCategory, MotionBehavior, PrefabSpec, WeaponProfile};

use crate::config::CombatConfig;
use crate::shooting::update_aiming_controllers;

/// Combat Plugin
///
/// FixedUpdate (детерминированная симуляция):
/// 1. advance_projectiles: шаг снарядов, контакты, дальность
/// 2. advance_grenades: дуга гранат, детонация
/// 3. resolve_explosions: урон по радиусу, импульс телам
/// 4. mark_dead: EntityDied → маркер Dead
/// 5. tick_movement_modifiers: таймеры замедления
/// 6. run_scheduled_actions: очереди, включение коллайдеров дроби
///
/// Update (ввод и state machines):
/// 1. equip_weapons
/// 2. update_aiming_controllers: AimingController → FireModeDispatcher
///
/// Спавны через Commands вступают в силу после прохода, т.е. двигаются
/// со следующего fixed тика.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CombatConfig>()
            .init_resource::<ActionScheduler>()
            .init_resource::<ExplosionLedger>();

        // Регистрация событий
        app.add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<ExplosionEvent>()
            .add_event::<EffectRequest>()
            .add_event::<AimPreview>()
            .add_event::<EquipWeaponIntent>();

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: Motion + contacts
                systems::advance_projectiles,
                systems::advance_grenades,
                // Фаза 2: Area damage (взрывы этого же тика)
                systems::resolve_explosions,
                // Фаза 3: Death + status effects
                mark_dead,
                tick_movement_modifiers,
                // Фаза 4: Delayed actions (спавны со следующего тика)
                systems::run_scheduled_actions,
            )
                .chain(), // Последовательное выполнение
        );

        app.add_systems(Update, (equip_weapons, update_aiming_controllers).chain());
    }
}
