//! Применение урона и смерть
//!
//! Снаряды и взрывы не трогают Health напрямую: всё идёт через
//! `apply_hit` (capability-трейты) и события DamageDealt / EntityDied.

use bevy::prelude::*;

use crate::combat::weapon_profile::SlowSettings;
use crate::components::{Damageable, Health, MovementModifiers, Slowable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Projectile,
    Explosion,
}

/// Событие: урон нанесен
///
/// Используется для UI, звуков, эффектов.
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    /// None: владелец уже despawn'ут
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub amount: f32,
    pub source: DamageSource,
    pub impact_point: Vec3,
}

/// Событие: entity умер (health <= 0)
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв
///
/// Трупы остаются на месте (деспавн: забота хоста).
#[derive(Component, Debug)]
pub struct Dead;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    pub amount: f32,
    pub killed: bool,
}

/// Урон + опциональное замедление одной цели.
///
/// `killed` = true только на переходе alive → dead.
pub fn apply_hit(
    receiver: &mut impl Damageable,
    movement: Option<&mut impl Slowable>,
    amount: f32,
    slow: Option<SlowSettings>,
) -> HitReport {
    let was_alive = receiver.is_alive();
    receiver.take_damage(amount);
    let killed = was_alive && !receiver.is_alive();

    if let (Some(movement), Some(slow)) = (movement, slow) {
        if slow.is_active() {
            movement.apply_slow_effect(slow.magnitude, slow.duration);
        }
    }

    HitReport { amount, killed }
}

/// Общая точка входа для систем: урон цели + события.
#[allow(clippy::too_many_arguments)]
pub fn deal_damage(
    health: &mut Health,
    movement: Option<&mut MovementModifiers>,
    attacker: Option<Entity>,
    target: Entity,
    amount: f32,
    slow: Option<SlowSettings>,
    source: DamageSource,
    impact_point: Vec3,
    damage_events: &mut EventWriter<DamageDealt>,
    died_events: &mut EventWriter<EntityDied>,
) {
    let report = apply_hit(health, movement, amount, slow);

    damage_events.write(DamageDealt {
        attacker,
        target,
        amount: report.amount,
        source,
        impact_point,
    });

    crate::logger::log(&format!(
        "💥 {:?} damage {:.1} → {:?} (HP: {:.1})",
        source, report.amount, target, health.current
    ));

    if report.killed {
        died_events.write(EntityDied { entity: target, killer: attacker });
    }
}

/// System: EntityDied → маркер Dead
pub fn mark_dead(
    mut commands: Commands,
    mut died_events: EventReader<EntityDied>,
    alive: Query<(), Without<Dead>>,
) {
    for event in died_events.read() {
        if alive.get(event.entity).is_err() {
            continue;
        }
        commands.entity(event.entity).insert(Dead);
        crate::logger::log_info(&format!(
            "☠️ {:?} died (killer: {:?})",
            event.entity, event.killer
        ));
    }
}

/// System: тикаем замедления (fixed step)
pub fn tick_movement_modifiers(time: Res<Time<Fixed>>, mut modifiers: Query<&mut MovementModifiers>) {
    let delta = time.timestep().as_secs_f32();
    for mut modifier in modifiers.iter_mut() {
        if modifier.slow_remaining > 0.0 {
            modifier.tick(delta);
        }
    }
}
