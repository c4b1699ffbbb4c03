//! AI стрелок
//!
//! Idle → Tracking → Attack
//!
//! - Idle: противников в радиусе обнаружения нет
//! - Tracking: противник замечен, но дальше дистанции оружия
//! - Attack: в дистанции, раз в reload interval шлёт AttackRequest
//!
//! Выбор цели: только "ближайший противник". Патрули и навигация вне модуля.

use bevy::prelude::*;

use crate::combat::catalog::EquippedWeapon;
use crate::combat::fire_mode::{apply_plan, plan_fire, FireOrder, ShooterRole};
use crate::combat::grenade::{ThreatInfo, ThrowPolicy};
use crate::combat::scheduler::ActionScheduler;
use crate::combat::targeting::nearest_opposing;
use crate::combat::weapon_profile::FireCategory;
use crate::combat::{Dead, EffectRequest};
use crate::components::{flatten_direction, Combatant, Facing, Muzzle, Velocity};
use crate::config::CombatConfig;
use crate::DeterministicRng;

#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum GunnerState {
    #[default]
    Idle,
    Tracking { target: Entity },
    Attack { target: Entity },
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AiGunner {
    pub state: GunnerState,
    /// Секунды с последней атаки
    pub reload_timer: f32,
}

/// Событие: AI хочет выстрелить в точку.
#[derive(Event, Debug, Clone)]
pub struct AttackRequest {
    pub shooter: Entity,
    pub target_position: Vec3,
}

/// Минимальный интервал между атаками AI.
pub fn reload_interval(config: &CombatConfig, weapon: Option<&EquippedWeapon>) -> f32 {
    let cooldown = weapon.map_or(0.0, |w| w.profile().shooting_cooldown);
    config.ai_reload_interval.max(cooldown)
}

/// System: выбор цели + AttackRequest
#[allow(clippy::type_complexity)]
pub fn ai_gunner_attack(
    time: Res<Time>,
    config: Res<CombatConfig>,
    mut gunners: Query<
        (Entity, &mut AiGunner, &Transform, &Combatant, Option<&EquippedWeapon>, &mut Facing),
        Without<Dead>,
    >,
    others: Query<(Entity, &Transform, &Combatant), Without<Dead>>,
    mut requests: EventWriter<AttackRequest>,
) {
    let delta = time.delta_secs();

    for (entity, mut gunner, transform, combatant, weapon, mut facing) in gunners.iter_mut() {
        gunner.reload_timer += delta;

        let opponent = nearest_opposing(
            entity,
            transform.translation,
            Some(combatant.team),
            others.iter().map(|(e, t, c)| (e, t.translation, c.team)),
        )
        .filter(|o| o.distance <= config.ai_detection_range);

        let Some(opponent) = opponent else {
            gunner.state = GunnerState::Idle;
            continue;
        };

        let engagement_range = weapon.map_or(0.0, |w| w.profile().engagement_range());
        if opponent.distance > engagement_range {
            gunner.state = GunnerState::Tracking { target: opponent.entity };
            continue;
        }

        gunner.state = GunnerState::Attack { target: opponent.entity };
        if let Some(direction) = flatten_direction(opponent.position - transform.translation) {
            facing.0 = direction;
        }

        if gunner.reload_timer > reload_interval(&config, weapon) {
            gunner.reload_timer = 0.0;
            requests.write(AttackRequest {
                shooter: entity,
                target_position: opponent.position,
            });
        }
    }
}

/// System: AttackRequest → FireModeDispatcher
///
/// Направление: горизонтальное, к точке цели. Для гранат дальность
/// подбирается под дистанцию до цели.
#[allow(clippy::too_many_arguments)]
pub fn process_attack_requests(
    mut commands: Commands,
    config: Res<CombatConfig>,
    mut scheduler: ResMut<ActionScheduler>,
    mut rng: ResMut<DeterministicRng>,
    mut requests: EventReader<AttackRequest>,
    shooters: Query<(&Transform, Option<&Muzzle>, Option<&EquippedWeapon>, Option<&Combatant>), Without<Dead>>,
    threats: Query<(Entity, &Transform, &Combatant, &Velocity, &Facing), Without<Dead>>,
    mut effects: EventWriter<EffectRequest>,
) {
    for request in requests.read() {
        let Ok((transform, muzzle, weapon, combatant)) = shooters.get(request.shooter) else {
            continue;
        };

        let muzzle_position = Muzzle::world_position(muzzle, transform);
        let profile = weapon.map(|w| w.profile().clone());
        let team = combatant.map(|c| c.team);

        let magnitude = match profile.as_ref() {
            Some(p) if p.category == FireCategory::Grenade => {
                p.throw_magnitude_for(transform.translation.distance(request.target_position))
            }
            _ => 1.0,
        };

        let nearest = nearest_opposing(
            request.shooter,
            transform.translation,
            team,
            threats.iter().map(|(e, t, c, _, _)| (e, t.translation, c.team)),
        )
        .and_then(|o| threats.get(o.entity).ok())
        .map(|(e, t, _, velocity, facing)| ThreatInfo {
            entity: e,
            position: t.translation,
            velocity: velocity.0,
            facing: facing.0,
        });

        let order = FireOrder {
            shooter: request.shooter,
            profile,
            muzzle: muzzle_position,
            direction: request.target_position - muzzle_position,
            magnitude,
            team,
            role: ShooterRole::Ai,
            throw_policy: ThrowPolicy::AiThrown {
                owner_position: transform.translation,
                nearest,
            },
        };

        match plan_fire(&order, &config, &mut rng.rng) {
            Ok(plan) => {
                crate::logger::log(&format!(
                    "🤖 {:?} fires at {:?} ({} spawns)",
                    request.shooter,
                    request.target_position,
                    plan.spawns.len()
                ));
                apply_plan(plan, &mut commands, &mut scheduler, &mut effects);
            }
            Err(err) => {
                crate::logger::log_error(&format!("🤖 {:?} failed to fire: {}", request.shooter, err));
            }
        }
    }
}
