//! FireModeDispatcher: стратегия выстрела по FireCategory.
//!
//! Разделён на две фазы:
//! 1. `plan_fire`: чистое планирование (что заспавнить, что отложить)
//! 2. `apply_plan`: применение через Commands + ActionScheduler
//!
//! Спавны через Commands применяются после fixed-прохода, поэтому новые
//! снаряды начинают двигаться со следующего тика.

use std::sync::Arc;

use bevy::prelude::*;
use rand::Rng;

use crate::combat::effects::EffectRequest;
use crate::combat::grenade::{resolve_throw_target, GrenadeFlight, LeadSettings, ThrowPolicy};
use crate::combat::projectile::{Projectile, ProjectileMotion};
use crate::combat::scheduler::{ActionScheduler, ScheduledAction};
use crate::combat::weapon_profile::{FireCategory, MotionBehavior, WeaponProfile};
use crate::components::{flatten_direction, TeamId};
use crate::config::CombatConfig;
use crate::error::CombatError;

/// Кто стреляет (влияет на дробь и политику броска).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShooterRole {
    Player,
    Ai,
}

/// Запрос на выстрел (от AimingController или AI).
#[derive(Debug, Clone)]
pub struct FireOrder {
    pub shooter: Entity,
    /// None: у бойца нет оружия (ConfigurationError)
    pub profile: Option<Arc<WeaponProfile>>,
    /// Мировая позиция ствола
    pub muzzle: Vec3,
    pub direction: Vec3,
    /// Сила ввода (дальность броска гранаты)
    pub magnitude: f32,
    pub team: Option<TeamId>,
    pub role: ShooterRole,
    pub throw_policy: ThrowPolicy,
}

#[derive(Debug, Clone)]
pub enum SpawnPlan {
    Projectile {
        projectile: Projectile,
        position: Vec3,
        /// Задержка включения коллайдера
        arming_delay: Option<f32>,
    },
    Grenade { flight: GrenadeFlight },
}

#[derive(Debug, Default)]
pub struct FirePlan {
    pub spawns: Vec<SpawnPlan>,
    pub follow_ups: Vec<(f32, ScheduledAction)>,
    pub effects: Vec<EffectRequest>,
    /// Контроллер остаётся в Firing до последнего подвыстрела
    pub sequenced: bool,
    /// Неудачные попытки motion behavior, закрытые fallback'ом
    pub fallbacks: Vec<CombatError>,
}

/// Выбор motion behavior с fallback на generic projectile.
fn select_motion(
    profile: &WeaponProfile,
    wanted: MotionBehavior,
) -> Result<(MotionBehavior, Option<CombatError>), CombatError> {
    let Some(prefab) = profile.prefab.as_ref() else {
        return Err(CombatError::configuration(format!(
            "weapon '{}' has no projectile prefab",
            profile.name
        )));
    };

    if prefab.has(wanted) {
        return Ok((wanted, None));
    }

    let mismatch = CombatError::component_mismatch(format!(
        "weapon '{}' prefab lacks {:?} behavior",
        profile.name, wanted
    ));
    if wanted != MotionBehavior::Projectile && prefab.has(MotionBehavior::Projectile) {
        return Ok((MotionBehavior::Projectile, Some(mismatch)));
    }

    Err(CombatError::component_mismatch(format!(
        "weapon '{}' prefab lacks {:?} and generic projectile behavior, spawn discarded",
        profile.name, wanted
    )))
}

/// Один прямой выстрел (Single, подвыстрел Burst).
pub fn plan_single_shot(
    shooter: Entity,
    profile: &Arc<WeaponProfile>,
    muzzle: Vec3,
    direction: Vec3,
    team: Option<TeamId>,
    config: &CombatConfig,
) -> Result<SpawnPlan, CombatError> {
    select_motion(profile, MotionBehavior::Projectile)?;

    let position = muzzle + direction * config.single_spawn_offset;
    let projectile = Projectile::new(
        profile.clone(),
        ProjectileMotion::Generic,
        position,
        direction,
        Some(shooter),
        team,
    );
    Ok(SpawnPlan::Projectile { projectile, position, arming_delay: None })
}

/// Направление дробины: поворот вокруг вертикали на `angle_degrees`.
pub fn pellet_direction(direction: Vec3, angle_degrees: f32) -> Vec3 {
    Quat::from_rotation_y(angle_degrees.to_radians()) * direction
}

pub fn plan_fire(
    order: &FireOrder,
    config: &CombatConfig,
    rng: &mut impl Rng,
) -> Result<FirePlan, CombatError> {
    let Some(profile) = order.profile.as_ref() else {
        return Err(CombatError::configuration(format!(
            "{:?} tried to fire without a weapon",
            order.shooter
        )));
    };

    let direction = flatten_direction(order.direction).unwrap_or(Vec3::Z);
    let mut plan = FirePlan::default();

    match profile.category {
        FireCategory::Single => {
            plan.spawns.push(plan_single_shot(
                order.shooter, profile, order.muzzle, direction, order.team, config,
            )?);
        }
        FireCategory::Burst => {
            plan.spawns.push(plan_single_shot(
                order.shooter, profile, order.muzzle, direction, order.team, config,
            )?);

            let burst_size = profile.automatic.burst_size.max(1);
            if burst_size > 1 {
                plan.follow_ups.push((
                    profile.automatic.fire_rate,
                    ScheduledAction::BurstShot {
                        shooter: order.shooter,
                        profile: profile.clone(),
                        direction,
                        remaining: burst_size - 1,
                    },
                ));
                plan.sequenced = true;
            }
        }
        FireCategory::Shotgun => {
            select_motion(profile, MotionBehavior::Projectile)?;

            let (spawn_offset, arming_delay) = match order.role {
                ShooterRole::Player => (config.pellet_spawn_offset, config.pellet_arming_delay),
                ShooterRole::Ai => (config.ai_pellet_spawn_offset, config.ai_pellet_arming_delay),
            };
            let spread = profile.shotgun.spread_angle.abs();

            for _ in 0..profile.shotgun.pellet_count {
                let angle = if spread > 0.0 { rng.gen_range(-spread..=spread) } else { 0.0 };
                let pellet = pellet_direction(direction, angle);
                let position = order.muzzle + pellet * spawn_offset;
                let projectile = Projectile::new(
                    profile.clone(),
                    ProjectileMotion::Generic,
                    position,
                    pellet,
                    Some(order.shooter),
                    order.team,
                )
                .with_collider_disabled();

                plan.spawns.push(SpawnPlan::Projectile {
                    projectile,
                    position,
                    arming_delay: Some(arming_delay),
                });
            }
        }
        FireCategory::Rocket => {
            let (behavior, fallback) = select_motion(profile, MotionBehavior::Rocket)?;
            plan.fallbacks.extend(fallback);

            let motion = match behavior {
                MotionBehavior::Rocket => ProjectileMotion::Rocket,
                _ => ProjectileMotion::Generic,
            };
            let position = order.muzzle + direction * config.single_spawn_offset;
            plan.spawns.push(SpawnPlan::Projectile {
                projectile: Projectile::new(
                    profile.clone(),
                    motion,
                    position,
                    direction,
                    Some(order.shooter),
                    order.team,
                ),
                position,
                arming_delay: None,
            });
        }
        FireCategory::Grenade => {
            let (behavior, fallback) = select_motion(profile, MotionBehavior::Grenade)?;
            plan.fallbacks.extend(fallback);

            if behavior == MotionBehavior::Grenade {
                let throw_distance = profile.throw_distance(order.magnitude);
                let lead = LeadSettings {
                    lead_distance: config.grenade_lead_distance,
                    velocity_threshold: config.lead_velocity_threshold,
                };
                let target = resolve_throw_target(
                    order.muzzle,
                    direction,
                    throw_distance,
                    &order.throw_policy,
                    lead,
                );
                plan.spawns.push(SpawnPlan::Grenade {
                    flight: GrenadeFlight::launch(
                        profile.clone(),
                        order.muzzle,
                        target,
                        Some(order.shooter),
                        order.team,
                    ),
                });
            } else {
                plan.spawns.push(plan_single_shot(
                    order.shooter, profile, order.muzzle, direction, order.team, config,
                )?);
            }
        }
    }

    plan.effects.push(EffectRequest::MuzzleFlash {
        shooter: order.shooter,
        position: order.muzzle,
        direction,
        category: profile.category,
    });

    Ok(plan)
}

/// Спавнит снаряды и ставит отложенные действия.
pub fn apply_plan(
    plan: FirePlan,
    commands: &mut Commands,
    scheduler: &mut ActionScheduler,
    effects: &mut EventWriter<EffectRequest>,
) -> Vec<Entity> {
    for fallback in &plan.fallbacks {
        crate::logger::log_warning(&format!("⚠️ {} (falling back to generic projectile)", fallback));
    }

    let mut spawned = Vec::with_capacity(plan.spawns.len());
    for spawn in plan.spawns {
        match spawn {
            SpawnPlan::Projectile { projectile, position, arming_delay } => {
                let entity = commands
                    .spawn((projectile, Transform::from_translation(position)))
                    .id();
                if let Some(delay) = arming_delay {
                    scheduler.schedule(delay, ScheduledAction::ArmCollider { projectile: entity });
                }
                spawned.push(entity);
            }
            SpawnPlan::Grenade { flight } => {
                let start = flight.start;
                spawned.push(commands.spawn((flight, Transform::from_translation(start))).id());
            }
        }
    }

    for (delay, action) in plan.follow_ups {
        scheduler.schedule(delay, action);
    }

    for effect in plan.effects {
        effects.write(effect);
    }

    spawned
}
