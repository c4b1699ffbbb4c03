//! Tests for fire mode planning.

use std::sync::Arc;

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::combat::fire_mode::*;
use crate::combat::grenade::ThrowPolicy;
use crate::combat::projectile::ProjectileMotion;
use crate::combat::scheduler::ScheduledAction;
use crate::combat::weapon_profile::{MotionBehavior, PrefabSpec, WeaponProfile};
use crate::components::TeamId;
use crate::config::CombatConfig;
use crate::error::CombatError;

fn order(profile: WeaponProfile) -> FireOrder {
    FireOrder {
        shooter: Entity::from_raw(1),
        profile: Some(Arc::new(profile)),
        muzzle: Vec3::new(0.0, 1.0, 0.0),
        direction: Vec3::Z,
        magnitude: 1.0,
        team: Some(TeamId(1)),
        role: ShooterRole::Player,
        throw_policy: ThrowPolicy::Fallback,
    }
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(7)
}

fn projectiles(plan: &FirePlan) -> Vec<&crate::combat::projectile::Projectile> {
    plan.spawns
        .iter()
        .filter_map(|s| match s {
            SpawnPlan::Projectile { projectile, .. } => Some(projectile),
            SpawnPlan::Grenade { .. } => None,
        })
        .collect()
}

#[test]
fn test_single_spawns_one_projectile_ahead_of_muzzle() {
    let config = CombatConfig::default();
    let plan = plan_fire(&order(WeaponProfile::pistol()), &config, &mut rng()).unwrap();

    assert_eq!(plan.spawns.len(), 1);
    assert!(!plan.sequenced);
    match &plan.spawns[0] {
        SpawnPlan::Projectile { position, arming_delay, projectile } => {
            assert!((*position - Vec3::new(0.0, 1.0, 0.3)).length() < 1e-5);
            assert!(arming_delay.is_none());
            assert_eq!(projectile.owner, Some(Entity::from_raw(1)));
            assert_eq!(projectile.owner_team, Some(TeamId(1)));
        }
        other => panic!("expected projectile, got {:?}", other),
    }
    assert_eq!(plan.effects.len(), 1);
}

#[test]
fn test_shotgun_pellets_within_spread() {
    let config = CombatConfig::default();
    let plan = plan_fire(&order(WeaponProfile::shotgun()), &config, &mut rng()).unwrap();
    let pellets = projectiles(&plan);

    assert_eq!(pellets.len(), 5);
    for pellet in pellets {
        let angle = pellet.direction.angle_between(Vec3::Z).to_degrees();
        assert!(angle <= 15.0 + 1e-3, "pellet angle {} out of spread", angle);
        assert!(pellet.direction.y.abs() < 1e-6, "spread is about vertical axis");
        assert!(!pellet.collider_enabled);
    }
}

#[test]
fn test_shotgun_arming_delay_by_role() {
    let config = CombatConfig::default();

    let player_plan = plan_fire(&order(WeaponProfile::shotgun()), &config, &mut rng()).unwrap();
    let mut ai_order = order(WeaponProfile::shotgun());
    ai_order.role = ShooterRole::Ai;
    let ai_plan = plan_fire(&ai_order, &config, &mut rng()).unwrap();

    let delay = |plan: &FirePlan| match &plan.spawns[0] {
        SpawnPlan::Projectile { arming_delay, .. } => *arming_delay,
        _ => None,
    };
    assert_eq!(delay(&player_plan), Some(0.1));
    assert_eq!(delay(&ai_plan), Some(0.2));
}

#[test]
fn test_shotgun_spread_is_deterministic_per_seed() {
    let config = CombatConfig::default();
    let a = plan_fire(&order(WeaponProfile::shotgun()), &config, &mut rng()).unwrap();
    let b = plan_fire(&order(WeaponProfile::shotgun()), &config, &mut rng()).unwrap();

    let dirs = |plan: &FirePlan| projectiles(plan).iter().map(|p| p.direction).collect::<Vec<_>>();
    assert_eq!(dirs(&a), dirs(&b));
}

#[test]
fn test_burst_schedules_remaining_shots() {
    let config = CombatConfig::default();
    let plan = plan_fire(&order(WeaponProfile::rifle()), &config, &mut rng()).unwrap();

    assert_eq!(plan.spawns.len(), 1);
    assert!(plan.sequenced);
    match &plan.follow_ups[..] {
        [(delay, ScheduledAction::BurstShot { remaining, .. })] => {
            assert!((delay - 0.2).abs() < 1e-6);
            assert_eq!(*remaining, 2);
        }
        other => panic!("unexpected follow ups {:?}", other),
    }
}

#[test]
fn test_burst_of_one_is_not_sequenced() {
    let mut rifle = WeaponProfile::rifle();
    rifle.automatic.burst_size = 1;
    let plan = plan_fire(&order(rifle), &CombatConfig::default(), &mut rng()).unwrap();

    assert!(!plan.sequenced);
    assert!(plan.follow_ups.is_empty());
}

#[test]
fn test_rocket_uses_rocket_motion() {
    let plan = plan_fire(&order(WeaponProfile::rocket_launcher()), &CombatConfig::default(), &mut rng()).unwrap();
    let rockets = projectiles(&plan);

    assert_eq!(rockets[0].motion, ProjectileMotion::Rocket);
    assert!(plan.fallbacks.is_empty());
}

#[test]
fn test_rocket_falls_back_to_generic_projectile() {
    let mut rocket = WeaponProfile::rocket_launcher();
    rocket.prefab = Some(PrefabSpec::with_behaviors(&[MotionBehavior::Projectile]));

    let plan = plan_fire(&order(rocket), &CombatConfig::default(), &mut rng()).unwrap();
    let spawned = projectiles(&plan);

    assert_eq!(spawned[0].motion, ProjectileMotion::Generic);
    assert!(spawned[0].explosive, "fallback keeps explosive flag");
    assert!(matches!(plan.fallbacks[..], [CombatError::ComponentMismatch(_)]));
}

#[test]
fn test_grenade_without_any_behavior_is_discarded() {
    let mut grenade = WeaponProfile::grenade();
    grenade.prefab = Some(PrefabSpec::with_behaviors(&[MotionBehavior::Rocket]));

    let result = plan_fire(&order(grenade), &CombatConfig::default(), &mut rng());
    assert!(matches!(result, Err(CombatError::ComponentMismatch(_))));
}

#[test]
fn test_missing_prefab_is_configuration_error() {
    let mut pistol = WeaponProfile::pistol();
    pistol.prefab = None;

    let result = plan_fire(&order(pistol), &CombatConfig::default(), &mut rng());
    assert!(matches!(result, Err(CombatError::Configuration(_))));
}

#[test]
fn test_missing_weapon_is_configuration_error() {
    let mut unarmed = order(WeaponProfile::pistol());
    unarmed.profile = None;

    let result = plan_fire(&unarmed, &CombatConfig::default(), &mut rng());
    assert!(matches!(result, Err(CombatError::Configuration(_))));
}

#[test]
fn test_grenade_throw_distance_from_magnitude() {
    let mut throw = order(WeaponProfile::grenade());
    throw.magnitude = 0.5;
    throw.muzzle = Vec3::ZERO;

    let plan = plan_fire(&throw, &CombatConfig::default(), &mut rng()).unwrap();
    match &plan.spawns[0] {
        SpawnPlan::Grenade { flight } => {
            assert!((flight.target - Vec3::new(0.0, 0.0, 6.0)).length() < 1e-5);
            assert!((flight.arc_height - 2.0).abs() < 1e-5);
            assert!((flight.duration - 0.907_846).abs() < 1e-4);
        }
        other => panic!("expected grenade, got {:?}", other),
    }
}

#[test]
fn test_pellet_direction_rotates_about_vertical() {
    let rotated = pellet_direction(Vec3::Z, 90.0);
    assert!((rotated - Vec3::X).length() < 1e-5);
}
