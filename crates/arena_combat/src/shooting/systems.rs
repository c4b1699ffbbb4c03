//! Player shooting systems (variable step).

use bevy::prelude::*;

use crate::combat::catalog::EquippedWeapon;
use crate::combat::effects::{AimPreview, AimPreviewShape, EffectRequest};
use crate::combat::fire_mode::{apply_plan, plan_fire, FireOrder, ShooterRole};
use crate::combat::grenade::ThrowPolicy;
use crate::combat::scheduler::ActionScheduler;
use crate::combat::weapon_profile::{FireCategory, WeaponProfile};
use crate::combat::Dead;
use crate::components::{Combatant, Facing, Muzzle};
use crate::config::CombatConfig;
use crate::shooting::controller::{AimThresholds, AimingController, AimInput, GrenadeAimPoint};
use crate::DeterministicRng;

fn preview_shape(profile: &WeaponProfile, muzzle: Vec3, direction: Vec3, magnitude: f32) -> AimPreviewShape {
    match profile.category {
        FireCategory::Grenade => AimPreviewShape::Arc {
            target: muzzle + direction * profile.throw_distance(magnitude),
        },
        FireCategory::Shotgun => AimPreviewShape::Cone {
            range: profile.range,
            spread_angle: profile.shotgun.spread_angle,
        },
        _ => AimPreviewShape::Line { range: profile.range },
    }
}

/// System: AimingController state machine для всех бойцов с контроллером
///
/// 1. tick state machine по AimInput
/// 2. превью прицела (+ запись точки гранаты)
/// 3. отпускание → FireModeDispatcher
/// 4. rotation lock пока Firing
#[allow(clippy::type_complexity)]
pub fn update_aiming_controllers(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<CombatConfig>,
    mut scheduler: ResMut<ActionScheduler>,
    mut rng: ResMut<DeterministicRng>,
    mut controllers: Query<
        (
            Entity,
            &mut AimingController,
            &AimInput,
            &mut Facing,
            &mut GrenadeAimPoint,
            &Transform,
            Option<&Muzzle>,
            Option<&EquippedWeapon>,
            Option<&Combatant>,
        ),
        Without<Dead>,
    >,
    mut previews: EventWriter<AimPreview>,
    mut effects: EventWriter<EffectRequest>,
) {
    let now = time.elapsed_secs_f64();
    let thresholds = AimThresholds {
        aim_sensitivity: config.aim_sensitivity,
        min_shoot_threshold: config.min_shoot_threshold,
    };

    for (entity, mut controller, input, mut facing, mut aim_point, transform, muzzle, weapon, combatant) in
        controllers.iter_mut()
    {
        let profile = weapon.map(|w| w.profile().clone());
        let cooldown = profile.as_ref().map_or(0.0, |p| p.shooting_cooldown);
        let muzzle_position = Muzzle::world_position(muzzle, transform);

        let tick = controller.tick(input.0, now, cooldown, thresholds);

        if let Some(direction) = tick.locked_facing {
            facing.0 = direction;
        }

        if let Some((direction, magnitude)) = tick.preview {
            let shape = profile
                .as_ref()
                .map(|p| preview_shape(p, muzzle_position, direction, magnitude));
            if let Some(AimPreviewShape::Arc { target }) = shape {
                aim_point.0 = Some(target);
            }
            previews.write(AimPreview {
                combatant: entity,
                active: true,
                origin: muzzle_position,
                direction,
                shape,
            });
        }

        if tick.preview_ended {
            previews.write(AimPreview {
                combatant: entity,
                active: false,
                origin: muzzle_position,
                direction: controller.aim_direction,
                shape: None,
            });
        }

        let Some((direction, magnitude)) = tick.fire else {
            continue;
        };

        let order = FireOrder {
            shooter: entity,
            profile,
            muzzle: muzzle_position,
            direction,
            magnitude,
            team: combatant.map(|c| c.team),
            role: ShooterRole::Player,
            throw_policy: ThrowPolicy::PlayerThrown {
                recorded_aim_point: aim_point.0.take(),
            },
        };

        match plan_fire(&order, &config, &mut rng.rng) {
            Ok(plan) => {
                let sequenced = plan.sequenced;
                apply_plan(plan, &mut commands, &mut scheduler, &mut effects);
                controller.begin_firing(direction, now, sequenced);
                facing.0 = direction;
            }
            Err(err) => {
                crate::logger::log_error(&format!("🔫 {:?} failed to fire: {}", entity, err));
            }
        }
    }
}
