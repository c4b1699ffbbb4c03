//! Scheduled actions system (fixed step).

use bevy::prelude::*;

use crate::combat::damage::Dead;
use crate::combat::effects::EffectRequest;
use crate::combat::fire_mode::{apply_plan, plan_single_shot, FirePlan};
use crate::combat::projectile::Projectile;
use crate::combat::scheduler::{ActionScheduler, ScheduledAction};
use crate::components::{Combatant, Muzzle};
use crate::config::CombatConfig;
use crate::shooting::AimingController;

/// System: часы планировщика + исполнение созревших действий
///
/// Действие, чей владелец исчез (despawn или Dead), отменяется. Для
/// очереди это ещё и снимает rotation lock у контроллера.
#[allow(clippy::too_many_arguments)]
pub fn run_scheduled_actions(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    config: Res<CombatConfig>,
    mut scheduler: ResMut<ActionScheduler>,
    shooters: Query<(&Transform, Option<&Muzzle>, Option<&Combatant>), Without<Dead>>,
    mut projectiles: Query<&mut Projectile>,
    mut controllers: Query<&mut AimingController>,
    mut effects: EventWriter<EffectRequest>,
) {
    scheduler.advance(time.timestep().as_secs_f64());

    for action in scheduler.drain_due() {
        match action {
            ScheduledAction::BurstShot { shooter, profile, direction, remaining } => {
                let Ok((transform, muzzle, combatant)) = shooters.get(shooter) else {
                    crate::logger::log(&format!("🔫 Burst of {:?} cancelled: shooter is gone", shooter));
                    if let Ok(mut controller) = controllers.get_mut(shooter) {
                        controller.release_firing();
                    }
                    continue;
                };

                let muzzle_position = Muzzle::world_position(muzzle, transform);
                let team = combatant.map(|c| c.team);

                match plan_single_shot(shooter, &profile, muzzle_position, direction, team, &config) {
                    Ok(spawn) => {
                        let plan = FirePlan {
                            spawns: vec![spawn],
                            effects: vec![EffectRequest::MuzzleFlash {
                                shooter,
                                position: muzzle_position,
                                direction,
                                category: profile.category,
                            }],
                            ..Default::default()
                        };
                        apply_plan(plan, &mut commands, &mut scheduler, &mut effects);
                    }
                    Err(err) => {
                        crate::logger::log_error(&format!("🔫 Burst shot of {:?} failed: {}", shooter, err));
                    }
                }

                if remaining > 1 {
                    scheduler.schedule(
                        profile.automatic.fire_rate,
                        ScheduledAction::BurstShot {
                            shooter,
                            profile: profile.clone(),
                            direction,
                            remaining: remaining - 1,
                        },
                    );
                } else if let Ok(mut controller) = controllers.get_mut(shooter) {
                    controller.release_firing();
                }
            }
            ScheduledAction::ArmCollider { projectile } => {
                if let Ok(mut projectile) = projectiles.get_mut(projectile) {
                    projectile.collider_enabled = true;
                }
            }
        }
    }
}
