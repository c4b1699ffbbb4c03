//! Projectile systems (fixed step).

use bevy::prelude::*;

use crate::combat::collision_filter::{classify_contact, CandidateLookup, ContactVerdict};
use crate::combat::damage::{deal_damage, DamageSource, DamageDealt, EntityDied};
use crate::combat::effects::EffectRequest;
use crate::combat::explosion::{ExclusionPolicy, ExplosionEvent, ExplosionLedger};
use crate::combat::projectile::{segment_sphere_entry, Projectile, ProjectileMotion};
use crate::components::{Health, Hurtbox, MovementModifiers};
use crate::config::CombatConfig;

/// Контакты шага, отсортированные по точке входа (при равенстве: по entity).
pub(crate) fn sweep_contacts<'a>(
    from: Vec3,
    to: Vec3,
    radius: f32,
    hurtboxes: impl Iterator<Item = (Entity, &'a Transform, &'a Hurtbox)>,
) -> Vec<(f32, Entity)> {
    let mut contacts: Vec<(f32, Entity)> = hurtboxes
        .filter_map(|(entity, transform, hurtbox)| {
            segment_sphere_entry(from, to, hurtbox.center(transform), hurtbox.radius + radius)
                .map(|fraction| (fraction, entity))
        })
        .collect();
    contacts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    contacts
}

fn detonation(projectile: &Projectile, id: u64, origin: Vec3) -> ExplosionEvent {
    let profile = &projectile.profile;
    ExplosionEvent {
        id,
        origin,
        radius: profile.explosion.explosion_radius,
        base_damage: profile.damage,
        owner: projectile.owner,
        owner_team: projectile.owner_team,
        policy: ExclusionPolicy::OwnerAndTeam,
        exclude: projectile.hit_targets.clone(),
        slow: profile.slow.is_active().then_some(profile.slow),
    }
}

/// System: движение снарядов + контакты + дальность + таймаут
///
/// Порядок на тик:
/// 1. шаг (обрезан по остатку range)
/// 2. контакты вдоль шага (CollisionFilter, hit-set, урон, slow);
///    трупы пропускаются, impact один на hurtbox
/// 3. explosive → детонация в точке контакта (дальше полёта нет)
/// 4. range исчерпан → despawn (ракета детонирует)
/// 5. lifetime cap → despawn
#[allow(clippy::too_many_arguments)]
pub fn advance_projectiles(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    config: Res<CombatConfig>,
    mut ledger: ResMut<ExplosionLedger>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
    hurtboxes: Query<(Entity, &Transform, &Hurtbox), Without<Projectile>>,
    lookup: CandidateLookup,
    mut receivers: Query<(&mut Health, Option<&mut MovementModifiers>)>,
    mut explosions: EventWriter<ExplosionEvent>,
    mut effects: EventWriter<EffectRequest>,
    mut damage_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
) {
    let delta = time.timestep().as_secs_f32();

    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        let step = projectile.step(transform.translation, delta, config.projectile_lifetime_cap);
        let mut end = step.to;
        let mut stopped = false;

        if projectile.collider_enabled {
            let contacts = sweep_contacts(step.from, step.to, projectile.collider_radius, hurtboxes.iter());

            for (fraction, contact) in contacts {
                let candidate = lookup.describe(contact);
                if lookup.is_corpse(&candidate) {
                    continue;
                }
                let verdict = classify_contact(projectile.owner, projectile.owner_team, &candidate);
                match verdict {
                    ContactVerdict::Ignore => continue,
                    ContactVerdict::Hit { receiver } if projectile.has_hit(receiver) => continue,
                    _ => {}
                }
                // Пока снаряд внутри hurtbox'а, вход считается каждый тик
                if !projectile.register_contact(contact) {
                    continue;
                }

                let contact_point = step.from.lerp(step.to, fraction);
                effects.write(EffectRequest::Impact {
                    position: contact_point,
                    direction: projectile.direction,
                });

                if let (ProjectileMotion::Generic, ContactVerdict::Hit { receiver }) = (projectile.motion, verdict) {
                    projectile.register_hit(receiver);
                    if let Ok((mut health, movement)) = receivers.get_mut(receiver) {
                        let slow = projectile.profile.slow;
                        deal_damage(
                            &mut health,
                            movement.map(|m| m.into_inner()),
                            projectile.owner,
                            receiver,
                            projectile.profile.damage,
                            slow.is_active().then_some(slow),
                            DamageSource::Projectile,
                            contact_point,
                            &mut damage_events,
                            &mut died_events,
                        );
                    }
                    crate::logger::log(&format!(
                        "🎯 Projectile {:?} ('{}') hit {:?} at {:?}",
                        entity, projectile.profile.name, receiver, contact_point
                    ));
                }

                if projectile.explosive {
                    explosions.write(detonation(&projectile, ledger.allocate(), contact_point));
                    stopped = true;
                } else if !projectile.piercing {
                    stopped = true;
                }

                if stopped {
                    end = contact_point;
                    break;
                }
            }
        }

        transform.translation = end;

        if stopped {
            commands.entity(entity).despawn();
            continue;
        }

        if step.range_exhausted {
            if projectile.detonates_at_range() {
                explosions.write(detonation(&projectile, ledger.allocate(), end));
            }
            commands.entity(entity).despawn();
            continue;
        }

        if step.timed_out {
            crate::logger::log_warning(&format!(
                "⏱️ Projectile {:?} ('{}') hit lifetime cap after {:.2}m, despawning",
                entity, projectile.profile.name, projectile.distance_traveled
            ));
            commands.entity(entity).despawn();
        }
    }
}
