//! Explosion resolution system.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{ExternalImpulse, RigidBody};

use crate::combat::collision_filter::CandidateLookup;
use crate::combat::damage::{deal_damage, DamageSource, DamageDealt, Dead, EntityDied};
use crate::combat::effects::EffectRequest;
use crate::combat::explosion::{explosion_impulse, resolve, ExplosionEvent, ExplosionLedger};
use crate::components::{Combatant, Health, MovementModifiers};
use crate::config::CombatConfig;

/// System: ExplosionEvent → урон по радиусу + импульс физическим телам
///
/// Бойцы получают только урон (без отбрасывания), трупы (Dead) не задеваются;
/// импульс: только динамическим телам без Combatant.
#[allow(clippy::too_many_arguments)]
pub fn resolve_explosions(
    mut commands: Commands,
    config: Res<CombatConfig>,
    mut ledger: ResMut<ExplosionLedger>,
    mut explosions: EventReader<ExplosionEvent>,
    lookup: CandidateLookup,
    targets: Query<(Entity, &Transform), (With<Health>, Without<Dead>)>,
    mut receivers: Query<(&mut Health, Option<&mut MovementModifiers>)>,
    mut bodies: Query<(Entity, &Transform, &RigidBody, Option<&mut ExternalImpulse>), Without<Combatant>>,
    mut effects: EventWriter<EffectRequest>,
    mut damage_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
) {
    for event in explosions.read() {
        if !ledger.mark_resolved(event.id) {
            crate::logger::log_warning(&format!("Explosion #{} already resolved, skipping", event.id));
            continue;
        }

        effects.write(EffectRequest::Detonation {
            position: event.origin,
            radius: event.radius,
        });

        let candidates = targets
            .iter()
            .map(|(entity, transform)| (lookup.describe(entity), transform.translation));
        let hits = resolve(event, config.explosion_hot_zone, candidates);

        crate::logger::log(&format!(
            "💥 Explosion #{} at {:?} (r={}, dmg={}): {} targets",
            event.id,
            event.origin,
            event.radius,
            event.base_damage,
            hits.len()
        ));

        for hit in &hits {
            let Ok((mut health, movement)) = receivers.get_mut(hit.receiver) else {
                continue;
            };
            deal_damage(
                &mut health,
                movement.map(|m| m.into_inner()),
                event.owner,
                hit.receiver,
                hit.damage,
                event.slow,
                DamageSource::Explosion,
                event.origin,
                &mut damage_events,
                &mut died_events,
            );
        }

        for (entity, transform, body, impulse) in bodies.iter_mut() {
            if !matches!(body, RigidBody::Dynamic) {
                continue;
            }
            let Some(push) = explosion_impulse(
                event.origin,
                transform.translation,
                event.radius,
                event.base_damage,
                config.explosion_impulse_per_damage,
                config.explosion_upwards_modifier,
            ) else {
                continue;
            };

            match impulse {
                Some(mut existing) => existing.impulse += push,
                None => {
                    commands.entity(entity).insert(ExternalImpulse {
                        impulse: push,
                        ..Default::default()
                    });
                }
            }
        }
    }
}
