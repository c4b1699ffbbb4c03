//! Grenade systems (fixed step).

use bevy::prelude::*;

use crate::combat::collision_filter::{classify_contact, CandidateLookup, ContactVerdict};
use crate::combat::explosion::{ExclusionPolicy, ExplosionEvent, ExplosionLedger};
use crate::combat::grenade::GrenadeFlight;
use crate::combat::systems::projectiles::sweep_contacts;
use crate::components::Hurtbox;

/// System: полёт гранат по дуге + детонация
///
/// Детонация ровно одна: по окончании полёта или на первом контакте,
/// который не отфильтрован как свой/союзный.
pub fn advance_grenades(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut ledger: ResMut<ExplosionLedger>,
    mut grenades: Query<(Entity, &mut GrenadeFlight, &mut Transform)>,
    hurtboxes: Query<(Entity, &Transform, &Hurtbox), Without<GrenadeFlight>>,
    lookup: CandidateLookup,
    mut explosions: EventWriter<ExplosionEvent>,
) {
    let delta = time.timestep().as_secs_f32();

    for (entity, mut flight, mut transform) in grenades.iter_mut() {
        if flight.exploded {
            continue;
        }

        let from = transform.translation;
        let (to, landed) = flight.advance(delta);

        let contact = sweep_contacts(from, to, flight.collider_radius, hurtboxes.iter())
            .into_iter()
            .find(|(_, hit)| {
                let candidate = lookup.describe(*hit);
                !lookup.is_corpse(&candidate)
                    && classify_contact(flight.owner, flight.owner_team, &candidate) != ContactVerdict::Ignore
            });

        let detonate_at = match contact {
            Some((fraction, hit)) => {
                crate::logger::log(&format!("💣 Grenade {:?} struck {:?} mid-flight", entity, hit));
                Some(from.lerp(to, fraction))
            }
            None if landed => Some(to),
            None => None,
        };

        let Some(origin) = detonate_at else {
            transform.translation = to;
            continue;
        };

        transform.translation = origin;
        if !flight.mark_exploded() {
            continue;
        }

        let profile = &flight.profile;
        explosions.write(ExplosionEvent {
            id: ledger.allocate(),
            origin,
            radius: profile.grenade.explosion_radius,
            base_damage: profile.damage,
            owner: flight.owner,
            owner_team: flight.owner_team,
            policy: ExclusionPolicy::OwnerTeamOnly,
            exclude: Vec::new(),
            slow: profile.slow.is_active().then_some(profile.slow),
        });
        commands.entity(entity).despawn();
    }
}
