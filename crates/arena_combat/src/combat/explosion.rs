//! ExplosiveResolver: радиальный урон + толчок физических тел.
//!
//! Falloff (R = radius, hot = hot_zone · R):
//! - d ≤ hot        → 1.0
//! - hot < d < R    → 1 − n², n = (d − hot) / (R − hot)
//! - d ≥ R          → 0.0

use bevy::prelude::*;

use crate::combat::collision_filter::{is_valid_hit, Candidate};
use crate::combat::weapon_profile::SlowSettings;
use crate::components::TeamId;

/// Кого взрыв не трогает.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionPolicy {
    /// Снаряды/ракеты: владелец, его потомки и его команда
    OwnerAndTeam,
    /// Гранаты: только команда владельца (жертва свою команду не проверяет)
    OwnerTeamOnly,
}

/// Событие: детонация. Разрешается ровно один раз (id монотонный).
#[derive(Event, Debug, Clone)]
pub struct ExplosionEvent {
    pub id: u64,
    pub origin: Vec3,
    pub radius: f32,
    pub base_damage: f32,
    pub owner: Option<Entity>,
    pub owner_team: Option<TeamId>,
    pub policy: ExclusionPolicy,
    /// Уже получили прямой урон от того же снаряда
    pub exclude: Vec<Entity>,
    pub slow: Option<SlowSettings>,
}

/// Выдаёт id детонаций и помнит последний разрешённый.
#[derive(Resource, Debug, Default)]
pub struct ExplosionLedger {
    next_id: u64,
    last_resolved: Option<u64>,
}

impl ExplosionLedger {
    pub fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// false: эта детонация уже разрешена.
    pub fn mark_resolved(&mut self, id: u64) -> bool {
        if matches!(self.last_resolved, Some(last) if id <= last) {
            return false;
        }
        self.last_resolved = Some(id);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosionHit {
    pub receiver: Entity,
    pub distance: f32,
    pub damage_percent: f32,
    pub damage: f32,
}

/// Доля урона на дистанции `distance`. Монотонно не возрастает, в [0, 1].
pub fn damage_percent(distance: f32, radius: f32, hot_zone: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    let hot = hot_zone * radius;
    if distance <= hot {
        return 1.0;
    }
    let n = (distance - hot) / (radius - hot);
    (1.0 - n * n).clamp(0.0, 1.0)
}

fn is_excluded(event: &ExplosionEvent, candidate: &Candidate) -> bool {
    match event.policy {
        ExclusionPolicy::OwnerAndTeam => !is_valid_hit(event.owner, event.owner_team, candidate),
        ExclusionPolicy::OwnerTeamOnly => {
            let same_team = matches!(
                (event.owner_team, candidate.team),
                (Some(a), Some(b)) if a == b
            );
            same_team || candidate.receiver.is_none()
        }
    }
}

/// Чистая часть резолвера: кандидаты (+ позиции корней) → список урона.
///
/// Каждый receiver получает урон не более одного раза; нулевой урон отбрасывается.
/// Результат отсортирован по дистанции (при равенстве: по entity).
pub fn resolve(
    event: &ExplosionEvent,
    hot_zone: f32,
    candidates: impl IntoIterator<Item = (Candidate, Vec3)>,
) -> Vec<ExplosionHit> {
    let mut hits: Vec<ExplosionHit> = Vec::new();

    for (candidate, position) in candidates {
        if is_excluded(event, &candidate) {
            continue;
        }
        let Some(receiver) = candidate.receiver else {
            continue;
        };
        if event.exclude.contains(&receiver) || hits.iter().any(|h| h.receiver == receiver) {
            continue;
        }

        let distance = event.origin.distance(position);
        if distance > event.radius {
            continue;
        }

        let percent = damage_percent(distance, event.radius, hot_zone);
        let damage = event.base_damage * percent;
        if damage <= 0.0 {
            continue;
        }

        hits.push(ExplosionHit {
            receiver,
            distance,
            damage_percent: percent,
            damage,
        });
    }

    hits.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.receiver.cmp(&b.receiver))
    });
    hits
}

/// Импульс для некомбатантного физического тела.
///
/// Линейный спад к краю радиуса; центр смещён вниз на `upwards_modifier`
/// (тела подбрасывает вверх).
pub fn explosion_impulse(
    origin: Vec3,
    body: Vec3,
    radius: f32,
    base_damage: f32,
    impulse_per_damage: f32,
    upwards_modifier: f32,
) -> Option<Vec3> {
    let distance = origin.distance(body);
    if radius <= 0.0 || distance > radius {
        return None;
    }

    let pivot = origin - Vec3::Y * upwards_modifier;
    let direction = (body - pivot).try_normalize().unwrap_or(Vec3::Y);
    let falloff = 1.0 - distance / radius;
    let impulse = direction * base_damage * impulse_per_damage * falloff;

    (impulse.length_squared() > 0.0).then_some(impulse)
}
