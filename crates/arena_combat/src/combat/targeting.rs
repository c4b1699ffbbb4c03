//! Поиск ближайшего противника.
//!
//! Заменяет глобальный реестр игроков: вызывающая система сама передаёт
//! кандидатов из своего Query.

use bevy::prelude::*;

use crate::components::TeamId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opponent {
    pub entity: Entity,
    pub position: Vec3,
    pub distance: f32,
}

/// Ближайший боец другой команды (без `seeker`).
///
/// При равной дистанции побеждает меньший Entity (детерминизм).
pub fn nearest_opposing(
    seeker: Entity,
    from: Vec3,
    team: Option<TeamId>,
    candidates: impl IntoIterator<Item = (Entity, Vec3, TeamId)>,
) -> Option<Opponent> {
    candidates
        .into_iter()
        .filter(|(entity, _, candidate_team)| *entity != seeker && team != Some(*candidate_team))
        .map(|(entity, position, _)| Opponent {
            entity,
            position,
            distance: from.distance(position),
        })
        .min_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.entity.cmp(&b.entity))
        })
}
