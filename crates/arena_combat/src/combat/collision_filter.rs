//! CollisionFilter: единое правило "кого можно ударить".
//!
//! Используется снарядами, ракетами, гранатами и взрывами.
//! Порядок правил:
//! 1. кандидат = владелец или потомок владельца (ChildOf) → отказ
//! 2. команда кандидата = команда атакующего → отказ
//! 3. у кандидата (или его предка) есть Health → принять

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::combat::damage::Dead;
use crate::components::{Combatant, Health, TeamId};

/// Глубина обхода иерархии (защита от циклов в кривых сценах)
const MAX_HIERARCHY_DEPTH: usize = 32;

/// Кандидат на попадание, уже разрешённый относительно иерархии.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub entity: Entity,
    /// entity + все предки (ближайший первым)
    pub lineage: Vec<Entity>,
    /// Команда ближайшего Combatant в lineage
    pub team: Option<TeamId>,
    /// Ближайшая entity с damage capability
    pub receiver: Option<Entity>,
}

impl Candidate {
    /// Кандидат без иерархии (тесты, простые сцены).
    pub fn standalone(entity: Entity, team: Option<TeamId>, damageable: bool) -> Self {
        Self {
            entity,
            lineage: vec![entity],
            team,
            receiver: damageable.then_some(entity),
        }
    }

    pub fn is_owned_by(&self, owner: Entity) -> bool {
        self.lineage.contains(&owner)
    }
}

/// Результат контакта.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactVerdict {
    /// Свой / союзник: пролетаем насквозь
    Ignore,
    /// Препятствие без Health: останавливает, но урона нет
    Blocked,
    /// Валидная цель
    Hit { receiver: Entity },
}

fn is_friendly(owner: Option<Entity>, owner_team: Option<TeamId>, candidate: &Candidate) -> bool {
    if let Some(owner) = owner {
        if candidate.is_owned_by(owner) {
            return true;
        }
    }
    matches!((owner_team, candidate.team), (Some(a), Some(b)) if a == b)
}

/// true только если все три правила пропускают кандидата.
pub fn is_valid_hit(owner: Option<Entity>, owner_team: Option<TeamId>, candidate: &Candidate) -> bool {
    !is_friendly(owner, owner_team, candidate) && candidate.receiver.is_some()
}

pub fn classify_contact(
    owner: Option<Entity>,
    owner_team: Option<TeamId>,
    candidate: &Candidate,
) -> ContactVerdict {
    if is_friendly(owner, owner_team, candidate) {
        return ContactVerdict::Ignore;
    }
    match candidate.receiver {
        Some(receiver) => ContactVerdict::Hit { receiver },
        None => ContactVerdict::Blocked,
    }
}

/// SystemParam: строит `Candidate` по ECS-иерархии.
#[derive(SystemParam)]
pub struct CandidateLookup<'w, 's> {
    parents: Query<'w, 's, &'static ChildOf>,
    combatants: Query<'w, 's, &'static Combatant>,
    receivers: Query<'w, 's, (), With<Health>>,
    dead: Query<'w, 's, (), With<Dead>>,
}

impl CandidateLookup<'_, '_> {
    pub fn describe(&self, entity: Entity) -> Candidate {
        let mut lineage = vec![entity];
        let mut current = entity;
        while lineage.len() < MAX_HIERARCHY_DEPTH {
            let Ok(child_of) = self.parents.get(current) else {
                break;
            };
            current = child_of.parent();
            lineage.push(current);
        }

        let team = lineage
            .iter()
            .find_map(|e| self.combatants.get(*e).ok())
            .map(|c| c.team);
        let receiver = lineage.iter().copied().find(|e| self.receivers.contains(*e));

        Candidate { entity, lineage, team, receiver }
    }

    /// Получатель урона уже помечен Dead: труп не цель и не препятствие.
    pub fn is_corpse(&self, candidate: &Candidate) -> bool {
        candidate.receiver.is_some_and(|receiver| self.dead.contains(receiver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities() -> (Entity, Entity, Entity) {
        (Entity::from_raw(1), Entity::from_raw(2), Entity::from_raw(3))
    }

    #[test]
    fn test_owner_rejected() {
        let (owner, _, _) = entities();
        let candidate = Candidate::standalone(owner, Some(TeamId(0)), true);

        assert!(!is_valid_hit(Some(owner), Some(TeamId(0)), &candidate));
        assert_eq!(classify_contact(Some(owner), None, &candidate), ContactVerdict::Ignore);
    }

    #[test]
    fn test_owner_descendant_rejected() {
        let (owner, arm, _) = entities();
        let candidate = Candidate {
            entity: arm,
            lineage: vec![arm, owner],
            team: None,
            receiver: Some(owner),
        };

        assert!(!is_valid_hit(Some(owner), None, &candidate));
    }

    #[test]
    fn test_same_team_rejected() {
        let (owner, ally, _) = entities();
        let candidate = Candidate::standalone(ally, Some(TeamId(1)), true);

        assert!(!is_valid_hit(Some(owner), Some(TeamId(1)), &candidate));
    }

    #[test]
    fn test_enemy_accepted() {
        let (owner, enemy, _) = entities();
        let candidate = Candidate::standalone(enemy, Some(TeamId(2)), true);

        assert!(is_valid_hit(Some(owner), Some(TeamId(1)), &candidate));
        assert_eq!(
            classify_contact(Some(owner), Some(TeamId(1)), &candidate),
            ContactVerdict::Hit { receiver: enemy }
        );
    }

    #[test]
    fn test_wall_blocks_without_damage() {
        let (owner, _, wall) = entities();
        let candidate = Candidate::standalone(wall, None, false);

        assert!(!is_valid_hit(Some(owner), Some(TeamId(1)), &candidate));
        assert_eq!(
            classify_contact(Some(owner), Some(TeamId(1)), &candidate),
            ContactVerdict::Blocked
        );
    }

    #[test]
    fn test_teamless_attacker_hits_teamless_target() {
        let (_, _, crate_box) = entities();
        let candidate = Candidate::standalone(crate_box, None, true);
        // Despawned owner + неизвестная команда: проверки 1-2 пропускаются
        assert!(is_valid_hit(None, None, &candidate));
    }

    #[test]
    fn test_lookup_resolves_hierarchy() {
        let mut world = World::new();
        let body = world.spawn((Combatant::new(3), Transform::default())).id();
        let head = world.spawn(ChildOf(body)).id();

        let mut state = bevy::ecs::system::SystemState::<CandidateLookup>::new(&mut world);
        let lookup = state.get(&world);
        let candidate = lookup.describe(head);

        assert_eq!(candidate.lineage, vec![head, body]);
        assert_eq!(candidate.team, Some(TeamId(3)));
        // Health пришёл через required components Combatant
        assert_eq!(candidate.receiver, Some(body));
    }
}
