//! GrenadeTrajectory: выбор точки падения + полусинусная дуга.
//!
//! Не баллистика: высота и длительность полёта заданы табличными функциями
//! дистанции броска, чтобы дизайнеры могли их тюнить.

use std::f32::consts::PI;
use std::sync::Arc;

use bevy::prelude::*;

use crate::combat::weapon_profile::WeaponProfile;
use crate::components::{flatten_direction, TeamId};

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Высота дуги для дистанции броска `d`.
pub fn arc_height(d: f32) -> f32 {
    let d = d.max(0.0);
    if d < 2.0 {
        lerp(0.2, 0.5, d / 2.0)
    } else if d < 5.0 {
        lerp(0.5, 2.0, (d - 2.0) / 3.0)
    } else if d < 12.0 {
        2.0
    } else {
        lerp(2.0, 4.5, (d - 12.0) / 8.0)
    }
}

/// Длительность полёта (сек) для дистанции броска `d`.
pub fn flight_duration(d: f32) -> f32 {
    let d = d.max(0.0);
    if d < 3.0 {
        lerp(0.3, 0.7, d / 3.0)
    } else if d < 10.0 {
        0.7 + (d - 3.0).sqrt() * 0.12
    } else {
        1.1 + (d - 10.0).sqrt() * 0.18
    }
}

/// Позиция на дуге при нормализованном времени `t` ∈ [0, 1].
pub fn arc_position(start: Vec3, target: Vec3, arc_height: f32, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let mut position = start.lerp(target, t);
    position.y += (PI * t).sin() * arc_height;
    position
}

/// Что известно о ближайшем противнике (для AI-броска).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatInfo {
    pub entity: Entity,
    pub position: Vec3,
    pub velocity: Vec3,
    pub facing: Vec3,
}

/// Политика выбора точки падения (по роли бросающего).
#[derive(Debug, Clone, PartialEq)]
pub enum ThrowPolicy {
    AiThrown {
        owner_position: Vec3,
        nearest: Option<ThreatInfo>,
    },
    PlayerThrown {
        recorded_aim_point: Option<Vec3>,
    },
    Fallback,
}

/// Параметры упреждения (из CombatConfig).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadSettings {
    pub lead_distance: f32,
    pub velocity_threshold: f32,
}

impl Default for LeadSettings {
    fn default() -> Self {
        Self { lead_distance: 1.5, velocity_threshold: 0.1 }
    }
}

/// Допуск для "точка в пределах throwDistance"
const AIM_POINT_TOLERANCE: f32 = 1e-3;

/// Направление упреждения: по скорости, если цель движется, иначе по взгляду.
pub fn lead_direction(threat: &ThreatInfo, velocity_threshold: f32) -> Vec3 {
    if threat.velocity.length() >= velocity_threshold {
        flatten_direction(threat.velocity).unwrap_or(Vec3::ZERO)
    } else {
        flatten_direction(threat.facing).unwrap_or(Vec3::ZERO)
    }
}

/// Точка падения гранаты.
///
/// `origin` это точка броска (ствол), `direction` горизонтальное направление
/// прицела, `throw_distance` уже разрешённая дальность.
pub fn resolve_throw_target(
    origin: Vec3,
    direction: Vec3,
    throw_distance: f32,
    policy: &ThrowPolicy,
    lead: LeadSettings,
) -> Vec3 {
    let direction = flatten_direction(direction).unwrap_or(Vec3::Z);

    match policy {
        ThrowPolicy::AiThrown { owner_position, nearest: Some(threat) } => {
            let to_threat = flatten_direction(threat.position - *owner_position).unwrap_or(direction);
            let distance = owner_position.distance(threat.position);

            if distance <= throw_distance {
                threat.position + lead_direction(threat, lead.velocity_threshold) * lead.lead_distance
            } else {
                *owner_position + to_threat * throw_distance
            }
        }
        ThrowPolicy::PlayerThrown { recorded_aim_point: Some(point) }
            if origin.distance(*point) <= throw_distance + AIM_POINT_TOLERANCE =>
        {
            *point
        }
        ThrowPolicy::AiThrown { nearest: None, .. }
        | ThrowPolicy::PlayerThrown { .. }
        | ThrowPolicy::Fallback => origin + direction * throw_distance,
    }
}

/// Граната в полёте.
///
/// Инвариант: `exploded` выставляется ровно один раз.
#[derive(Component, Debug, Clone)]
pub struct GrenadeFlight {
    pub profile: Arc<WeaponProfile>,
    pub start: Vec3,
    pub target: Vec3,
    pub arc_height: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub owner: Option<Entity>,
    pub owner_team: Option<TeamId>,
    pub collider_radius: f32,
    pub exploded: bool,
}

impl GrenadeFlight {
    pub fn launch(
        profile: Arc<WeaponProfile>,
        start: Vec3,
        target: Vec3,
        owner: Option<Entity>,
        owner_team: Option<TeamId>,
    ) -> Self {
        let distance = start.distance(target);
        let collider_radius = profile.prefab.as_ref().map_or(0.1, |p| p.collider_radius);
        Self {
            profile,
            start,
            target,
            arc_height: arc_height(distance),
            duration: flight_duration(distance),
            elapsed: 0.0,
            owner,
            owner_team,
            collider_radius,
            exploded: false,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }

    /// Сдвигает время; возвращает новую позицию и признак завершения полёта.
    pub fn advance(&mut self, delta: f32) -> (Vec3, bool) {
        self.elapsed += delta;
        let t = self.progress();
        (arc_position(self.start, self.target, self.arc_height, t), t >= 1.0)
    }

    /// true: только при первом вызове.
    pub fn mark_exploded(&mut self) -> bool {
        if self.exploded {
            return false;
        }
        self.exploded = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_arc_height_breakpoints() {
        assert!((arc_height(0.0) - 0.2).abs() < EPS);
        assert!((arc_height(2.0) - 0.5).abs() < EPS);
        assert!((arc_height(5.0) - 2.0).abs() < EPS);
        assert!((arc_height(6.0) - 2.0).abs() < EPS);
        assert!((arc_height(12.0) - 2.0).abs() < EPS);
        assert!((arc_height(20.0) - 4.5).abs() < EPS);
    }

    #[test]
    fn test_flight_duration_breakpoints() {
        assert!((flight_duration(0.0) - 0.3).abs() < EPS);
        assert!((flight_duration(3.0) - 0.7).abs() < EPS);
        assert!((flight_duration(10.0) - 1.1).abs() < EPS);
        // Ветка d<10 сходится к 0.7 + √7·0.12 ≈ 1.0175, ветка d≥10 начинается с 1.1
        assert!((flight_duration(9.999) - (0.7 + 6.999_f32.sqrt() * 0.12)).abs() < EPS);
        assert!((flight_duration(14.0) - 1.46).abs() < EPS);
    }

    #[test]
    fn test_player_throw_scenario() {
        let grenade = WeaponProfile::grenade();
        let distance = grenade.throw_distance(0.5);

        assert!((distance - 6.0).abs() < EPS);
        assert!((arc_height(distance) - 2.0).abs() < EPS);
        assert!((flight_duration(distance) - 0.907_846).abs() < 1e-4);
    }

    #[test]
    fn test_arc_peaks_midway() {
        let start = Vec3::ZERO;
        let target = Vec3::new(0.0, 0.0, 6.0);

        let mid = arc_position(start, target, 2.0, 0.5);
        assert!((mid - Vec3::new(0.0, 2.0, 3.0)).length() < EPS);
        assert!((arc_position(start, target, 2.0, 1.0) - target).length() < EPS);
    }

    #[test]
    fn test_recorded_aim_point_used_when_in_range() {
        let point = Vec3::new(0.0, 0.0, 4.0);
        let policy = ThrowPolicy::PlayerThrown { recorded_aim_point: Some(point) };

        let target = resolve_throw_target(Vec3::ZERO, Vec3::X, 6.0, &policy, LeadSettings::default());
        assert_eq!(target, point);
    }

    #[test]
    fn test_recorded_aim_point_out_of_range_falls_back_to_direction() {
        let policy = ThrowPolicy::PlayerThrown { recorded_aim_point: Some(Vec3::new(0.0, 0.0, 9.0)) };

        let target = resolve_throw_target(Vec3::ZERO, Vec3::X, 6.0, &policy, LeadSettings::default());
        assert!((target - Vec3::new(6.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_ai_throw_leads_moving_target() {
        let threat = ThreatInfo {
            entity: Entity::from_raw(1),
            position: Vec3::new(0.0, 0.0, 5.0),
            velocity: Vec3::new(3.0, 0.0, 0.0),
            facing: Vec3::Z,
        };
        let policy = ThrowPolicy::AiThrown { owner_position: Vec3::ZERO, nearest: Some(threat) };

        let target = resolve_throw_target(Vec3::Y, Vec3::Z, 8.0, &policy, LeadSettings::default());
        assert!((target - Vec3::new(1.5, 0.0, 5.0)).length() < EPS);
    }

    #[test]
    fn test_ai_throw_stationary_target_leads_along_facing() {
        let threat = ThreatInfo {
            entity: Entity::from_raw(1),
            position: Vec3::new(0.0, 0.0, 5.0),
            velocity: Vec3::new(0.01, 0.0, 0.0),
            facing: Vec3::NEG_Z,
        };
        let policy = ThrowPolicy::AiThrown { owner_position: Vec3::ZERO, nearest: Some(threat) };

        let target = resolve_throw_target(Vec3::Y, Vec3::Z, 8.0, &policy, LeadSettings::default());
        assert!((target - Vec3::new(0.0, 0.0, 3.5)).length() < EPS);
    }

    #[test]
    fn test_ai_throw_out_of_range_throws_max_toward_target() {
        let threat = ThreatInfo {
            entity: Entity::from_raw(1),
            position: Vec3::new(20.0, 0.0, 0.0),
            velocity: Vec3::ZERO,
            facing: Vec3::Z,
        };
        let policy = ThrowPolicy::AiThrown { owner_position: Vec3::ZERO, nearest: Some(threat) };

        let target = resolve_throw_target(Vec3::Y, Vec3::Z, 10.0, &policy, LeadSettings::default());
        assert!((target - Vec3::new(10.0, 0.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_grenade_explodes_once() {
        let mut flight = GrenadeFlight::launch(
            Arc::new(WeaponProfile::grenade()),
            Vec3::ZERO,
            Vec3::new(6.0, 0.0, 0.0),
            None,
            None,
        );

        let (_, done) = flight.advance(0.5);
        assert!(!done);
        let (position, done) = flight.advance(1.0);
        assert!(done);
        assert!((position - Vec3::new(6.0, 0.0, 0.0)).length() < EPS);

        assert!(flight.mark_exploded());
        assert!(!flight.mark_exploded());
    }
}
