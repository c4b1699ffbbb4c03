//! ProjectileSimulator: прямолинейные снаряды (пули, дробь, ракеты).
//!
//! Позиция двигается в fixed-step; контакты ищутся swept-тестом
//! (отрезок шага против сфер Hurtbox), поэтому быстрые снаряды не
//! проскакивают цели между тиками.

use std::sync::Arc;

use bevy::prelude::*;

use crate::combat::weapon_profile::{FireCategory, WeaponProfile};
use crate::components::TeamId;

/// Как снаряд реагирует на контакт.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileMotion {
    /// Прямой урон (+ взрыв, если explosive)
    Generic,
    /// Только детонация: на контакте и на дальности range
    Rocket,
}

#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub profile: Arc<WeaponProfile>,
    pub motion: ProjectileMotion,
    pub spawn_position: Vec3,
    /// Нормализованное направление
    pub direction: Vec3,
    pub speed: f32,
    pub max_range: f32,
    pub distance_traveled: f32,
    pub lifetime: f32,
    /// Слабая ссылка: владелец может быть уже despawn'ут
    pub owner: Option<Entity>,
    /// Копия команды на момент выстрела
    pub owner_team: Option<TeamId>,
    pub hit_targets: Vec<Entity>,
    /// Hurtbox'ы, с которыми уже был контакт (цели и препятствия)
    pub contacted: Vec<Entity>,
    pub piercing: bool,
    pub explosive: bool,
    pub collider_radius: f32,
    /// Дробь стартует с выключенным коллайдером
    pub collider_enabled: bool,
}

impl Projectile {
    pub fn new(
        profile: Arc<WeaponProfile>,
        motion: ProjectileMotion,
        spawn_position: Vec3,
        direction: Vec3,
        owner: Option<Entity>,
        owner_team: Option<TeamId>,
    ) -> Self {
        let collider_radius = profile.prefab.as_ref().map_or(0.1, |p| p.collider_radius);
        let (piercing, explosive) = match motion {
            ProjectileMotion::Rocket => (false, true),
            ProjectileMotion::Generic => (profile.piercing, profile.is_explosive()),
        };

        Self {
            speed: profile.projectile_speed,
            max_range: profile.range,
            profile,
            motion,
            spawn_position,
            direction: direction.normalize_or_zero(),
            distance_traveled: 0.0,
            lifetime: 0.0,
            owner,
            owner_team,
            hit_targets: Vec::new(),
            contacted: Vec::new(),
            piercing,
            explosive,
            collider_radius,
            collider_enabled: true,
        }
    }

    pub fn with_collider_disabled(mut self) -> Self {
        self.collider_enabled = false;
        self
    }

    pub fn detonates_at_range(&self) -> bool {
        self.motion == ProjectileMotion::Rocket || self.profile.category == FireCategory::Rocket
    }

    pub fn has_hit(&self, target: Entity) -> bool {
        self.hit_targets.contains(&target)
    }

    /// Запоминает цель; false: уже была поражена.
    pub fn register_hit(&mut self, target: Entity) -> bool {
        if self.has_hit(target) {
            return false;
        }
        self.hit_targets.push(target);
        true
    }

    /// Первый контакт с hurtbox'ом; false: снаряд уже внутри него.
    pub fn register_contact(&mut self, hurtbox: Entity) -> bool {
        if self.contacted.contains(&hurtbox) {
            return false;
        }
        self.contacted.push(hurtbox);
        true
    }

    /// Один шаг симуляции.
    ///
    /// Отрезок шага обрезается по остатку дальности, так что контакты за
    /// пределами range не рассматриваются.
    pub fn step(&mut self, position: Vec3, delta: f32, lifetime_cap: f32) -> ProjectileStep {
        let remaining = (self.max_range - self.distance_traveled).max(0.0);
        let travel = (self.speed * delta).min(remaining);
        let to = position + self.direction * travel;

        self.distance_traveled += travel;
        self.lifetime += delta;

        ProjectileStep {
            from: position,
            to,
            range_exhausted: self.distance_traveled >= self.max_range,
            timed_out: self.lifetime >= lifetime_cap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileStep {
    pub from: Vec3,
    pub to: Vec3,
    pub range_exhausted: bool,
    pub timed_out: bool,
}

/// Доля отрезка [from, to], на которой сфера радиуса `radius` впервые касается
/// точки `center`. `None`: контакта нет.
pub fn segment_sphere_entry(from: Vec3, to: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = from - center;
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        // Уже внутри
        return Some(0.0);
    }

    let segment = to - from;
    let a = segment.length_squared();
    if a <= f32::EPSILON {
        return None;
    }

    let b = offset.dot(segment);
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-b - discriminant.sqrt()) / a;
    (0.0..=1.0).contains(&t).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pistol_projectile(direction: Vec3) -> Projectile {
        Projectile::new(
            Arc::new(WeaponProfile::pistol()),
            ProjectileMotion::Generic,
            Vec3::ZERO,
            direction,
            None,
            None,
        )
    }

    #[test]
    fn test_distance_monotonic_and_capped_at_range() {
        let mut projectile = pistol_projectile(Vec3::X);
        let mut position = Vec3::ZERO;
        let mut last = 0.0;

        for _ in 0..40 {
            let step = projectile.step(position, 1.0 / 60.0, 5.0);
            position = step.to;
            assert!(projectile.distance_traveled >= last);
            last = projectile.distance_traveled;
            if step.range_exhausted {
                break;
            }
        }

        assert!((projectile.distance_traveled - 10.0).abs() < 1e-5);
        assert!((position.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_exact_range_boundary_exhausts() {
        let mut projectile = pistol_projectile(Vec3::X);
        // speed 20 × 0.5s = 10 = range
        let step = projectile.step(Vec3::ZERO, 0.5, 5.0);
        assert!(step.range_exhausted);
    }

    #[test]
    fn test_lifetime_cap() {
        let mut profile = WeaponProfile::pistol();
        profile.range = 1_000.0;
        profile.projectile_speed = 1.0;
        let mut projectile = Projectile::new(
            Arc::new(profile),
            ProjectileMotion::Generic,
            Vec3::ZERO,
            Vec3::X,
            None,
            None,
        );

        let step = projectile.step(Vec3::ZERO, 5.0, 5.0);
        assert!(step.timed_out);
        assert!(!step.range_exhausted);
    }

    #[test]
    fn test_register_hit_once() {
        let mut projectile = pistol_projectile(Vec3::X);
        let target = Entity::from_raw(4);

        assert!(projectile.register_hit(target));
        assert!(!projectile.register_hit(target));
        assert_eq!(projectile.hit_targets.len(), 1);
    }

    #[test]
    fn test_register_contact_once() {
        let mut projectile = pistol_projectile(Vec3::X);
        let wall = Entity::from_raw(9);

        assert!(projectile.register_contact(wall));
        assert!(!projectile.register_contact(wall));
        assert!(projectile.hit_targets.is_empty(), "Контакт с препятствием не попадание");
    }

    #[test]
    fn test_rocket_motion_forces_explosive_non_piercing() {
        let mut profile = WeaponProfile::rocket_launcher();
        profile.piercing = true;
        let rocket = Projectile::new(
            Arc::new(profile),
            ProjectileMotion::Rocket,
            Vec3::ZERO,
            Vec3::Z,
            None,
            None,
        );

        assert!(rocket.explosive);
        assert!(!rocket.piercing);
        assert!(rocket.detonates_at_range());
    }

    #[test]
    fn test_segment_sphere_entry() {
        let hit = segment_sphere_entry(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.0);
        assert!((hit.unwrap() - 0.4).abs() < 1e-5);

        let miss = segment_sphere_entry(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(5.0, 3.0, 0.0), 1.0);
        assert!(miss.is_none());

        let short = segment_sphere_entry(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.0);
        assert!(short.is_none());

        let inside = segment_sphere_entry(Vec3::ZERO, Vec3::X, Vec3::ZERO, 1.0);
        assert_eq!(inside, Some(0.0));
    }
}
