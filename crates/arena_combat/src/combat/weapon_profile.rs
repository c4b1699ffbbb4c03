//! WeaponProfile: неизменяемое описание оружия.
//!
//! Один профиль разделяется (`Arc`) между каталогом, экипировкой бойцов и
//! всеми выпущенными снарядами. Никто не мутирует его после загрузки.

use serde::{Deserialize, Serialize};

use crate::error::CombatError;

/// Категория огня: определяет стратегию FireModeDispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireCategory {
    #[default]
    Single,
    /// Automatic: очередь из burst_size выстрелов
    Burst,
    Shotgun,
    Rocket,
    Grenade,
}

/// Motion behavior, который несёт prefab снаряда.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionBehavior {
    Projectile,
    Rocket,
    Grenade,
}

/// Описание prefab'а снаряда: какие motion behaviors на нём есть + коллайдер.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefabSpec {
    pub behaviors: Vec<MotionBehavior>,
    pub collider_radius: f32,
}

impl Default for PrefabSpec {
    fn default() -> Self {
        Self {
            behaviors: vec![MotionBehavior::Projectile],
            collider_radius: 0.1,
        }
    }
}

impl PrefabSpec {
    pub fn with_behaviors(behaviors: &[MotionBehavior]) -> Self {
        Self {
            behaviors: behaviors.to_vec(),
            ..Default::default()
        }
    }

    pub fn has(&self, behavior: MotionBehavior) -> bool {
        self.behaviors.contains(&behavior)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotgunSettings {
    pub pellet_count: u32,
    /// Полуугол разброса (градусы) вокруг вертикальной оси
    pub spread_angle: f32,
}

impl Default for ShotgunSettings {
    fn default() -> Self {
        Self { pellet_count: 5, spread_angle: 15.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrenadeSettings {
    pub min_throw_distance: f32,
    pub max_throw_distance: f32,
    pub explosion_radius: f32,
}

impl Default for GrenadeSettings {
    fn default() -> Self {
        Self {
            min_throw_distance: 2.0,
            max_throw_distance: 10.0,
            explosion_radius: 3.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplosiveSettings {
    pub explosion_radius: f32,
}

impl Default for ExplosiveSettings {
    fn default() -> Self {
        Self { explosion_radius: 3.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomaticSettings {
    /// Интервал между выстрелами очереди (сек)
    pub fire_rate: f32,
    pub burst_size: u32,
}

impl Default for AutomaticSettings {
    fn default() -> Self {
        Self { fire_rate: 0.1, burst_size: 3 }
    }
}

/// Замедление при попадании (magnitude 0 = нет эффекта).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlowSettings {
    pub magnitude: f32,
    pub duration: f32,
}

impl Default for SlowSettings {
    fn default() -> Self {
        Self { magnitude: 0.0, duration: 3.0 }
    }
}

impl SlowSettings {
    pub fn is_active(&self) -> bool {
        self.magnitude > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponProfile {
    pub name: String,
    pub category: FireCategory,
    pub damage: f32,
    pub range: f32,
    pub shooting_cooldown: f32,
    pub projectile_speed: f32,
    pub piercing: bool,
    /// Взрыв при контакте (для Rocket всегда true)
    pub explosive: bool,
    pub slow: SlowSettings,
    pub shotgun: ShotgunSettings,
    pub grenade: GrenadeSettings,
    pub explosion: ExplosiveSettings,
    pub automatic: AutomaticSettings,
    pub prefab: Option<PrefabSpec>,
}

impl Default for WeaponProfile {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            category: FireCategory::Single,
            damage: 10.0,
            range: 10.0,
            shooting_cooldown: 0.5,
            projectile_speed: 20.0,
            piercing: false,
            explosive: false,
            slow: SlowSettings::default(),
            shotgun: ShotgunSettings::default(),
            grenade: GrenadeSettings::default(),
            explosion: ExplosiveSettings::default(),
            automatic: AutomaticSettings::default(),
            prefab: Some(PrefabSpec::default()),
        }
    }
}

impl WeaponProfile {
    /// Пистолет: одиночный выстрел
    pub fn pistol() -> Self {
        Self {
            name: "pistol".to_string(),
            ..Default::default()
        }
    }

    /// Автомат: очередь 3 × 0.2с
    pub fn rifle() -> Self {
        Self {
            name: "rifle".to_string(),
            category: FireCategory::Burst,
            damage: 8.0,
            range: 15.0,
            shooting_cooldown: 0.8,
            projectile_speed: 30.0,
            automatic: AutomaticSettings { fire_rate: 0.2, burst_size: 3 },
            ..Default::default()
        }
    }

    pub fn shotgun() -> Self {
        Self {
            name: "shotgun".to_string(),
            category: FireCategory::Shotgun,
            damage: 6.0,
            range: 8.0,
            shooting_cooldown: 1.0,
            shotgun: ShotgunSettings { pellet_count: 5, spread_angle: 15.0 },
            ..Default::default()
        }
    }

    pub fn rocket_launcher() -> Self {
        Self {
            name: "rocket_launcher".to_string(),
            category: FireCategory::Rocket,
            damage: 50.0,
            range: 20.0,
            shooting_cooldown: 2.0,
            projectile_speed: 15.0,
            explosive: true,
            explosion: ExplosiveSettings { explosion_radius: 4.0 },
            prefab: Some(PrefabSpec::with_behaviors(&[MotionBehavior::Rocket])),
            ..Default::default()
        }
    }

    pub fn grenade() -> Self {
        Self {
            name: "grenade".to_string(),
            category: FireCategory::Grenade,
            damage: 40.0,
            range: 10.0,
            shooting_cooldown: 1.5,
            grenade: GrenadeSettings {
                min_throw_distance: 2.0,
                max_throw_distance: 10.0,
                explosion_radius: 3.0,
            },
            prefab: Some(PrefabSpec::with_behaviors(&[MotionBehavior::Grenade])),
            ..Default::default()
        }
    }

    /// Дальность броска: lerp(min, max, clamp01(magnitude)).
    pub fn throw_distance(&self, magnitude: f32) -> f32 {
        let t = magnitude.clamp(0.0, 1.0);
        let GrenadeSettings { min_throw_distance: min, max_throw_distance: max, .. } = self.grenade;
        min + (max - min) * t
    }

    /// Обратная к `throw_distance`: какой magnitude даёт бросок на `distance`.
    pub fn throw_magnitude_for(&self, distance: f32) -> f32 {
        let GrenadeSettings { min_throw_distance: min, max_throw_distance: max, .. } = self.grenade;
        if max - min <= f32::EPSILON {
            return 1.0;
        }
        ((distance - min) / (max - min)).clamp(0.0, 1.0)
    }

    /// Rocket взрывается всегда; остальные: по флагу.
    pub fn is_explosive(&self) -> bool {
        self.explosive || self.category == FireCategory::Rocket
    }

    /// Дистанция, на которой AI готов открыть огонь.
    pub fn engagement_range(&self) -> f32 {
        match self.category {
            FireCategory::Grenade => self.grenade.max_throw_distance,
            _ => self.range,
        }
    }

    pub fn validate(&self) -> Result<(), CombatError> {
        let bad = |what: &str| {
            Err(CombatError::configuration(format!("weapon '{}': {}", self.name, what)))
        };

        if self.damage < 0.0 {
            return bad("damage must be non-negative");
        }
        if self.range <= 0.0 {
            return bad("range must be positive");
        }
        if self.shooting_cooldown < 0.0 {
            return bad("shooting_cooldown must be non-negative");
        }
        if self.category != FireCategory::Grenade && self.projectile_speed <= 0.0 {
            return bad("projectile_speed must be positive");
        }
        if self.category == FireCategory::Burst {
            if self.automatic.burst_size == 0 {
                return bad("burst_size must be at least 1");
            }
            if self.automatic.fire_rate < 0.0 {
                return bad("fire_rate must be non-negative");
            }
        }
        if self.category == FireCategory::Shotgun && self.shotgun.pellet_count == 0 {
            return bad("pellet_count must be at least 1");
        }
        if self.category == FireCategory::Grenade {
            let g = self.grenade;
            if g.min_throw_distance < 0.0 || g.max_throw_distance < g.min_throw_distance {
                return bad("throw distances must satisfy 0 <= min <= max");
            }
            if g.explosion_radius <= 0.0 {
                return bad("grenade explosion_radius must be positive");
            }
        }
        if self.is_explosive() && self.explosion.explosion_radius <= 0.0 {
            return bad("explosion_radius must be positive");
        }
        Ok(())
    }
}
