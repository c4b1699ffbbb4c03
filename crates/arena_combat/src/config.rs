//! Настройки боевой симуляции (JSON, все поля опциональны).

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CombatError;

/// Глобальные тюнинг-параметры боя.
///
/// JSON может переопределить любое подмножество полей.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Частота fixed-step прохода (projectiles, grenades, scheduler).
    pub fixed_hz: f64,

    /// Порог magnitude стика, выше которого начинается прицеливание.
    pub aim_sensitivity: f32,
    /// Порог magnitude стика, ниже которого считается отпускание (выстрел).
    pub min_shoot_threshold: f32,

    /// Жёсткий лимит жизни снаряда (сек), независимо от range.
    pub projectile_lifetime_cap: f32,

    /// Смещение точки спавна вдоль направления выстрела.
    pub single_spawn_offset: f32,
    pub pellet_spawn_offset: f32,
    pub ai_pellet_spawn_offset: f32,

    /// Задержка включения коллайдера дробин (чтобы не цеплять стрелка).
    pub pellet_arming_delay: f32,
    pub ai_pellet_arming_delay: f32,

    /// Упреждение AI-гранаты вдоль движения цели.
    pub grenade_lead_distance: f32,
    /// Скорость ниже этой считается "стоит" (упреждение по facing).
    pub lead_velocity_threshold: f32,

    /// Доля радиуса взрыва с полным уроном.
    pub explosion_hot_zone: f32,
    pub explosion_impulse_per_damage: f32,
    pub explosion_upwards_modifier: f32,

    pub ai_detection_range: f32,
    pub ai_reload_interval: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            fixed_hz: 60.0,
            aim_sensitivity: 0.1,
            min_shoot_threshold: 0.05,
            projectile_lifetime_cap: 5.0,
            single_spawn_offset: 0.3,
            pellet_spawn_offset: 0.5,
            ai_pellet_spawn_offset: 1.0,
            pellet_arming_delay: 0.1,
            ai_pellet_arming_delay: 0.2,
            grenade_lead_distance: 1.5,
            lead_velocity_threshold: 0.1,
            explosion_hot_zone: 0.3,
            explosion_impulse_per_damage: 20.0,
            explosion_upwards_modifier: 1.0,
            ai_detection_range: 15.0,
            ai_reload_interval: 2.0,
        }
    }
}

impl CombatConfig {
    pub fn from_json_str(json: &str) -> Result<Self, CombatError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CombatError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Пороги стика должны образовывать гистерезис: release < aim.
    pub fn validate(&self) -> Result<(), CombatError> {
        if self.fixed_hz <= 0.0 {
            return Err(CombatError::configuration("fixed_hz must be positive"));
        }
        if self.min_shoot_threshold > self.aim_sensitivity {
            return Err(CombatError::configuration(format!(
                "min_shoot_threshold ({}) must not exceed aim_sensitivity ({})",
                self.min_shoot_threshold, self.aim_sensitivity
            )));
        }
        if !(0.0..1.0).contains(&self.explosion_hot_zone) {
            return Err(CombatError::configuration("explosion_hot_zone must be in [0, 1)"));
        }
        Ok(())
    }

    pub fn fixed_timestep(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.fixed_hz)
    }
}
