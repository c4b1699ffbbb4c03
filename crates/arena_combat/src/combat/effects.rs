//! Fire-and-forget запросы для презентационного слоя.
//!
//! Симуляция только пишет события; VFX/SFX/превью прицела: забота хоста.

use bevy::prelude::*;

use crate::combat::weapon_profile::FireCategory;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum EffectRequest {
    /// Вспышка у ствола (на каждый выстрел, включая подвыстрелы очереди)
    MuzzleFlash {
        shooter: Entity,
        position: Vec3,
        direction: Vec3,
        category: FireCategory,
    },
    /// Попадание снаряда (цель или препятствие)
    Impact { position: Vec3, direction: Vec3 },
    Detonation { position: Vec3, radius: f32 },
}

/// Форма превью прицела.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AimPreviewShape {
    /// Линия до `range`
    Line { range: f32 },
    /// Конус дробовика
    Cone { range: f32, spread_angle: f32 },
    /// Дуга броска до точки приземления
    Arc { target: Vec3 },
}

/// Событие: превью прицела (каждый тик в Aiming + одно `active: false` при выходе)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AimPreview {
    pub combatant: Entity,
    pub active: bool,
    pub origin: Vec3,
    pub direction: Vec3,
    pub shape: Option<AimPreviewShape>,
}
