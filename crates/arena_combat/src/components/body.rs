//! Геометрия бойца: куда смотрит, как движется, чем принимает попадания.

use bevy::prelude::*;

/// Направление взгляда (горизонтальная плоскость, нормализовано).
///
/// Пишется locomotion-слоем; AimingController перехватывает его при стрельбе.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Facing(pub Vec3);

impl Default for Facing {
    fn default() -> Self {
        Self(Vec3::Z)
    }
}

/// Текущая скорость (пишется locomotion-слоем, читается упреждением гранат).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Velocity(pub Vec3);

/// Сфера попаданий.
///
/// Может висеть на дочерних entity (части тела): владелец находится по ChildOf.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Hurtbox {
    pub radius: f32,
    /// Центр сферы относительно Transform
    pub center_offset: Vec3,
}

impl Default for Hurtbox {
    fn default() -> Self {
        Self {
            radius: 0.5,
            center_offset: Vec3::Y,
        }
    }
}

impl Hurtbox {
    pub fn sphere(radius: f32) -> Self {
        Self {
            radius,
            center_offset: Vec3::ZERO,
        }
    }

    pub fn center(&self, transform: &Transform) -> Vec3 {
        transform.translation + self.center_offset
    }
}

/// Точка вылета снарядов относительно Transform бойца.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Muzzle {
    pub offset: Vec3,
}

impl Default for Muzzle {
    fn default() -> Self {
        Self { offset: Vec3::Y }
    }
}

impl Muzzle {
    pub fn world_position(muzzle: Option<&Muzzle>, transform: &Transform) -> Vec3 {
        let offset = muzzle.copied().unwrap_or_default().offset;
        transform.translation + offset
    }
}

/// Проекция на горизонтальную плоскость (y = 0), нормализованная.
///
/// `None` для вертикального/нулевого вектора.
pub fn flatten_direction(direction: Vec3) -> Option<Vec3> {
    Vec3::new(direction.x, 0.0, direction.z).try_normalize()
}
