//! Базовые компоненты бойцов: Combatant, Health, MovementModifiers
//!
//! Capability-трейты (`Damageable`, `Slowable`): явные контракты, которые
//! компонент реализует. Снаряды и взрывы работают только через них.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::body::{Facing, Hurtbox, Velocity};
use crate::shooting::AimingController;

/// Команда (красные/синие и т.п.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Reflect, Serialize, Deserialize)]
pub struct TeamId(pub u8);

/// Боец арены (игрок или бот).
///
/// Автоматически добавляет Health, MovementModifiers, Facing, Velocity, Hurtbox.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, MovementModifiers, Facing, Velocity, Hurtbox)]
pub struct Combatant {
    pub team: TeamId,
}

impl Combatant {
    pub fn new(team: u8) -> Self {
        Self { team: TeamId(team) }
    }
}

/// Маркер: боец управляется игроком (стик → AimingController).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Combatant, AimingController)]
pub struct Player;

/// Capability: может получать урон.
pub trait Damageable {
    fn take_damage(&mut self, amount: f32);
    fn is_alive(&self) -> bool;
}

/// Capability: может быть замедлен.
pub trait Slowable {
    fn apply_slow_effect(&mut self, magnitude: f32, duration: f32);
}

/// Здоровье
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }
}

impl Damageable for Health {
    fn take_damage(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        self.current = (self.current - amount).max(0.0);
    }

    fn is_alive(&self) -> bool {
        self.current > 0.0
    }
}

/// Активные модификаторы движения (замедление).
///
/// Locomotion (внешний слой) умножает скорость на `speed_multiplier()`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MovementModifiers {
    /// 0.0 = без замедления, 1.0 = полная остановка
    pub slow_magnitude: f32,
    pub slow_remaining: f32,
}

impl MovementModifiers {
    pub fn speed_multiplier(&self) -> f32 {
        if self.slow_remaining > 0.0 {
            (1.0 - self.slow_magnitude).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    pub fn tick(&mut self, delta: f32) {
        if self.slow_remaining <= 0.0 {
            return;
        }
        self.slow_remaining = (self.slow_remaining - delta).max(0.0);
        if self.slow_remaining == 0.0 {
            self.slow_magnitude = 0.0;
        }
    }
}

impl Slowable for MovementModifiers {
    /// Сильнейшее замедление побеждает, длительность обновляется.
    fn apply_slow_effect(&mut self, magnitude: f32, duration: f32) {
        if magnitude <= 0.0 || duration <= 0.0 {
            return;
        }
        self.slow_magnitude = self.slow_magnitude.max(magnitude.min(1.0));
        self.slow_remaining = self.slow_remaining.max(duration);
    }
}
