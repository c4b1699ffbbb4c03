//! AimingController: стик → прицел → выстрел.
//!
//! Idle → Aiming → Firing → Idle
//!
//! - Idle→Aiming: |input| > aim_sensitivity
//! - Aiming: направление = (x, 0, y).normalize, превью каждый тик
//! - Aiming→выстрел: |input| < min_shoot_threshold и прошёл cooldown
//!   (иначе Idle без выстрела)
//! - Firing держится, пока не закончится очередь (Burst); остальные
//!   категории возвращаются в Idle сразу после выстрела
//!
//! Пока Firing, facing принудительно смотрит в направление выстрела.

use bevy::prelude::*;

use crate::components::flatten_direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum AimState {
    #[default]
    Idle,
    Aiming,
    Firing,
}

/// Сырой ввод стика за этот тик (нормализованный 2D вектор).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct AimInput(pub Vec2);

/// Точка прицела гранаты, записанная во время Aiming.
///
/// Принадлежит бойцу; забирается (take) при броске.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct GrenadeAimPoint(pub Option<Vec3>);

/// Пороги стика (из CombatConfig).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimThresholds {
    pub aim_sensitivity: f32,
    pub min_shoot_threshold: f32,
}

/// Что контроллер хочет от системы на этом тике.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AimTick {
    /// Обновить превью (направление, magnitude для дальности броска)
    pub preview: Option<(Vec3, f32)>,
    /// Превью погасить
    pub preview_ended: bool,
    /// Стрелять (направление, magnitude последнего прицеливания)
    pub fire: Option<(Vec3, f32)>,
    /// Принудительный facing (rotation lock)
    pub locked_facing: Option<Vec3>,
}

#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(AimInput, GrenadeAimPoint)]
pub struct AimingController {
    pub state: AimState,
    pub aim_direction: Vec3,
    /// Magnitude последнего тика прицеливания (дальность броска)
    pub last_magnitude: f32,
    pub fire_direction: Vec3,
    /// Время последнего выстрела (None: ещё не стрелял)
    pub last_shot_at: Option<f64>,
}

impl Default for AimingController {
    fn default() -> Self {
        Self {
            state: AimState::Idle,
            aim_direction: Vec3::Z,
            last_magnitude: 0.0,
            fire_direction: Vec3::Z,
            last_shot_at: None,
        }
    }
}

impl AimingController {
    pub fn is_rotation_locked(&self) -> bool {
        self.state == AimState::Firing
    }

    pub fn cooldown_ready(&self, now: f64, cooldown: f32) -> bool {
        match self.last_shot_at {
            None => true,
            Some(last) => now - last >= f64::from(cooldown),
        }
    }

    /// Прогресс перезарядки в [0, 1] (для HUD).
    pub fn cooldown_progress(&self, now: f64, cooldown: f32) -> f32 {
        let Some(last) = self.last_shot_at else {
            return 1.0;
        };
        if cooldown <= 0.0 {
            return 1.0;
        }
        (((now - last) / f64::from(cooldown)) as f32).clamp(0.0, 1.0)
    }

    /// Один тик state machine.
    ///
    /// На отпускании контроллер уходит в Idle и отдаёт `fire`; в Firing его
    /// переводит `begin_firing`, если диспетчер действительно выстрелил.
    pub fn tick(&mut self, input: Vec2, now: f64, cooldown: f32, thresholds: AimThresholds) -> AimTick {
        let magnitude = input.length();
        let mut out = AimTick::default();

        match self.state {
            AimState::Firing => {
                out.locked_facing = Some(self.fire_direction);
            }
            AimState::Idle => {
                if magnitude > thresholds.aim_sensitivity {
                    self.state = AimState::Aiming;
                    self.update_aim(input, magnitude, &mut out);
                }
            }
            AimState::Aiming => {
                if magnitude > thresholds.aim_sensitivity {
                    self.update_aim(input, magnitude, &mut out);
                } else if magnitude < thresholds.min_shoot_threshold {
                    out.preview_ended = true;
                    self.state = AimState::Idle;
                    if self.cooldown_ready(now, cooldown) {
                        out.fire = Some((self.aim_direction, self.last_magnitude));
                    }
                } else {
                    // Между порогами: прицел держится на последнем направлении
                    out.preview = Some((self.aim_direction, self.last_magnitude));
                }
            }
        }

        out
    }

    fn update_aim(&mut self, input: Vec2, magnitude: f32, out: &mut AimTick) {
        if let Some(direction) = flatten_direction(Vec3::new(input.x, 0.0, input.y)) {
            self.aim_direction = direction;
        }
        self.last_magnitude = magnitude;
        out.preview = Some((self.aim_direction, magnitude));
    }

    /// Диспетчер выстрелил: запоминаем время, Firing только для очередей.
    pub fn begin_firing(&mut self, direction: Vec3, now: f64, sequenced: bool) {
        self.fire_direction = direction;
        self.last_shot_at = Some(now);
        self.state = if sequenced { AimState::Firing } else { AimState::Idle };
    }

    /// Очередь закончилась (или отменена).
    pub fn release_firing(&mut self) {
        if self.state == AimState::Firing {
            self.state = AimState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: AimThresholds = AimThresholds {
        aim_sensitivity: 0.1,
        min_shoot_threshold: 0.05,
    };

    #[test]
    fn test_small_input_stays_idle() {
        let mut controller = AimingController::default();
        let out = controller.tick(Vec2::new(0.05, 0.0), 0.0, 0.5, THRESHOLDS);

        assert_eq!(controller.state, AimState::Idle);
        assert_eq!(out, AimTick::default());
    }

    #[test]
    fn test_aim_then_release_fires() {
        let mut controller = AimingController::default();

        let out = controller.tick(Vec2::new(0.0, 0.8), 0.0, 0.5, THRESHOLDS);
        assert_eq!(controller.state, AimState::Aiming);
        let (direction, magnitude) = out.preview.unwrap();
        assert!((direction - Vec3::Z).length() < 1e-6);
        assert!((magnitude - 0.8).abs() < 1e-6);

        let out = controller.tick(Vec2::ZERO, 0.1, 0.5, THRESHOLDS);
        assert!(out.preview_ended);
        let (direction, magnitude) = out.fire.unwrap();
        assert!((direction - Vec3::Z).length() < 1e-6);
        assert!((magnitude - 0.8).abs() < 1e-6, "release uses last aiming magnitude");
    }

    #[test]
    fn test_release_during_cooldown_returns_idle_without_fire() {
        let mut controller = AimingController::default();
        controller.begin_firing(Vec3::X, 1.0, false);

        controller.tick(Vec2::new(1.0, 0.0), 1.1, 0.5, THRESHOLDS);
        let out = controller.tick(Vec2::ZERO, 1.2, 0.5, THRESHOLDS);

        assert!(out.fire.is_none());
        assert!(out.preview_ended);
        assert_eq!(controller.state, AimState::Idle);
    }

    #[test]
    fn test_hysteresis_band_keeps_aiming() {
        let mut controller = AimingController::default();
        controller.tick(Vec2::new(0.5, 0.0), 0.0, 0.5, THRESHOLDS);

        let out = controller.tick(Vec2::new(0.07, 0.0), 0.1, 0.5, THRESHOLDS);
        assert_eq!(controller.state, AimState::Aiming);
        assert!(out.fire.is_none());
        assert!(out.preview.is_some());
    }

    #[test]
    fn test_firing_locks_facing_until_release() {
        let mut controller = AimingController::default();
        controller.begin_firing(Vec3::X, 0.0, true);

        assert!(controller.is_rotation_locked());
        let out = controller.tick(Vec2::new(0.0, 1.0), 0.1, 0.5, THRESHOLDS);
        assert_eq!(out.locked_facing, Some(Vec3::X));
        assert_eq!(controller.state, AimState::Firing, "input ignored while firing");

        controller.release_firing();
        assert_eq!(controller.state, AimState::Idle);
        assert!(!controller.is_rotation_locked());
    }

    #[test]
    fn test_cooldown_progress() {
        let mut controller = AimingController::default();
        assert_eq!(controller.cooldown_progress(0.0, 1.0), 1.0);

        controller.begin_firing(Vec3::Z, 2.0, false);
        assert!((controller.cooldown_progress(2.25, 1.0) - 0.25).abs() < 1e-6);
        assert_eq!(controller.cooldown_progress(5.0, 1.0), 1.0);
    }
}
