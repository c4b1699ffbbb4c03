//! AI модуль: стрелки-боты.
//!
//! Решение "стрелять": AttackRequest; сам выстрел идёт через тот же
//! FireModeDispatcher, что и у игрока.

use bevy::prelude::*;

pub mod gunner;

pub use gunner::{ai_gunner_attack, process_attack_requests, AiGunner, AttackRequest, GunnerState};

use crate::shooting::update_aiming_controllers;

/// AI Plugin
///
/// Update, после игрока (общий DeterministicRng → фиксированный порядок):
/// 1. ai_gunner_attack: цель, facing, AttackRequest
/// 2. process_attack_requests: AttackRequest → FireModeDispatcher
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AttackRequest>();

        app.add_systems(
            Update,
            (ai_gunner_attack, process_attack_requests)
                .chain()
                .after(update_aiming_controllers),
        );
    }
}
