//! Shooting domain: прицеливание со стика и спуск.
//!
//! AimingController: чистая state machine (controller.rs), системы
//! связывают её с вводом, превью и FireModeDispatcher (systems.rs).

pub mod controller;
pub mod systems;

pub use controller::{AimInput, AimState, AimThresholds, AimTick, AimingController, GrenadeAimPoint};
pub use systems::update_aiming_controllers;
