//! ECS Components бойцов арены
//!
//! Организация по доменам:
//! - actor: команда, здоровье, модификаторы движения (+ capability-трейты)
//! - body: facing, velocity, hurtbox, точка вылета снарядов

pub mod actor;
pub mod body;

pub use actor::*;
pub use body::*;
