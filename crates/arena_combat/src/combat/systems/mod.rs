//! Combat systems (fixed step)

pub mod explosions;
pub mod grenades;
pub mod projectiles;
pub mod scheduled;

pub use explosions::resolve_explosions;
pub use grenades::advance_grenades;
pub use projectiles::advance_projectiles;
pub use scheduled::run_scheduled_actions;
