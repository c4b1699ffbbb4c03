//! Ошибки боевой подсистемы.
//!
//! Ни одна из них не фатальна: системы логируют и превращают операцию в no-op.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CombatError {
    /// Нет профиля оружия / prefab / невалидные значения профиля.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// У prefab нет нужного motion behavior (даже generic projectile).
    #[error("component mismatch: {0}")]
    ComponentMismatch(String),

    /// Индекс оружия вне каталога.
    #[error("invalid weapon index {index} (catalog has {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

impl CombatError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn component_mismatch(message: impl Into<String>) -> Self {
        Self::ComponentMismatch(message.into())
    }
}
