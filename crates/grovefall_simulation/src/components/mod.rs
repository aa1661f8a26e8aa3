//! Базовые ECS компоненты симуляции.

pub mod actor;
pub mod movement;

pub use actor::*;
pub use movement::*;
