//! Движение: скорость, гравитация, ground state.

use bevy::prelude::*;

/// Собственная скорость тела (units/sec). Integrate пишет её в Transform.
///
/// Отдельно от rapier Velocity: симуляция владеет движением сама,
/// rapier-компонент синхронизируется для физических query.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec2,
    pub mass: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            mass: 1.0,
        }
    }
}

impl PhysicsBody {
    pub fn with_mass(mass: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            mass,
        }
    }
}

/// Гравитация. `enabled = false` на время hover/dash фаз.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Gravity {
    /// Ускорение по Y (units/sec²), отрицательное = вниз
    pub accel: f32,
    pub enabled: bool,
}

impl Default for Gravity {
    fn default() -> Self {
        Self {
            accel: -30.0,
            enabled: true,
        }
    }
}

/// Ground state с coyote time.
///
/// `is_grounded()` истинно ещё coyote_time секунд после схода с опоры —
/// прыжок с края платформы не «съедается».
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Grounded {
    pub on_ground: bool,
    pub coyote_timer: f32,
    pub coyote_time: f32,
}

impl Default for Grounded {
    fn default() -> Self {
        Self {
            on_ground: false,
            coyote_timer: 0.0,
            coyote_time: 0.1,
        }
    }
}

impl Grounded {
    /// Grounded в широком смысле (включая coyote window)
    pub fn is_grounded(&self) -> bool {
        self.on_ground || self.coyote_timer > 0.0
    }

    /// Обновление из ground probe (вызывается в Sense)
    pub fn update(&mut self, on_ground: bool, delta: f32) {
        if on_ground {
            self.on_ground = true;
            self.coyote_timer = self.coyote_time;
        } else {
            self.on_ground = false;
            self.coyote_timer = (self.coyote_timer - delta).max(0.0);
        }
    }

    /// Прыжок сжигает coyote window сразу (нет double-jump с края)
    pub fn consume(&mut self) {
        self.on_ground = false;
        self.coyote_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coyote_window() {
        let mut grounded = Grounded::default();
        grounded.update(true, 1.0 / 60.0);
        assert!(grounded.is_grounded());

        // Сошли с опоры: ещё ~0.1 сек считаемся grounded
        grounded.update(false, 1.0 / 60.0);
        assert!(!grounded.on_ground);
        assert!(grounded.is_grounded());

        // 0.1 сек = 6 тиков; после них окно закрыто
        for _ in 0..6 {
            grounded.update(false, 1.0 / 60.0);
        }
        assert!(!grounded.is_grounded());
    }

    #[test]
    fn test_jump_consumes_coyote() {
        let mut grounded = Grounded::default();
        grounded.update(true, 1.0 / 60.0);

        grounded.consume();
        assert!(!grounded.is_grounded());
    }
}
