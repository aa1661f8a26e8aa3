//! Базовые компоненты комбатантов: Actor, Health, Invincibility, Footprint.
//!
//! Capability model: у entity может быть Health, KnockbackReceiver, оба или
//! ни одного — damage/knockback pipeline проверяет наличие компонента,
//! а не «тип» entity.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Фракция комбатанта. Projectile/area damage бьют только противоположную.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn opposes(&self, other: Faction) -> bool {
        *self != other
    }
}

/// Актор (игрок, враг, босс) — живое существо с фракцией
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Actor {
    pub faction: Faction,
}

impl Actor {
    pub fn player() -> Self {
        Self {
            faction: Faction::Player,
        }
    }

    pub fn enemy() -> Self {
        Self {
            faction: Faction::Enemy,
        }
    }
}

/// Здоровье актора
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }
}

/// Окно неуязвимости после полученного урона.
///
/// Гейтит ТОЛЬКО урон — knockback и движение проходят сквозь него.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Invincibility {
    /// Оставшееся время окна (секунды), 0 = уязвим
    pub timer: f32,
    /// Длительность окна, взводится при каждом принятом ударе
    pub window: f32,
}

impl Default for Invincibility {
    fn default() -> Self {
        Self {
            timer: 0.0,
            window: 0.2,
        }
    }
}

impl Invincibility {
    pub fn new(window: f32) -> Self {
        Self { timer: 0.0, window }
    }

    pub fn is_active(&self) -> bool {
        self.timer > 0.0
    }

    pub fn arm(&mut self) {
        self.timer = self.window;
    }

    pub fn tick(&mut self, delta: f32) {
        if self.timer > 0.0 {
            self.timer = (self.timer - delta).max(0.0);
        }
    }
}

/// Косметический cue: периодический toggle видимости на время неуязвимости.
///
/// Host читает `visible` и мигает спрайтом. На gameplay не влияет.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct FlashCue {
    pub remaining: f32,
    pub interval: f32,
    pub toggle_timer: f32,
    pub visible: bool,
}

impl Default for FlashCue {
    fn default() -> Self {
        Self {
            remaining: 0.0,
            interval: 0.05,
            toggle_timer: 0.0,
            visible: true,
        }
    }
}

impl FlashCue {
    pub fn start(&mut self, duration: f32) {
        self.remaining = duration;
        self.toggle_timer = self.interval;
    }

    pub fn tick(&mut self, delta: f32) {
        if self.remaining <= 0.0 {
            return;
        }

        self.remaining -= delta;
        self.toggle_timer -= delta;

        if self.toggle_timer <= 0.0 {
            self.visible = !self.visible;
            self.toggle_timer += self.interval;
        }

        // По окончании окна всегда восстанавливаем видимость
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            self.visible = true;
        }
    }
}

/// Collision footprint: окружность для overlap-тестов.
///
/// `solid = true` — блокирует projectiles (стены, платформы).
/// Акторы — "триггеры": projectile сам решает, бить или пролетать.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Footprint {
    pub radius: f32,
    pub solid: bool,
}

impl Footprint {
    pub fn actor(radius: f32) -> Self {
        Self {
            radius,
            solid: false,
        }
    }

    pub fn obstacle(radius: f32) -> Self {
        Self {
            radius,
            solid: true,
        }
    }
}

/// Маркер: статичная геометрия (стены, пол-сегменты)
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct Obstacle;

/// Facing sign: +1 вправо, -1 влево. Host зеркалит спрайт по нему.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Facing {
    pub sign: f32,
}

impl Default for Facing {
    fn default() -> Self {
        Self { sign: 1.0 }
    }
}

impl Facing {
    /// Поворачивается по знаку dx; |dx| ниже порога — не дёргаемся
    pub fn face_toward(&mut self, dx: f32) {
        if dx > 0.01 {
            self.sign = 1.0;
        } else if dx < -0.01 {
            self.sign = -1.0;
        }
    }

    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.sign, 0.0)
    }
}
