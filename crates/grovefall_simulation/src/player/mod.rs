//! Игрок: input-driven движение и стрельба.
//!
//! Host пишет PlayerInput на entity игрока каждый тик; симуляция
//! интерпретирует его в Steer/Sequence. Никакого чтения устройств здесь нет.

use bevy::prelude::*;

use crate::combat::projectile::spawn_projectile;
use crate::combat::{Dead, ProjectileParams};
use crate::components::{Actor, Grounded, PhysicsBody};
use crate::SimulationSet;

/// Маркер entity игрока
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Намерения игрока на текущий тик (пишет host)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    /// Горизонтальная ось, -1..=1
    pub move_dir: f32,
    pub jump: bool,
    pub fire: bool,
    /// Направление прицела (мировое, ненормализованное)
    pub aim: Vec2,
}

impl Default for PlayerInput {
    fn default() -> Self {
        Self {
            move_dir: 0.0,
            jump: false,
            fire: false,
            aim: Vec2::X,
        }
    }
}

/// Тюнинг движения игрока
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PlayerMovement {
    pub move_speed: f32,
    pub jump_force: f32,
}

impl Default for PlayerMovement {
    fn default() -> Self {
        Self {
            move_speed: 8.0,
            jump_force: 12.0,
        }
    }
}

/// Автоматическая стрельба, пока зажат fire
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PlayerShooting {
    /// Минимальный интервал между выстрелами
    pub fire_rate: f32,
    pub timer: f32,
    pub projectile: ProjectileParams,
}

impl Default for PlayerShooting {
    fn default() -> Self {
        Self {
            fire_rate: 0.08,
            timer: 0.0,
            projectile: ProjectileParams::default(),
        }
    }
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            player_movement.in_set(SimulationSet::Steer),
        )
        .add_systems(
            FixedUpdate,
            // Спавн снарядов упорядочен с AI-стрелками: иначе порядок
            // аллокации entity зависел бы от планировщика потоков
            player_shooting
                .in_set(SimulationSet::Sequence)
                .after(crate::ai::guard::burst_fire),
        );
    }
}

/// Steer: input → velocity. Прыжок работает в coyote window и сжигает его.
///
/// Knockback override (если был) применится ПОСЛЕ и победит — так
/// отбрасывание нельзя «передавить» зажатой осью.
pub fn player_movement(
    mut query: Query<
        (
            &PlayerInput,
            &PlayerMovement,
            &mut PhysicsBody,
            &mut Grounded,
        ),
        (With<Player>, Without<Dead>),
    >,
) {
    for (input, movement, mut body, mut grounded) in query.iter_mut() {
        body.velocity.x = input.move_dir.clamp(-1.0, 1.0) * movement.move_speed;

        if input.jump && grounded.is_grounded() {
            body.velocity.y = movement.jump_force;
            grounded.consume();
        }
    }
}

/// Sequence: автострельба по таймеру, прицел из input
pub fn player_shooting(
    mut commands: Commands,
    time: Res<Time<Fixed>>,
    mut query: Query<
        (Entity, &PlayerInput, &mut PlayerShooting, &Actor, &Transform),
        (With<Player>, Without<Dead>),
    >,
) {
    let delta = time.delta_secs();

    for (entity, input, mut shooting, actor, transform) in query.iter_mut() {
        if shooting.timer > 0.0 {
            shooting.timer = (shooting.timer - delta).max(0.0);
        }

        if !input.fire || shooting.timer > 0.0 {
            continue;
        }

        let origin = transform.translation.truncate();
        spawn_projectile(
            &mut commands,
            origin,
            input.aim,
            entity,
            actor.faction,
            shooting.projectile,
        );
        shooting.timer = shooting.fire_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_defaults_are_neutral() {
        let input = PlayerInput::default();
        assert_eq!(input.move_dir, 0.0);
        assert!(!input.jump);
        assert!(!input.fire);
        assert_eq!(input.aim, Vec2::X); // Прицел всегда валиден
    }
}
